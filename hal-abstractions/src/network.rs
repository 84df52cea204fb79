//! Network time source boundary

/// Supplier of UTC epoch timestamps (seconds since 1970-01-01T00:00:00 UTC)
///
/// Connectivity management lives behind this trait. The clock engine only
/// asks for a timestamp and never retries beyond its own bounded wait.
pub trait NetworkTimeSource {
    /// Whether the source currently has connectivity
    ///
    /// A disconnected source fails a sync immediately instead of waiting
    /// out the full timeout.
    fn is_connected(&self) -> bool {
        true
    }

    /// Request an epoch timestamp, waiting at most `timeout_ms`
    ///
    /// Returns `None` on timeout or when there is no connectivity.
    fn request_epoch(&mut self, timeout_ms: u32) -> Option<u64>;
}

impl<T: NetworkTimeSource + ?Sized> NetworkTimeSource for &mut T {
    fn is_connected(&self) -> bool {
        (**self).is_connected()
    }

    fn request_epoch(&mut self, timeout_ms: u32) -> Option<u64> {
        (**self).request_epoch(timeout_ms)
    }
}
