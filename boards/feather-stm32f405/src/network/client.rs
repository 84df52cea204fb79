#![deny(unsafe_code)]
//! Network client trait

use super::error::NetworkError;

/// One-shot network protocol client
///
/// Implementors log and return errors rather than panicking. Scheduling
/// repeated runs is the caller's job.
pub trait NetworkClient {
    /// Output type for successful client operation
    type Output;

    /// Run the client operation once
    fn run(
        &mut self,
        stack: &embassy_net::Stack<'static>,
    ) -> impl core::future::Future<Output = Result<Self::Output, NetworkError>>;
}
