//! One-second tick signal shared with interrupt context
//!
//! The RTC periodic interrupt raises the flag and does nothing else. The
//! main loop observes it, reads the full calendar time, and only then
//! acknowledges it. Ticks are not queued: any number of raises between two
//! acknowledgments coalesce into one, and the main loop catches up by
//! reading the clock directly.

use core::sync::atomic::{AtomicBool, Ordering};

/// Single-writer (interrupt) / single-reader-then-clearer (main loop) flag
///
/// Allocate once with `'static` lifetime (e.g. a `StaticCell`) and hand the
/// same reference to the interrupt handler and to
/// [`HardwareClock::begin`](crate::clock::HardwareClock::begin).
#[derive(Debug)]
pub struct TickFlag {
    pending: AtomicBool,
}

impl TickFlag {
    /// A flag with no tick pending
    pub const fn new() -> Self {
        Self {
            pending: AtomicBool::new(false),
        }
    }

    /// Record a tick. Interrupt-safe, bounded and non-blocking.
    #[inline]
    pub fn raise(&self) {
        self.pending.store(true, Ordering::Release);
    }

    /// Whether a tick arrived since the last acknowledgment
    #[inline]
    pub fn is_pending(&self) -> bool {
        self.pending.load(Ordering::Acquire)
    }

    /// Clear the flag after the time has been read
    #[inline]
    pub fn acknowledge(&self) {
        self.pending.store(false, Ordering::Release);
    }
}

impl Default for TickFlag {
    fn default() -> Self {
        Self::new()
    }
}
