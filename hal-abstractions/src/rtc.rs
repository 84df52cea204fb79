//! Real-time clock peripheral boundary
//!
//! The RTC keeps wall-clock time on its own oscillator and raises a 1 Hz
//! periodic interrupt. Implementations deal in local epoch seconds; calendar
//! conversion belongs to the core crate.

/// RTC hardware errors
///
/// `InitFailed` and `ArmFailed` are unrecoverable startup errors. The
/// others are reported to the caller and the clock keeps its last value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum HardwareFault {
    /// The peripheral could not be started
    InitFailed,
    /// The 1 Hz periodic interrupt could not be armed
    ArmFailed,
    /// The calendar registers could not be read
    ReadFailed,
    /// The peripheral rejected a time write
    WriteRejected,
}

impl core::fmt::Display for HardwareFault {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::InitFailed => write!(f, "RTC failed to start"),
            Self::ArmFailed => write!(f, "RTC periodic interrupt could not be armed"),
            Self::ReadFailed => write!(f, "RTC read failed"),
            Self::WriteRejected => write!(f, "RTC rejected time write"),
        }
    }
}

impl core::error::Error for HardwareFault {}

/// RTC peripheral driven by the clock engine
///
/// The periodic interrupt handler itself is wired up by the board; it must
/// do nothing but raise the tick flag handed to the engine at startup.
pub trait RealTimeClock {
    /// Start the peripheral oscillator and calendar
    fn start(&mut self) -> Result<(), HardwareFault>;

    /// Arm the once-per-second periodic interrupt
    fn arm_periodic_tick(&mut self) -> Result<(), HardwareFault>;

    /// Read the current local time as seconds since 1970-01-01T00:00:00
    fn read_epoch(&mut self) -> Result<u64, HardwareFault>;

    /// Write a new local time as seconds since 1970-01-01T00:00:00
    fn write_epoch(&mut self, epoch: u64) -> Result<(), HardwareFault>;
}

impl<T: RealTimeClock + ?Sized> RealTimeClock for &mut T {
    fn start(&mut self) -> Result<(), HardwareFault> {
        (**self).start()
    }

    fn arm_periodic_tick(&mut self) -> Result<(), HardwareFault> {
        (**self).arm_periodic_tick()
    }

    fn read_epoch(&mut self) -> Result<u64, HardwareFault> {
        (**self).read_epoch()
    }

    fn write_epoch(&mut self, epoch: u64) -> Result<(), HardwareFault> {
        (**self).write_epoch(epoch)
    }
}
