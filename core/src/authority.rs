//! Time authority
//!
//! Owns the canonical notion of "current time" and "time validity". The
//! hardware clock advances it once per tick; a network source corrects it
//! now and then. Sync failures are never fatal: the clock keeps running on
//! its last known time.

use ring_clock_hal::{HardwareFault, NetworkTimeSource, RealTimeClock};

use crate::clock::HardwareClock;
use crate::config::SyncConfig;
use crate::time::CalendarTime;

/// Network synchronization errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SyncError {
    /// Source disconnected or no timestamp within the timeout
    Unavailable,
    /// Timestamp outside the accepted range; discarded
    InvalidResponse,
    /// RTC rejected the corrected time
    Hardware(HardwareFault),
}

impl From<HardwareFault> for SyncError {
    fn from(e: HardwareFault) -> Self {
        SyncError::Hardware(e)
    }
}

impl core::fmt::Display for SyncError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Unavailable => write!(f, "Network time unavailable"),
            Self::InvalidResponse => write!(f, "Invalid network time"),
            Self::Hardware(e) => write!(f, "{}", e),
        }
    }
}

impl core::error::Error for SyncError {}

/// Canonical time owner
///
/// Other components only ever receive [`CalendarTime`] copies.
pub struct TimeAuthority<'a, R> {
    clock: HardwareClock<'a, R>,
    config: SyncConfig,
    tz_offset_hours: i8,
    valid: bool,
    last_sync_epoch: Option<u64>,
}

impl<'a, R: RealTimeClock> TimeAuthority<'a, R> {
    /// Take ownership of a started hardware clock
    pub fn new(clock: HardwareClock<'a, R>, config: SyncConfig, tz_offset_hours: i8) -> Self {
        Self {
            clock,
            config,
            tz_offset_hours,
            valid: false,
            last_sync_epoch: None,
        }
    }

    /// Consume a pending tick, if any. Call once per control-loop pass.
    ///
    /// Returns whether the time was refreshed from the RTC.
    pub fn update(&mut self) -> bool {
        match self.clock.poll_tick() {
            Some(time) => {
                let (h, m, s) = time.hms();
                trace!("RTC tick: {:02}:{:02}:{:02}", h, m, s);
                true
            }
            None => false,
        }
    }

    /// Snapshot of the current time, carrying the current validity
    pub fn now(&self) -> CalendarTime {
        self.clock.current_time().with_validity(self.valid)
    }

    /// Whether the time has ever been set or synchronized
    pub fn is_valid(&self) -> bool {
        self.valid
    }

    /// UTC epoch applied by the last successful network sync
    pub fn last_sync_epoch(&self) -> Option<u64> {
        self.last_sync_epoch
    }

    /// Whole-hour offset applied to every time written to the RTC
    pub fn tz_offset_hours(&self) -> i8 {
        self.tz_offset_hours
    }

    /// Set the clock from a trusted UTC epoch (e.g. entered by the user)
    pub fn set_manual_time(&mut self, epoch: u64) -> Result<(), HardwareFault> {
        self.clock.set_time(epoch, self.tz_offset_hours)?;
        self.valid = true;
        info!("Time set manually: {} UTC", epoch);
        Ok(())
    }

    /// Synchronize with a network time source
    ///
    /// Polls the source in `poll_interval_ms` slices for at most
    /// `timeout_ms`, servicing hardware ticks between polls. On any error
    /// the current time and validity are left untouched.
    pub fn sync_from_network<S>(&mut self, source: &mut S) -> Result<(), SyncError>
    where
        S: NetworkTimeSource + ?Sized,
    {
        self.sync_from_network_with(source, |authority| {
            authority.update();
        })
    }

    /// [`sync_from_network`](Self::sync_from_network) with a caller hook
    ///
    /// `between_polls` runs after every empty poll and owns tick
    /// servicing for the duration of the wait.
    pub fn sync_from_network_with<S, F>(
        &mut self,
        source: &mut S,
        between_polls: F,
    ) -> Result<(), SyncError>
    where
        S: NetworkTimeSource + ?Sized,
        F: FnMut(&mut Self),
    {
        if !source.is_connected() {
            warn!("Network time sync skipped: source disconnected");
            return Err(SyncError::Unavailable);
        }

        info!("Starting network time synchronization");
        let Some(epoch) = self.wait_for_epoch(source, between_polls) else {
            warn!(
                "Network time sync failed: no response within {} ms",
                self.config.timeout_ms
            );
            return Err(SyncError::Unavailable);
        };

        if epoch < self.config.min_epoch || epoch > self.config.max_epoch {
            warn!("Network time {} outside accepted range, discarded", epoch);
            return Err(SyncError::InvalidResponse);
        }

        let time = self
            .clock
            .set_time(epoch, self.tz_offset_hours)
            .inspect_err(|e| error!("Failed to write network time to RTC: {}", e))?;
        self.valid = true;
        self.last_sync_epoch = Some(epoch);

        let (h, m, s) = time.hms();
        info!(
            "Network time sync successful: {} UTC, local {:02}:{:02}:{:02}",
            epoch, h, m, s
        );
        Ok(())
    }

    /// Daily resync rule: true during 00:00:00 local time
    pub fn sync_due(&self) -> bool {
        self.now().is_midnight()
    }

    /// The hardware clock this authority reads from
    pub fn clock(&self) -> &HardwareClock<'a, R> {
        &self.clock
    }

    fn wait_for_epoch<S, F>(&mut self, source: &mut S, mut between_polls: F) -> Option<u64>
    where
        S: NetworkTimeSource + ?Sized,
        F: FnMut(&mut Self),
    {
        let polls = self
            .config
            .timeout_ms
            .checked_div(self.config.poll_interval_ms)
            .unwrap_or(1)
            .max(1);

        for _ in 0..polls {
            if let Some(epoch) = source.request_epoch(self.config.poll_interval_ms) {
                return Some(epoch);
            }
            between_polls(self);
        }
        None
    }
}
