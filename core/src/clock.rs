//! Hardware clock source
//!
//! Wraps the RTC peripheral and the tick flag its interrupt raises.
//! Between ticks the last-read calendar time is served from memory, so
//! reading the current time never touches the hardware and never fails.

use ring_clock_hal::{HardwareFault, RealTimeClock};

use crate::tick::TickFlag;
use crate::time::CalendarTime;

/// RTC-backed clock with a one-second tick
pub struct HardwareClock<'a, R> {
    rtc: R,
    tick: &'a TickFlag,
    last: CalendarTime,
}

impl<'a, R: RealTimeClock> HardwareClock<'a, R> {
    /// Start the RTC and arm its 1 Hz interrupt
    ///
    /// `tick` must be the same flag the board's interrupt handler raises.
    /// Both failures are unrecoverable startup errors for the caller.
    pub fn begin(mut rtc: R, tick: &'a TickFlag) -> Result<Self, HardwareFault> {
        rtc.start().inspect_err(|e| error!("RTC start failed: {}", e))?;
        rtc.arm_periodic_tick()
            .inspect_err(|e| error!("RTC periodic tick arming failed: {}", e))?;

        let last = match rtc.read_epoch() {
            Ok(epoch) => CalendarTime::from_epoch(epoch).unwrap_or_default(),
            Err(e) => {
                warn!("Initial RTC read failed: {}", e);
                CalendarTime::UNIX_EPOCH
            }
        };
        info!("RTC started, 1 Hz tick armed");

        Ok(Self { rtc, tick, last })
    }

    /// Last-known calendar time. Always succeeds.
    pub fn current_time(&self) -> CalendarTime {
        self.last
    }

    /// Write a UTC epoch to the RTC, shifted by a whole-hour zone offset
    ///
    /// On failure the last-known time is kept.
    pub fn set_time(
        &mut self,
        epoch: u64,
        tz_offset_hours: i8,
    ) -> Result<CalendarTime, HardwareFault> {
        let local = epoch
            .checked_add_signed(i64::from(tz_offset_hours) * 3600)
            .ok_or(HardwareFault::WriteRejected)?;
        let time = CalendarTime::from_epoch(local).ok_or(HardwareFault::WriteRejected)?;

        self.rtc.write_epoch(local)?;
        self.last = time;
        Ok(time)
    }

    /// Consume a pending tick, refreshing the time from the RTC
    ///
    /// The flag is acknowledged only after the read, so a tick arriving
    /// during the read is at worst seen one pass late. A failed read keeps
    /// the last-known time but still consumes the tick.
    pub fn poll_tick(&mut self) -> Option<CalendarTime> {
        if !self.tick.is_pending() {
            return None;
        }

        match self.rtc.read_epoch() {
            Ok(epoch) => match CalendarTime::from_epoch(epoch) {
                Some(time) => self.last = time,
                None => warn!("RTC returned out-of-range time {}", epoch),
            },
            Err(e) => warn!("RTC read failed: {}", e),
        }
        self.tick.acknowledge();

        Some(self.last)
    }

    /// The underlying RTC driver
    pub fn rtc(&self) -> &R {
        &self.rtc
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeRtc;

    /// 2025-06-01 10:15:00
    const START: u64 = 1_748_772_900;

    #[test]
    fn test_begin_reads_initial_time() {
        let tick = TickFlag::new();
        let clock = HardwareClock::begin(FakeRtc::at(START), &tick).unwrap();
        assert_eq!(clock.current_time().hms(), (10, 15, 0));
        assert!(clock.rtc().armed);
    }

    #[test]
    fn test_begin_propagates_faults() {
        let tick = TickFlag::new();

        let mut rtc = FakeRtc::at(START);
        rtc.fail_start = true;
        assert_eq!(
            HardwareClock::begin(rtc, &tick).err(),
            Some(HardwareFault::InitFailed)
        );

        let mut rtc = FakeRtc::at(START);
        rtc.fail_arm = true;
        assert_eq!(
            HardwareClock::begin(rtc, &tick).err(),
            Some(HardwareFault::ArmFailed)
        );
    }

    #[test]
    fn test_poll_without_tick_does_not_read() {
        let tick = TickFlag::new();
        let mut clock = HardwareClock::begin(FakeRtc::at(START), &tick).unwrap();
        let reads = clock.rtc().reads;

        assert_eq!(clock.poll_tick(), None);
        assert_eq!(clock.rtc().reads, reads);
    }

    #[test]
    fn test_tick_refreshes_time_and_clears_flag() {
        let tick = TickFlag::new();
        let mut rtc = FakeRtc::at(START);
        let mut clock = HardwareClock::begin(&mut rtc, &tick).unwrap();

        clock.rtc.epoch += 7;
        tick.raise();
        let time = clock.poll_tick().unwrap();
        assert_eq!(time.hms(), (10, 15, 7));
        assert!(!tick.is_pending());
        assert_eq!(clock.current_time(), time);
    }

    #[test]
    fn test_failed_read_keeps_last_time() {
        let tick = TickFlag::new();
        let mut clock = HardwareClock::begin(FakeRtc::at(START), &tick).unwrap();
        let before = clock.current_time();

        clock.rtc.fail_read = true;
        tick.raise();
        assert_eq!(clock.poll_tick(), Some(before));
        assert!(!tick.is_pending());
    }

    #[test]
    fn test_set_time_applies_offset() {
        let tick = TickFlag::new();
        let mut clock = HardwareClock::begin(FakeRtc::at(0), &tick).unwrap();

        let time = clock.set_time(START, 1).unwrap();
        assert_eq!(time.hms(), (11, 15, 0));
        assert_eq!(clock.rtc().epoch, START + 3600);

        // Reading back and removing the offset gives the UTC epoch again
        tick.raise();
        let read_back = clock.poll_tick().unwrap();
        assert_eq!(read_back.to_epoch() - 3600, START);

        let time = clock.set_time(START, -5).unwrap();
        assert_eq!(time.hms(), (5, 15, 0));
    }

    #[test]
    fn test_rejected_write_keeps_last_time() {
        let tick = TickFlag::new();
        let mut clock = HardwareClock::begin(FakeRtc::at(START), &tick).unwrap();
        let before = clock.current_time();

        clock.rtc.fail_write = true;
        assert_eq!(
            clock.set_time(START + 1000, 0),
            Err(HardwareFault::WriteRejected)
        );
        assert_eq!(clock.current_time(), before);
    }

    #[test]
    fn test_negative_local_time_is_rejected() {
        let tick = TickFlag::new();
        let mut clock = HardwareClock::begin(FakeRtc::at(START), &tick).unwrap();
        assert_eq!(clock.set_time(100, -1), Err(HardwareFault::WriteRejected));
        assert_eq!(clock.rtc().writes, 0);
    }
}
