//! Test doubles for the hardware boundary

use ring_clock_hal::{HardwareFault, NetworkTimeSource, PixelOutput, RealTimeClock, Ring, RGB8};

use crate::renderer::{HOUR_RING_LEN, MINUTE_RING_LEN};
use crate::tick::TickFlag;

/// In-memory RTC holding a local epoch
#[derive(Debug, Default)]
pub struct FakeRtc {
    pub epoch: u64,
    /// Advance `epoch` by one second after every read
    pub ticking: bool,
    pub armed: bool,
    pub reads: u32,
    pub writes: u32,
    pub fail_start: bool,
    pub fail_arm: bool,
    pub fail_read: bool,
    pub fail_write: bool,
}

impl FakeRtc {
    /// A stopped-time RTC reading `epoch`
    pub fn at(epoch: u64) -> Self {
        Self {
            epoch,
            ..Self::default()
        }
    }

    /// An RTC that moves forward one second per read
    pub fn ticking(epoch: u64) -> Self {
        Self {
            epoch,
            ticking: true,
            ..Self::default()
        }
    }
}

impl RealTimeClock for FakeRtc {
    fn start(&mut self) -> Result<(), HardwareFault> {
        if self.fail_start {
            return Err(HardwareFault::InitFailed);
        }
        Ok(())
    }

    fn arm_periodic_tick(&mut self) -> Result<(), HardwareFault> {
        if self.fail_arm {
            return Err(HardwareFault::ArmFailed);
        }
        self.armed = true;
        Ok(())
    }

    fn read_epoch(&mut self) -> Result<u64, HardwareFault> {
        if self.fail_read {
            return Err(HardwareFault::ReadFailed);
        }
        self.reads += 1;
        let epoch = self.epoch;
        if self.ticking {
            self.epoch += 1;
        }
        Ok(epoch)
    }

    fn write_epoch(&mut self, epoch: u64) -> Result<(), HardwareFault> {
        if self.fail_write {
            return Err(HardwareFault::WriteRejected);
        }
        self.writes += 1;
        self.epoch = epoch;
        Ok(())
    }
}

/// Network source that answers after a fixed number of empty polls
#[derive(Debug)]
pub struct ScriptedTimeSource<'a> {
    answer: Option<(u32, u64)>,
    connected: bool,
    tick: Option<&'a TickFlag>,
    /// Number of `request_epoch` calls so far
    pub polls: u32,
}

impl ScriptedTimeSource<'static> {
    /// Answer `epoch` on poll `misses + 1`
    pub fn answering_after(misses: u32, epoch: u64) -> Self {
        Self {
            answer: Some((misses, epoch)),
            connected: true,
            tick: None,
            polls: 0,
        }
    }

    /// Connected but never answers
    pub fn silent() -> Self {
        Self {
            answer: None,
            connected: true,
            tick: None,
            polls: 0,
        }
    }

    pub fn disconnected() -> Self {
        Self {
            connected: false,
            ..Self::silent()
        }
    }
}

impl<'a> ScriptedTimeSource<'a> {
    /// Raise `tick` during every poll, as the RTC interrupt would
    pub fn raising<'b>(self, tick: &'b TickFlag) -> ScriptedTimeSource<'b> {
        ScriptedTimeSource {
            answer: self.answer,
            connected: self.connected,
            tick: Some(tick),
            polls: self.polls,
        }
    }
}

impl NetworkTimeSource for ScriptedTimeSource<'_> {
    fn is_connected(&self) -> bool {
        self.connected
    }

    fn request_epoch(&mut self, _timeout_ms: u32) -> Option<u64> {
        self.polls += 1;
        if let Some(tick) = self.tick {
            tick.raise();
        }
        match self.answer {
            Some((misses, epoch)) if self.polls > misses => Some(epoch),
            _ => None,
        }
    }
}

/// Pixel output that keeps the last frames and counts hardware writes
#[derive(Debug)]
pub struct RecordingPixels {
    pub minutes: [RGB8; MINUTE_RING_LEN],
    pub hours: [RGB8; HOUR_RING_LEN],
    pub minute_writes: u32,
    pub hour_writes: u32,
    pub brightness: Option<u8>,
    pub brightness_writes: u32,
}

impl RecordingPixels {
    pub fn new() -> Self {
        Self {
            minutes: [RGB8::default(); MINUTE_RING_LEN],
            hours: [RGB8::default(); HOUR_RING_LEN],
            minute_writes: 0,
            hour_writes: 0,
            brightness: None,
            brightness_writes: 0,
        }
    }
}

impl PixelOutput for RecordingPixels {
    fn write_ring(&mut self, ring: Ring, frame: &[RGB8]) {
        let (target, writes): (&mut [RGB8], _) = match ring {
            Ring::Minutes => (&mut self.minutes, &mut self.minute_writes),
            Ring::Hours => (&mut self.hours, &mut self.hour_writes),
        };
        let len = target.len().min(frame.len());
        target[..len].copy_from_slice(&frame[..len]);
        *writes += 1;
    }

    fn set_brightness(&mut self, level: u8) {
        self.brightness = Some(level);
        self.brightness_writes += 1;
    }
}
