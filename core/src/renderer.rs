//! Time display on two concentric rings
//!
//! The outer 60-pixel ring shows minute and second, the inner 12-pixel
//! ring shows the hour. Hardware is only written when the displayed
//! hour, minute or second changed since the last draw.

use ring_clock_hal::{PixelOutput, Ring, RGB8};

use crate::config::Palette;
use crate::time::CalendarTime;

/// Pixels on the minute/second ring
pub const MINUTE_RING_LEN: usize = 60;
/// Pixels on the hour ring
pub const HOUR_RING_LEN: usize = 12;

const OFF: RGB8 = RGB8 { r: 0, g: 0, b: 0 };

/// Last rendered time-of-day
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DisplayedTime {
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
}

impl From<&CalendarTime> for DisplayedTime {
    fn from(time: &CalendarTime) -> Self {
        Self {
            hour: time.hour(),
            minute: time.minute(),
            second: time.second(),
        }
    }
}

pub struct DisplayRenderer {
    palette: Palette,
    minute_ring: [RGB8; MINUTE_RING_LEN],
    hour_ring: [RGB8; HOUR_RING_LEN],
    cache: Option<DisplayedTime>,
}

impl DisplayRenderer {
    pub fn new(palette: Palette) -> Self {
        Self {
            palette,
            minute_ring: [OFF; MINUTE_RING_LEN],
            hour_ring: [OFF; HOUR_RING_LEN],
            cache: None,
        }
    }

    /// Draw `time` if it differs from what is on the rings
    ///
    /// Returns whether the rings were written.
    pub fn render<P: PixelOutput + ?Sized>(&mut self, time: &CalendarTime, out: &mut P) -> bool {
        let shown = DisplayedTime::from(time);
        if self.cache == Some(shown) {
            return false;
        }

        self.minute_ring.fill(OFF);
        self.hour_ring.fill(OFF);

        self.hour_ring[usize::from(shown.hour) % HOUR_RING_LEN] = self.palette.hours;
        let minute = usize::from(shown.minute) % MINUTE_RING_LEN;
        let second = usize::from(shown.second) % MINUTE_RING_LEN;
        if minute == second {
            self.minute_ring[minute] = self.palette.overlap;
        } else {
            self.minute_ring[minute] = self.palette.minutes;
            self.minute_ring[second] = self.palette.seconds;
        }

        out.write_ring(Ring::Minutes, &self.minute_ring);
        out.write_ring(Ring::Hours, &self.hour_ring);
        self.cache = Some(shown);
        true
    }

    /// Force the next [`render`](Self::render) to redraw
    pub fn invalidate(&mut self) {
        self.cache = None;
    }

    /// Current frame buffers: (minute ring, hour ring)
    pub fn frames(&self) -> (&[RGB8], &[RGB8]) {
        (&self.minute_ring, &self.hour_ring)
    }

    pub fn displayed(&self) -> Option<DisplayedTime> {
        self.cache
    }
}
