//! Night-mode brightness policy
//!
//! A single global brightness level is applied to the whole pixel chain,
//! independently of the colours the renderer picks. The level is only
//! pushed to hardware when the day/night state flips.

use ring_clock_hal::PixelOutput;

use crate::config::NightWindow;
use crate::time::CalendarTime;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BrightnessState {
    pub night_mode_active: bool,
    pub level: u8,
}

pub struct BrightnessPolicy {
    window: NightWindow,
    day_level: u8,
    night_level: u8,
    state: BrightnessState,
}

impl BrightnessPolicy {
    /// Starts in day mode at `day_level`
    pub fn new(window: NightWindow, day_level: u8, night_level: u8) -> Self {
        Self {
            window,
            day_level,
            night_level,
            state: BrightnessState {
                night_mode_active: false,
                level: day_level,
            },
        }
    }

    /// Re-evaluate night mode for `time`
    ///
    /// Returns whether a new level was written to `out`.
    pub fn evaluate<P: PixelOutput + ?Sized>(&mut self, time: &CalendarTime, out: &mut P) -> bool {
        let night = self.window.contains(time.hour());
        if night == self.state.night_mode_active {
            return false;
        }

        let level = if night {
            self.night_level
        } else {
            self.day_level
        };
        self.state = BrightnessState {
            night_mode_active: night,
            level,
        };
        out.set_brightness(level);

        if night {
            info!("Night mode on at {:02}:00, brightness {}", time.hour(), level);
        } else {
            info!("Night mode off at {:02}:00, brightness {}", time.hour(), level);
        }
        true
    }

    /// Write the current level without changing state
    pub fn force_apply<P: PixelOutput + ?Sized>(&self, out: &mut P) {
        out.set_brightness(self.state.level);
    }

    pub fn state(&self) -> BrightnessState {
        self.state
    }
}
