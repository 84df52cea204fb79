//! Clock configuration structures
//!
//! Defaults match the reference hardware: UTC+1, night mode 22:00-07:00 at
//! brightness 50/255, blue hours, green minutes, red seconds.

use ring_clock_hal::RGB8;

/// Build an [`RGB8`] from a `0xRRGGBB` literal
pub const fn rgb(hex: u32) -> RGB8 {
    RGB8 {
        r: (hex >> 16) as u8,
        g: (hex >> 8) as u8,
        b: hex as u8,
    }
}

/// Top-level clock configuration
#[derive(Debug, Clone)]
pub struct ClockConfig {
    /// Whole-hour offset from UTC applied to network time
    pub tz_offset_hours: i8,
    /// Night-mode window
    pub night: NightWindow,
    /// Brightness outside the night window
    pub day_brightness: u8,
    /// Brightness inside the night window
    pub night_brightness: u8,
    /// Ring colours
    pub palette: Palette,
    /// Top-of-hour animation timing
    pub animation: AnimationConfig,
    /// Network sync bounds
    pub sync: SyncConfig,
}

impl Default for ClockConfig {
    fn default() -> Self {
        Self {
            tz_offset_hours: 1,
            night: NightWindow::default(),
            day_brightness: 255,
            night_brightness: 50,
            palette: Palette::default(),
            animation: AnimationConfig::default(),
            sync: SyncConfig::default(),
        }
    }
}

/// Night-mode hours, local time
///
/// A window with `start_hour > end_hour` wraps past midnight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct NightWindow {
    /// First night hour (0-23)
    pub start_hour: u8,
    /// First day hour after the night (0-23)
    pub end_hour: u8,
}

impl NightWindow {
    /// Whether `hour` falls inside the window
    ///
    /// An empty window (`start_hour == end_hour`) never contains any hour.
    pub fn contains(&self, hour: u8) -> bool {
        if self.start_hour > self.end_hour {
            hour >= self.start_hour || hour < self.end_hour
        } else {
            hour >= self.start_hour && hour < self.end_hour
        }
    }
}

impl Default for NightWindow {
    fn default() -> Self {
        Self {
            start_hour: 22,
            end_hour: 7,
        }
    }
}

/// Ring colours for the time display
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    /// Hour pixel on the inner ring
    pub hours: RGB8,
    /// Minute pixel on the outer ring
    pub minutes: RGB8,
    /// Second pixel on the outer ring
    pub seconds: RGB8,
    /// Outer-ring pixel when minute and second coincide
    pub overlap: RGB8,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            hours: rgb(0x0000FF),
            minutes: rgb(0x00FF00),
            seconds: rgb(0xFF0000),
            overlap: rgb(0xFFFF00),
        }
    }
}

/// Top-of-hour chase animation timing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AnimationConfig {
    /// Total run time
    pub duration_ms: u64,
    /// Time per chase step
    pub step_ms: u64,
    /// Lit pixels on the minute ring
    pub minute_window: usize,
    /// Lit pixels on the hour ring
    pub hour_window: usize,
    /// Trigger at every minute boundary instead of every hour, for bench
    /// testing
    pub every_minute: bool,
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            duration_ms: 5000,
            step_ms: 100,
            minute_window: 10,
            hour_window: 3,
            every_minute: false,
        }
    }
}

/// Network time sync bounds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SyncConfig {
    /// Ceiling on one sync attempt
    pub timeout_ms: u32,
    /// Wait per poll of the source
    pub poll_interval_ms: u32,
    /// Earliest accepted UTC epoch (2020-01-01)
    pub min_epoch: u64,
    /// Latest accepted UTC epoch (2100-01-01)
    pub max_epoch: u64,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            timeout_ms: 5000,
            poll_interval_ms: 100,
            min_epoch: 1_577_836_800,
            max_epoch: 4_102_444_800,
        }
    }
}
