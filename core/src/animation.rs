//! Top-of-hour chase animation
//!
//! When minute and second both read zero the engine takes over both rings
//! for a fixed duration and runs a coloured window around them. The
//! trigger is level-checked on every pass and latched, so holding 00:00
//! for several passes starts exactly one animation; the latch re-arms as
//! soon as the time leaves the top of the hour. With
//! [`AnimationConfig::every_minute`] set, every minute boundary triggers.

use ring_clock_hal::{PixelOutput, Ring, RGB8};

use crate::config::AnimationConfig;
use crate::renderer::{HOUR_RING_LEN, MINUTE_RING_LEN};
use crate::time::CalendarTime;

const BLACK: RGB8 = RGB8 { r: 0, g: 0, b: 0 };
const RED: RGB8 = RGB8 { r: 255, g: 0, b: 0 };
const GREEN: RGB8 = RGB8 { r: 0, g: 255, b: 0 };
const BLUE: RGB8 = RGB8 { r: 0, g: 0, b: 255 };

/// Animation lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AnimationState {
    Idle,
    Running { started_at_ms: u64 },
}

/// Outcome of one [`AnimationEngine::update`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AnimationEvent {
    /// Nothing running; the time display owns the pixels
    Idle,
    /// Animation began on this pass
    Started,
    /// Animation in progress
    Running { elapsed_ms: u64 },
    /// Animation ended on this pass; the time display must redraw
    Finished,
}

impl AnimationEvent {
    /// Whether the animation owns the pixels after this pass
    pub fn owns_pixels(&self) -> bool {
        matches!(self, Self::Started | Self::Running { .. })
    }
}

/// Hour-boundary animation state machine and frame generator
pub struct AnimationEngine {
    config: AnimationConfig,
    state: AnimationState,
    armed: bool,
    last_position: Option<(usize, usize)>,
    minute_ring: [RGB8; MINUTE_RING_LEN],
    hour_ring: [RGB8; HOUR_RING_LEN],
}

impl AnimationEngine {
    pub fn new(config: AnimationConfig) -> Self {
        Self {
            config,
            state: AnimationState::Idle,
            armed: true,
            last_position: None,
            minute_ring: [BLACK; MINUTE_RING_LEN],
            hour_ring: [BLACK; HOUR_RING_LEN],
        }
    }

    /// Advance the state machine with the current time snapshot
    pub fn update(&mut self, time: &CalendarTime, now_ms: u64) -> AnimationEvent {
        let boundary = if self.config.every_minute {
            time.second() == 0
        } else {
            time.is_top_of_hour()
        };
        if !boundary {
            self.armed = true;
        }

        match self.state {
            AnimationState::Running { started_at_ms } => {
                let elapsed_ms = now_ms.saturating_sub(started_at_ms);
                if elapsed_ms >= self.config.duration_ms {
                    self.state = AnimationState::Idle;
                    self.last_position = None;
                    info!("Hour animation finished after {} ms", elapsed_ms);
                    AnimationEvent::Finished
                } else {
                    AnimationEvent::Running { elapsed_ms }
                }
            }
            AnimationState::Idle if boundary && self.armed => {
                self.armed = false;
                self.state = AnimationState::Running {
                    started_at_ms: now_ms,
                };
                info!(
                    "Hour animation started at {:02}:{:02}",
                    time.hour(),
                    time.minute()
                );
                AnimationEvent::Started
            }
            AnimationState::Idle => AnimationEvent::Idle,
        }
    }

    /// Whether an animation started at some t0 is still inside [t0, t0 + duration)
    pub fn is_active(&self, now_ms: u64) -> bool {
        match self.state {
            AnimationState::Running { started_at_ms } => {
                now_ms.saturating_sub(started_at_ms) < self.config.duration_ms
            }
            AnimationState::Idle => false,
        }
    }

    pub fn state(&self) -> AnimationState {
        self.state
    }

    /// Push the frame for `elapsed_ms` to both rings
    ///
    /// Frames only change every `step_ms`; repeated calls within one step
    /// write nothing. Returns whether the rings were written.
    pub fn draw<P: PixelOutput + ?Sized>(&mut self, elapsed_ms: u64, out: &mut P) -> bool {
        let step = elapsed_ms.checked_div(self.config.step_ms).unwrap_or(0);
        // Ring lengths are tiny, so the modulo result always fits
        let minute_pos = (step % MINUTE_RING_LEN as u64) as usize;
        let hour_pos = (step % HOUR_RING_LEN as u64) as usize;

        if self.last_position == Some((minute_pos, hour_pos)) {
            return false;
        }

        chase(&mut self.minute_ring, minute_pos, self.config.minute_window);
        chase(&mut self.hour_ring, hour_pos, self.config.hour_window);
        out.write_ring(Ring::Minutes, &self.minute_ring);
        out.write_ring(Ring::Hours, &self.hour_ring);
        self.last_position = Some((minute_pos, hour_pos));
        true
    }
}

/// Light `window` consecutive pixels from `position`, wrapping around
///
/// The window is split in thirds: red, green, then blue for the rest.
fn chase(ring: &mut [RGB8], position: usize, window: usize) {
    ring.fill(BLACK);
    let len = ring.len();
    let third = window / 3;

    for i in 0..window.min(len) {
        ring[(position + i) % len] = if i < third {
            RED
        } else if i < 2 * third {
            GREEN
        } else {
            BLUE
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::RecordingPixels;

    fn at(hour: u8, minute: u8, second: u8) -> CalendarTime {
        CalendarTime::new(2025, 6, 1, hour, minute, second).unwrap()
    }

    fn lit(ring: &[RGB8]) -> usize {
        ring.iter().filter(|&&p| p != BLACK).count()
    }

    #[test]
    fn test_latches_on_held_top_of_hour() {
        let mut engine = AnimationEngine::new(AnimationConfig::default());
        let top = at(14, 0, 0);

        let events = [
            engine.update(&top, 1000),
            engine.update(&top, 1010),
            engine.update(&top, 1020),
        ];
        let starts = events
            .iter()
            .filter(|&&e| e == AnimationEvent::Started)
            .count();
        assert_eq!(starts, 1);
        assert_eq!(events[1], AnimationEvent::Running { elapsed_ms: 10 });
    }

    #[test]
    fn test_latch_holds_after_finishing_inside_top_second() {
        let config = AnimationConfig {
            duration_ms: 100,
            ..AnimationConfig::default()
        };
        let mut engine = AnimationEngine::new(config);
        let top = at(14, 0, 0);

        assert_eq!(engine.update(&top, 0), AnimationEvent::Started);
        assert_eq!(engine.update(&top, 150), AnimationEvent::Finished);
        assert_eq!(engine.update(&top, 200), AnimationEvent::Idle);
    }

    #[test]
    fn test_bounded_duration() {
        let mut engine = AnimationEngine::new(AnimationConfig::default());
        let t0 = 42_000;
        engine.update(&at(9, 0, 0), t0);

        for t in [t0, t0 + 1, t0 + 2500, t0 + 4999] {
            assert!(engine.is_active(t), "inactive at t0 + {}", t - t0);
        }
        assert!(!engine.is_active(t0 + 5000));
        assert!(!engine.is_active(t0 + 60_000));

        assert_eq!(
            engine.update(&at(9, 0, 4), t0 + 4999),
            AnimationEvent::Running { elapsed_ms: 4999 }
        );
        assert_eq!(engine.update(&at(9, 0, 5), t0 + 5000), AnimationEvent::Finished);
        assert_eq!(engine.state(), AnimationState::Idle);
        assert!(!engine.is_active(t0 + 5000));
    }

    #[test]
    fn test_rearms_for_next_hour() {
        let mut engine = AnimationEngine::new(AnimationConfig::default());
        assert_eq!(engine.update(&at(9, 0, 0), 0), AnimationEvent::Started);
        assert_eq!(engine.update(&at(9, 0, 6), 6000), AnimationEvent::Finished);
        assert_eq!(engine.update(&at(9, 30, 0), 1_800_000), AnimationEvent::Idle);
        assert_eq!(engine.update(&at(10, 0, 0), 3_600_000), AnimationEvent::Started);
    }

    #[test]
    fn test_never_starts_off_the_hour() {
        let mut engine = AnimationEngine::new(AnimationConfig::default());
        for (i, (m, s)) in [(0, 1), (1, 0), (59, 59), (30, 0)].into_iter().enumerate() {
            assert_eq!(engine.update(&at(12, m, s), i as u64), AnimationEvent::Idle);
        }
    }

    #[test]
    fn test_every_minute_trigger() {
        let config = AnimationConfig {
            every_minute: true,
            ..AnimationConfig::default()
        };
        let mut engine = AnimationEngine::new(config);

        assert_eq!(engine.update(&at(12, 17, 59), 0), AnimationEvent::Idle);
        assert_eq!(engine.update(&at(12, 18, 0), 1000), AnimationEvent::Started);
        assert_eq!(engine.update(&at(12, 18, 0), 1500), AnimationEvent::Running { elapsed_ms: 500 });
        assert_eq!(engine.update(&at(12, 18, 6), 7000), AnimationEvent::Finished);
        assert_eq!(engine.update(&at(12, 18, 30), 31_000), AnimationEvent::Idle);
        assert_eq!(engine.update(&at(12, 19, 0), 61_000), AnimationEvent::Started);
    }

    #[test]
    fn test_chase_frame() {
        let mut engine = AnimationEngine::new(AnimationConfig::default());
        let mut out = RecordingPixels::new();

        assert!(engine.draw(0, &mut out));
        assert_eq!(lit(&out.minutes), 10);
        assert_eq!(lit(&out.hours), 3);
        assert_eq!(&out.minutes[0..3], &[RED; 3]);
        assert_eq!(&out.minutes[3..6], &[GREEN; 3]);
        assert_eq!(&out.minutes[6..10], &[BLUE; 4]);
        assert_eq!(&out.hours[0..3], &[RED, GREEN, BLUE]);

        // Step 57: the minute window wraps past pixel 59
        assert!(engine.draw(5_700, &mut out));
        assert_eq!(lit(&out.minutes), 10);
        assert_eq!(out.minutes[57], RED);
        assert_eq!(out.minutes[59], RED);
        assert_eq!(out.minutes[0], GREEN);
        assert_eq!(out.minutes[6], BLUE);
        // 57 % 12 = 9
        assert_eq!(&out.hours[9..12], &[RED, GREEN, BLUE]);
    }

    #[test]
    fn test_draw_skips_unchanged_step() {
        let mut engine = AnimationEngine::new(AnimationConfig::default());
        let mut out = RecordingPixels::new();

        assert!(engine.draw(100, &mut out));
        assert!(!engine.draw(150, &mut out));
        assert!(!engine.draw(199, &mut out));
        assert!(engine.draw(200, &mut out));
        assert_eq!(out.minute_writes, 2);
        assert_eq!(out.hour_writes, 2);
    }
}
