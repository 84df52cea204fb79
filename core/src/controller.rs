//! Main control loop pass
//!
//! One [`ClockController::step`] runs the whole per-iteration flow:
//!
//! 1. consume a pending tick and refresh the time
//! 2. let the animation engine claim the rings at the top of the hour
//! 3. otherwise redraw the time display if it changed
//! 4. re-evaluate night mode
//!
//! The caller owns scheduling: it calls `step` as often as it likes and
//! triggers a network sync when [`ClockController::sync_due`] fires. Steps
//! 1 to 4 keep running while a sync waits on the network.

use ring_clock_hal::{HardwareFault, NetworkTimeSource, PixelOutput, RealTimeClock};

use crate::animation::{AnimationEngine, AnimationEvent, AnimationState};
use crate::authority::{SyncError, TimeAuthority};
use crate::brightness::{BrightnessPolicy, BrightnessState};
use crate::clock::HardwareClock;
use crate::config::ClockConfig;
use crate::renderer::DisplayRenderer;
use crate::time::CalendarTime;

/// What one control-loop pass did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct StepReport {
    /// A tick was consumed and the time re-read
    pub ticked: bool,
    /// The time display was redrawn
    pub redrawn: bool,
    /// Animation engine outcome
    pub animation: AnimationEvent,
    /// A new brightness level was written
    pub brightness_changed: bool,
}

/// Everything downstream of the time: animation, time display, night mode
struct Display {
    animation: AnimationEngine,
    renderer: DisplayRenderer,
    brightness: BrightnessPolicy,
}

impl Display {
    fn show<P: PixelOutput + ?Sized>(
        &mut self,
        time: &CalendarTime,
        now_ms: u64,
        out: &mut P,
    ) -> (AnimationEvent, bool, bool) {
        let animation = self.animation.update(time, now_ms);
        let redrawn = match animation {
            AnimationEvent::Started => {
                self.animation.draw(0, out);
                false
            }
            AnimationEvent::Running { elapsed_ms } => {
                self.animation.draw(elapsed_ms, out);
                false
            }
            AnimationEvent::Finished => {
                self.renderer.invalidate();
                self.renderer.render(time, out)
            }
            AnimationEvent::Idle => self.renderer.render(time, out),
        };

        let brightness_changed = self.brightness.evaluate(time, out);
        (animation, redrawn, brightness_changed)
    }
}

/// Owns every piece of clock state touched by the main loop
pub struct ClockController<'a, R> {
    authority: TimeAuthority<'a, R>,
    display: Display,
    midnight_seen: bool,
}

impl<'a, R: RealTimeClock> ClockController<'a, R> {
    pub fn new(clock: HardwareClock<'a, R>, config: ClockConfig) -> Self {
        Self {
            authority: TimeAuthority::new(clock, config.sync, config.tz_offset_hours),
            display: Display {
                animation: AnimationEngine::new(config.animation),
                renderer: DisplayRenderer::new(config.palette),
                brightness: BrightnessPolicy::new(
                    config.night,
                    config.day_brightness,
                    config.night_brightness,
                ),
            },
            midnight_seen: false,
        }
    }

    /// Initialise the output chain: brightness first, then the first frame
    pub fn start<P: PixelOutput + ?Sized>(&mut self, out: &mut P) {
        let time = self.authority.now();
        let display = &mut self.display;
        if !display.brightness.evaluate(&time, out) {
            display.brightness.force_apply(out);
        }
        display.renderer.invalidate();
        display.renderer.render(&time, out);
    }

    /// Run one pass of the control flow
    pub fn step<P: PixelOutput + ?Sized>(&mut self, now_ms: u64, out: &mut P) -> StepReport {
        let ticked = self.authority.update();
        let time = self.authority.now();
        let (animation, redrawn, brightness_changed) = self.display.show(&time, now_ms, out);

        StepReport {
            ticked,
            redrawn,
            animation,
            brightness_changed,
        }
    }

    /// Synchronize the clock with a network time source
    ///
    /// A full control pass runs between polls, timestamped by `now_ms`, so
    /// the display and the hour animation keep going during the wait. The
    /// next [`step`](Self::step) shows the corrected time.
    pub fn sync_from_network<S, P, T>(
        &mut self,
        source: &mut S,
        out: &mut P,
        mut now_ms: T,
    ) -> Result<(), SyncError>
    where
        S: NetworkTimeSource + ?Sized,
        P: PixelOutput + ?Sized,
        T: FnMut() -> u64,
    {
        let display = &mut self.display;
        self.authority.sync_from_network_with(source, |authority| {
            authority.update();
            let time = authority.now();
            display.show(&time, now_ms(), out);
        })
    }

    /// Set the clock from a trusted UTC epoch
    pub fn set_manual_time(&mut self, epoch: u64) -> Result<(), HardwareFault> {
        self.authority.set_manual_time(epoch)
    }

    /// Daily resync trigger
    ///
    /// True on the first call during local 00:00:00, false for every other
    /// call within that second.
    pub fn sync_due(&mut self) -> bool {
        let midnight = self.authority.sync_due();
        let due = midnight && !self.midnight_seen;
        self.midnight_seen = midnight;
        due
    }

    pub fn now(&self) -> CalendarTime {
        self.authority.now()
    }

    pub fn is_valid(&self) -> bool {
        self.authority.is_valid()
    }

    pub fn brightness(&self) -> BrightnessState {
        self.display.brightness.state()
    }

    pub fn animation(&self) -> AnimationState {
        self.display.animation.state()
    }
}
