//! Platform-agnostic timekeeping and display engine for the ring clock
//!
//! This crate contains all clock logic that can be shared across boards.
//! It has NO hardware dependencies: the RTC, the network time source and
//! the LED rings are reached through the `ring-clock-hal` traits.
//!
//! ## Architecture
//! - [`tick::TickFlag`] is the only state shared with interrupt context
//! - [`clock::HardwareClock`] wraps the RTC and consumes ticks
//! - [`authority::TimeAuthority`] owns the canonical time and its validity
//! - [`animation::AnimationEngine`] plays the top-of-hour chase
//! - [`renderer::DisplayRenderer`] draws the time, only when it changes
//! - [`brightness::BrightnessPolicy`] switches night mode on and off
//! - [`controller::ClockController`] runs one control-loop pass over all of the above

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

#[macro_use]
mod fmt;

pub mod animation;
pub mod authority;
pub mod brightness;
pub mod calendar;
pub mod clock;
pub mod config;
pub mod controller;
pub mod renderer;
pub mod tick;
pub mod time;

#[cfg(test)]
mod testing;

pub use authority::{SyncError, TimeAuthority};
pub use clock::HardwareClock;
pub use config::ClockConfig;
pub use controller::{ClockController, StepReport};
pub use tick::TickFlag;
pub use time::CalendarTime;
