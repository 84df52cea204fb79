//! Hardware abstraction traits for the ring clock firmware
//!
//! This crate defines the boundary between the platform-agnostic clock
//! engine and the board: the RTC peripheral, the network time source and
//! the pixel output chain. BSPs implement these traits.

#![no_std]
#![deny(unsafe_code)]

pub mod network;
pub mod pixels;
pub mod rtc;

pub use network::NetworkTimeSource;
pub use pixels::{PixelOutput, Ring, RGB8};
pub use rtc::{HardwareFault, RealTimeClock};
