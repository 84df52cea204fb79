#![deny(unsafe_code)]
//! WS2812 ring output
//!
//! Each ring hangs off its own blocking SPI bus, with only MOSI routed to
//! the data line. Brightness is applied in software on every transfer, so
//! changing it re-sends the last frame of both rings. Transfers run with
//! interrupts masked.

use defmt::warn;
use embassy_stm32::mode::Blocking;
use embassy_stm32::spi::Spi;
use embassy_stm32::time::Hertz;
use ring_clock_core::renderer::{HOUR_RING_LEN, MINUTE_RING_LEN};
use ring_clock_hal::{PixelOutput, Ring, RGB8};
use smart_leds::{brightness, SmartLedsWrite};
use ws2812_spi::Ws2812;

type RingDriver = Ws2812<Spi<'static, Blocking>>;

/// WS2812 bit timing needs the SPI clock between 2 and 3.8 MHz
pub const LED_SPI_FREQUENCY: Hertz = Hertz(3_000_000);

const OFF: RGB8 = RGB8 { r: 0, g: 0, b: 0 };

/// Minute ring on one SPI bus, hour ring on another
pub struct RingPixels {
    minutes: RingDriver,
    hours: RingDriver,
    level: u8,
    minute_frame: [RGB8; MINUTE_RING_LEN],
    hour_frame: [RGB8; HOUR_RING_LEN],
}

impl RingPixels {
    /// Both buses must run at [`LED_SPI_FREQUENCY`]
    pub fn new(minute_spi: Spi<'static, Blocking>, hour_spi: Spi<'static, Blocking>) -> Self {
        Self {
            minutes: Ws2812::new(minute_spi),
            hours: Ws2812::new(hour_spi),
            level: u8::MAX,
            minute_frame: [OFF; MINUTE_RING_LEN],
            hour_frame: [OFF; HOUR_RING_LEN],
        }
    }

    /// Send one ring with interrupts masked
    ///
    /// WS2812s latch on a low gap of about 50 us, so a preempted transfer
    /// would show a partial frame. A full minute ring takes about 2 ms.
    fn flush(&mut self, ring: Ring) {
        let level = self.level;
        let (driver, frame): (&mut RingDriver, &[RGB8]) = match ring {
            Ring::Minutes => (&mut self.minutes, &self.minute_frame[..]),
            Ring::Hours => (&mut self.hours, &self.hour_frame[..]),
        };
        let result = cortex_m::interrupt::free(|_| {
            driver.write(brightness(frame.iter().copied(), level))
        });
        if result.is_err() {
            warn!("LED transfer to {} ring failed", ring);
        }
    }
}

impl PixelOutput for RingPixels {
    fn write_ring(&mut self, ring: Ring, frame: &[RGB8]) {
        let target: &mut [RGB8] = match ring {
            Ring::Minutes => &mut self.minute_frame,
            Ring::Hours => &mut self.hour_frame,
        };
        let len = target.len().min(frame.len());
        target[..len].copy_from_slice(&frame[..len]);
        self.flush(ring);
    }

    fn set_brightness(&mut self, level: u8) {
        self.level = level;
        self.flush(Ring::Minutes);
        self.flush(Ring::Hours);
    }
}
