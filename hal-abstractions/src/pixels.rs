//! Pixel output boundary

pub use smart_leds::RGB8;

/// The two concentric LED rings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Ring {
    /// Outer 60-pixel ring showing minutes and seconds
    Minutes,
    /// Inner 12-pixel ring showing hours
    Hours,
}

/// Pixel output chain
///
/// Frame writes are synchronous and always succeed. Brightness is a single
/// scalar applied to every pixel on both rings, independent of the colours
/// in the frames.
pub trait PixelOutput {
    /// Replace the full frame of `ring` and push it to the LEDs
    fn write_ring(&mut self, ring: Ring, frame: &[RGB8]);

    /// Set the global brightness (0 = off, 255 = full)
    fn set_brightness(&mut self, level: u8);
}

impl<T: PixelOutput + ?Sized> PixelOutput for &mut T {
    fn write_ring(&mut self, ring: Ring, frame: &[RGB8]) {
        (**self).write_ring(ring, frame)
    }

    fn set_brightness(&mut self, level: u8) {
        (**self).set_brightness(level)
    }
}
