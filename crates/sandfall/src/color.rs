//! Hue cycling for freshly painted sand.

use crate::cell::Color;

/// Next hue. The counter is left unbounded; [`Color::from_hue`] wraps it.
#[must_use]
pub fn advance(hue: f32, increment: f32) -> f32 {
    hue + increment
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ColorCycler {
    hue: f32,
    increment: f32,
    saturation: u8,
    lightness: u8,
}

impl ColorCycler {
    #[must_use]
    pub fn new(increment: f32, saturation: u8, lightness: u8) -> Self {
        Self {
            hue: 0.0,
            increment,
            saturation,
            lightness,
        }
    }

    /// Raw hue counter.
    #[must_use]
    pub fn hue(&self) -> f32 {
        self.hue
    }

    #[must_use]
    pub fn current(&self) -> Color {
        Color::from_hue(self.hue, self.saturation, self.lightness)
    }

    pub fn advance(&mut self) {
        self.hue = advance(self.hue, self.increment);
        // Large f32 counters lose the fractional increment.
        if self.hue.abs() >= 360.0 * 1024.0 {
            self.hue = self.hue.rem_euclid(360.0);
        }
    }
}
