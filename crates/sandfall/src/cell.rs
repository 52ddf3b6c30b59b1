//! Cell and Color types for the simulation grid.

use std::fmt;

/// Packed `0xRRGGBB` drawn for empty cells.
pub const BACKGROUND_RGB: u32 = 0x00_00_00;

/// HSL color in the units the canvas `hsl()` function takes:
/// hue in degrees `[0, 360)`, saturation and lightness in percent.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct Color {
    pub hue: u16,
    pub saturation: u8,
    pub lightness: u8,
}

impl Color {
    /// Builds a color, reducing `hue` modulo 360 and clamping the
    /// percentages to 100.
    #[must_use]
    pub fn new(hue: u16, saturation: u8, lightness: u8) -> Self {
        Self {
            hue: hue % 360,
            saturation: saturation.min(100),
            lightness: lightness.min(100),
        }
    }

    /// Color for an unbounded hue counter; the counter wraps at 360.
    #[must_use]
    pub fn from_hue(hue: f32, saturation: u8, lightness: u8) -> Self {
        let wrapped = hue.rem_euclid(360.0);
        // rem_euclid can round up to exactly 360.0 for tiny negative inputs.
        let degrees = if wrapped >= 360.0 { 0 } else { wrapped as u16 };
        Self::new(degrees, saturation, lightness)
    }

    /// Packed `0xRRGGBB`.
    #[must_use]
    pub fn to_rgb(self) -> u32 {
        let s = f32::from(self.saturation) / 100.0;
        let l = f32::from(self.lightness) / 100.0;
        let chroma = (1.0 - (2.0 * l - 1.0).abs()) * s;
        let sector = f32::from(self.hue) / 60.0;
        let x = chroma * (1.0 - (sector % 2.0 - 1.0).abs());
        let (r, g, b) = match self.hue / 60 {
            0 => (chroma, x, 0.0),
            1 => (x, chroma, 0.0),
            2 => (0.0, chroma, x),
            3 => (0.0, x, chroma),
            4 => (x, 0.0, chroma),
            _ => (chroma, 0.0, x),
        };
        let m = l - chroma / 2.0;
        let channel = |v: f32| (((v + m) * 255.0).round().clamp(0.0, 255.0)) as u32;
        (channel(r) << 16) | (channel(g) << 8) | channel(b)
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "hsl({}, {}%, {}%)", self.hue, self.saturation, self.lightness)
    }
}

/// One grid position. Emptiness is the variant, never a color value.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
pub enum Cell {
    #[default]
    Empty,
    Occupied(Color),
}

impl Cell {
    #[must_use]
    pub fn is_empty(self) -> bool {
        matches!(self, Self::Empty)
    }

    #[must_use]
    pub fn is_occupied(self) -> bool {
        !self.is_empty()
    }

    #[must_use]
    pub fn color(self) -> Option<Color> {
        match self {
            Self::Empty => None,
            Self::Occupied(color) => Some(color),
        }
    }

    /// Packed `0xRRGGBB` as drawn on screen.
    #[must_use]
    pub fn rgb(self) -> u32 {
        self.color().map_or(BACKGROUND_RGB, Color::to_rgb)
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "Empty"),
            Self::Occupied(color) => write!(f, "Occupied({color})"),
        }
    }
}
