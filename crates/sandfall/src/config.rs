//! Session configuration, validated once at construction.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised when validating a [`SimulationConfig`] or sizing a grid from it.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("verticalMoveChance {0} must be between 0.0 and 1.0")]
    VerticalChance(f64),
    #[error("lateralMoveChance {0} must be between 0.0 and 1.0")]
    LateralChance(f64),
    #[error("cellPitch must be positive")]
    ZeroCellPitch,
    #[error("hueIncrement {0} must be finite")]
    HueIncrement(f32),
    #[error("saturation {0} must be at most 100")]
    Saturation(u8),
    #[error("lightness {0} must be at most 100")]
    Lightness(u8),
    #[error("surface {width}x{height} is smaller than one {pitch}px cell")]
    EmptyGrid { width: u32, height: u32, pitch: u32 },
    #[error("invalid config json: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Tunables for one session. Immutable once a driver owns it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SimulationConfig {
    /// Chance per tick that an occupied cell tries to fall straight down.
    pub vertical_move_chance: f64,
    /// Chance per tick that a cell which did not fall tries a diagonal.
    pub lateral_move_chance: f64,
    /// Brush disc radius in cells.
    pub brush_radius: u32,
    /// Cell edge length in surface pixels.
    pub cell_pitch: u32,
    /// Hue degrees added per tick.
    pub hue_increment: f32,
    pub saturation: u8,
    pub lightness: u8,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            vertical_move_chance: 0.95,
            lateral_move_chance: 0.75,
            brush_radius: 3,
            cell_pitch: 5,
            hue_increment: 0.5,
            saturation: 80,
            lightness: 50,
        }
    }
}

impl SimulationConfig {
    /// Parse a camelCase JSON object; absent keys keep their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed JSON and any
    /// [`SimulationConfig::validate`] error for out-of-range values.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// # Errors
    ///
    /// Returns the first field found out of range.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&self.vertical_move_chance) {
            return Err(ConfigError::VerticalChance(self.vertical_move_chance));
        }
        if !(0.0..=1.0).contains(&self.lateral_move_chance) {
            return Err(ConfigError::LateralChance(self.lateral_move_chance));
        }
        if self.cell_pitch == 0 {
            return Err(ConfigError::ZeroCellPitch);
        }
        if !self.hue_increment.is_finite() {
            return Err(ConfigError::HueIncrement(self.hue_increment));
        }
        if self.saturation > 100 {
            return Err(ConfigError::Saturation(self.saturation));
        }
        if self.lightness > 100 {
            return Err(ConfigError::Lightness(self.lightness));
        }
        Ok(())
    }

    /// Grid `(rows, cols)` that fits a `width × height` pixel surface.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ZeroCellPitch`] or [`ConfigError::EmptyGrid`]
    /// when the surface holds no whole cell.
    pub fn grid_dimensions(&self, width: u32, height: u32) -> Result<(usize, usize), ConfigError> {
        if self.cell_pitch == 0 {
            return Err(ConfigError::ZeroCellPitch);
        }
        let rows = height / self.cell_pitch;
        let cols = width / self.cell_pitch;
        if rows == 0 || cols == 0 {
            return Err(ConfigError::EmptyGrid {
                width,
                height,
                pitch: self.cell_pitch,
            });
        }
        Ok((rows as usize, cols as usize))
    }
}
