//! Game options
//!
//! Set once at startup and immutable afterwards. JSON keys are camelCase so a
//! page can embed the same option object it always used (`nEnemies`, ...).

use serde::{Deserialize, Serialize};

use crate::consts::{ENTITY_RADIUS, MAX_ENEMIES, SPAWN_MARGIN};
use crate::error::ConfigError;

/// Play field and population configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GameOptions {
    /// Play field height in CSS pixels
    pub height: u32,
    /// Play field width in CSS pixels
    pub width: u32,
    /// Number of enemies
    pub n_enemies: usize,
    /// Inset between the canvas edge and the play field
    pub padding: u32,
    /// Enemy circle radius
    pub enemy_radius: f32,
    /// Player circle radius
    pub player_radius: f32,
}

impl Default for GameOptions {
    fn default() -> Self {
        Self {
            height: 450,
            width: 700,
            n_enemies: 20,
            padding: 20,
            enemy_radius: ENTITY_RADIUS,
            player_radius: ENTITY_RADIUS,
        }
    }
}

impl GameOptions {
    /// Parse options from JSON and validate them
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let options: Self = serde_json::from_str(json)?;
        options.validate()?;
        Ok(options)
    }

    /// Load options from a JSON file
    pub fn load(path: &std::path::Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Reject fields that would produce empty spawn ranges or undrawable scenes
    pub fn validate(&self) -> Result<(), ConfigError> {
        let min = 2 * SPAWN_MARGIN;
        if self.width <= min || self.height <= min {
            return Err(ConfigError::FieldTooSmall {
                width: self.width,
                height: self.height,
                min,
            });
        }
        if self.n_enemies > MAX_ENEMIES {
            return Err(ConfigError::TooManyEnemies {
                requested: self.n_enemies,
                max: MAX_ENEMIES,
            });
        }
        for (which, value) in [("enemy", self.enemy_radius), ("player", self.player_radius)] {
            if !value.is_finite() || value <= 0.0 {
                return Err(ConfigError::InvalidRadius { which, value });
            }
        }
        Ok(())
    }

    /// Canvas size in CSS pixels (field plus padding on every side)
    pub fn canvas_size(&self) -> (u32, u32) {
        (
            self.width + 2 * self.padding,
            self.height + 2 * self.padding,
        )
    }
}
