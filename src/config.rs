/// Tunables for the simulation step.
///
/// Every field has a default matching the stock 1280×720 game, so a YAML
/// file only needs to name what it changes.

use std::fs;
use std::path::Path;

use glam::DVec2;
use serde::{Deserialize, Serialize};

use crate::entities::EnemyLook;
use crate::error::ConfigError;

/// How bullets expire when they hit nothing.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "policy", rename_all = "snake_case")]
pub enum BulletRemoval {
    /// Drop a bullet once its traveled distance exceeds `max`.
    Distance { max: f64 },
    /// Drop a bullet once it leaves the playfield rectangle.
    Bounds,
}

impl Default for BulletRemoval {
    fn default() -> Self {
        BulletRemoval::Distance { max: 100.0 }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Playfield width in logical units.
    pub width: f64,
    /// Playfield height in logical units.
    pub height: f64,
    pub player_speed: f64,
    pub enemy_speed: f64,
    pub bullet_speed: f64,
    /// Spawning stops once this many enemies are alive.
    pub enemy_cap: usize,
    /// Side length of the square enemy hit box, measured from its top-left.
    pub enemy_hitbox: f64,
    pub bullet_removal: BulletRemoval,
    /// Added to the player's position to get a bullet's spawn point.
    pub muzzle_offset: DVec2,
    /// Frames that must pass after a shot before the next one.
    /// `0` fires every frame the trigger is held.
    pub fire_interval: u32,
    pub enemy_look: EnemyLook,
    /// Number of frames in the player's idle cycle.
    pub anim_frames: usize,
    /// Simulation frames each animation frame is shown for.
    pub anim_period: u32,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            width: 1280.0,
            height: 720.0,
            player_speed: 5.0,
            enemy_speed: 2.0,
            bullet_speed: 5.0,
            enemy_cap: 10,
            enemy_hitbox: 32.0,
            bullet_removal: BulletRemoval::default(),
            muzzle_offset: DVec2::ZERO,
            fire_interval: 0,
            enemy_look: EnemyLook::Sprite,
            anim_frames: 4,
            anim_period: 10,
        }
    }
}

impl SimConfig {
    /// Load a config from a YAML file and validate it.
    pub fn from_yaml_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml_str(&text)
    }

    pub fn from_yaml_str(text: &str) -> Result<Self, ConfigError> {
        let config: SimConfig = serde_yaml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(positive_finite(self.width) && positive_finite(self.height)) {
            return Err(ConfigError::Validation(format!(
                "playfield must be positive and finite, got {}x{}",
                self.width, self.height
            )));
        }

        let speeds = [
            ("player_speed", self.player_speed),
            ("enemy_speed", self.enemy_speed),
            ("bullet_speed", self.bullet_speed),
        ];
        for (name, speed) in speeds {
            if !(speed.is_finite() && speed >= 0.0) {
                return Err(ConfigError::Validation(format!(
                    "{name} must be a non-negative number, got {speed}"
                )));
            }
        }

        if !positive_finite(self.enemy_hitbox) {
            return Err(ConfigError::Validation(format!(
                "enemy_hitbox must be positive and finite, got {}",
                self.enemy_hitbox
            )));
        }

        if let BulletRemoval::Distance { max } = self.bullet_removal {
            if !positive_finite(max) {
                return Err(ConfigError::Validation(format!(
                    "bullet max distance must be positive and finite, got {max}"
                )));
            }
        }

        if !self.muzzle_offset.is_finite() {
            return Err(ConfigError::Validation("muzzle_offset must be finite".into()));
        }

        if self.anim_frames == 0 || self.anim_period == 0 {
            return Err(ConfigError::Validation(
                "anim_frames and anim_period must be at least 1".into(),
            ));
        }

        Ok(())
    }
}

fn positive_finite(value: f64) -> bool {
    value.is_finite() && value > 0.0
}
