use std::path::{Path, PathBuf};

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Errors from loading or validating a game configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Everything tunable about a session. Missing YAML keys take defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Number of trash pieces scattered once the template loads.
    pub trash_count: usize,
    /// Placement seed. `None` draws one from the OS.
    pub seed: Option<u64>,
    /// Half-width of the XZ collision box.
    pub collision_extent: f32,
    pub boat: BoatConfig,
    pub trash: TrashConfig,
    pub assets: AssetPaths,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            trash_count: 10,
            seed: None,
            collision_extent: crate::collision::COLLISION_EXTENT,
            boat: BoatConfig::default(),
            trash: TrashConfig::default(),
            assets: AssetPaths::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoatConfig {
    pub start_position: Vec3,
    /// Radians about +Y.
    pub start_heading: f32,
    pub scale: f32,
    /// Units per reference frame at full throttle.
    pub forward_speed: f32,
    /// Radians per reference frame at full rudder.
    pub turn_rate: f32,
}

impl Default for BoatConfig {
    fn default() -> Self {
        Self {
            start_position: Vec3::new(5.0, 13.0, 50.0),
            start_heading: 1.5,
            scale: 3.0,
            forward_speed: 1.0,
            turn_rate: 0.1,
        }
    }
}

/// Trash placement: a dense band near the origin and a sparse wide band.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrashConfig {
    pub scale: f32,
    /// Fixed Y, just under the water plane.
    pub depth: f32,
    /// Chance a piece lands in the near band.
    pub near_probability: f64,
    pub near_extent: f32,
    pub far_extent_x: f32,
    pub far_extent_z: f32,
}

impl Default for TrashConfig {
    fn default() -> Self {
        Self {
            scale: 1.5,
            depth: -0.5,
            near_probability: 0.6,
            near_extent: 100.0,
            far_extent_x: 500.0,
            far_extent_z: 1000.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssetPaths {
    pub boat: PathBuf,
    pub trash: PathBuf,
}

impl Default for AssetPaths {
    fn default() -> Self {
        Self {
            boat: PathBuf::from("assets/boat/scene.gltf"),
            trash: PathBuf::from("assets/trash/scene.gltf"),
        }
    }
}

impl GameConfig {
    /// Read and validate a YAML config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path.as_ref())?;
        let config = Self::from_yaml_str(&text)?;
        tracing::debug!(path = %path.as_ref().display(), "config loaded");
        Ok(config)
    }

    pub fn from_yaml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_yaml(&self) -> Result<String, ConfigError> {
        Ok(serde_yaml::to_string(self)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let t = &self.trash;
        if !(0.0..=1.0).contains(&t.near_probability) {
            return Err(ConfigError::Invalid(format!(
                "trash.near_probability must be within [0, 1], got {}",
                t.near_probability
            )));
        }
        for (name, value) in [
            ("collision_extent", self.collision_extent),
            ("trash.near_extent", t.near_extent),
            ("trash.far_extent_x", t.far_extent_x),
            ("trash.far_extent_z", t.far_extent_z),
            ("trash.scale", t.scale),
            ("boat.scale", self.boat.scale),
        ] {
            if !(value > 0.0 && value.is_finite()) {
                return Err(ConfigError::Invalid(format!(
                    "{name} must be positive, got {value}"
                )));
            }
        }
        Ok(())
    }
}
