use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::grid::MAX_SIZE;

/// Largest number of moves that can be kept for undo.
pub const MAX_UNDO_DEPTH: usize = 4096;

/// Engine configuration.
///
/// Every field may be omitted from a TOML file and then takes its default:
///
/// ```toml
/// size = 5
/// target = 4096
/// undo_depth = 3
/// seed = 42
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameConfig {
    /// Side length of the square grid.
    #[serde(default = "defaults::size")]
    pub size: usize,

    /// Tile value whose first appearance wins the game.
    #[serde(default = "defaults::target")]
    pub target: u32,

    /// Number of moves that can be undone. 0 disables undo.
    #[serde(default = "defaults::undo_depth")]
    pub undo_depth: usize,

    /// Spawner seed. `None` seeds from system entropy.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            size: defaults::size(),
            target: defaults::target(),
            undo_depth: defaults::undo_depth(),
            seed: None,
        }
    }
}

impl GameConfig {
    /// Default configuration with a fixed spawner seed.
    pub fn seeded(seed: u64) -> Self {
        Self {
            seed: Some(seed),
            ..Self::default()
        }
    }

    pub fn from_toml<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let cfg: Self = toml::from_str(contents)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Reject grids smaller than 2x2 and targets that can never be built
    /// from merges or that spawn already satisfies.
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate(self.size, self.target)?;
        if self.undo_depth > MAX_UNDO_DEPTH {
            return Err(ConfigError::UndoDepthTooLarge {
                depth: self.undo_depth,
                max: MAX_UNDO_DEPTH,
            });
        }
        Ok(())
    }
}

pub(crate) fn validate(size: usize, target: u32) -> Result<(), ConfigError> {
    if size < 2 {
        return Err(ConfigError::GridTooSmall(size));
    }
    if size > MAX_SIZE {
        return Err(ConfigError::GridTooLarge {
            size,
            max: MAX_SIZE,
        });
    }
    if target < 4 || !target.is_power_of_two() {
        return Err(ConfigError::InvalidTarget(target));
    }
    Ok(())
}

mod defaults {
    pub fn size() -> usize { 4 }
    pub fn target() -> u32 { 2048 }
    pub fn undo_depth() -> usize { 1 }
}
