use std::fs;
use std::io;
use std::path::Path;
use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

use crate::CellOffset;
use crate::rule_set::RuleSet;

/// Config file picked up from the working directory when none is given
pub const DEFAULT_CONFIG_FILE: &str = "lifefield.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid config: `{field}` must be greater than zero")]
    Zero { field: &'static str },

    #[error("Invalid config: `{field}` must be at most {max}")]
    TooLarge { field: &'static str, max: usize },
}

/// Startup settings. Fixed for the lifetime of a session.
///
/// Every field is optional in the config file:
///
/// ```toml
/// cell_size = 4
/// grid_width = 60
/// grid_height = 40
/// update_interval_ms = 100
/// rule = "B3/S23"
/// export_dir = "."
/// log_file = "lifefield.log"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Side length of a cell, in surface pixels
    pub cell_size: u16,

    /// Field width, in cells
    pub grid_width: usize,

    /// Field height, in cells
    pub grid_height: usize,

    /// Time between generations while running
    pub update_interval_ms: u64,

    pub rule: RuleSet,

    /// Where exported fields are written
    pub export_dir: PathBuf,

    pub log_file: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            cell_size: 4,
            grid_width: 60,
            grid_height: 40,
            update_interval_ms: 100,
            rule: RuleSet::default(),
            export_dir: PathBuf::from("."),
            log_file: PathBuf::from("lifefield.log"),
        }
    }
}

impl Config {
    /// Parse and validate a TOML config file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let config: Config = toml::from_str(&content)?;
        config.validate()?;

        Ok(config)
    }

    /// Load `path` if given, else [`DEFAULT_CONFIG_FILE`] if it exists, else the defaults
    pub fn discover(path: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = path {
            return Self::load(path);
        }

        let fallback = Path::new(DEFAULT_CONFIG_FILE);
        if fallback.is_file() {
            return Self::load(fallback);
        }

        Ok(Self::default())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let fields = [
            ("cell_size", self.cell_size as u64),
            ("grid_width", self.grid_width as u64),
            ("grid_height", self.grid_height as u64),
            ("update_interval_ms", self.update_interval_ms),
        ];

        for (field, value) in fields {
            if value == 0 {
                return Err(ConfigError::Zero { field });
            }
        }

        // Cells are addressed with `CellOffset`s
        let max = CellOffset::MAX as usize;
        let dimensions = [
            ("grid_width", self.grid_width),
            ("grid_height", self.grid_height),
        ];

        for (field, value) in dimensions {
            if value > max {
                return Err(ConfigError::TooLarge { field, max });
            }
        }

        Ok(())
    }

    pub fn update_interval(&self) -> Duration {
        Duration::from_millis(self.update_interval_ms)
    }

    /// Size of the field in surface pixels
    pub fn canvas_size(&self) -> (usize, usize) {
        let s = self.cell_size as usize;

        (self.grid_width * s, self.grid_height * s)
    }
}
