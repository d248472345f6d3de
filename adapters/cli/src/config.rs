//! Layered configuration: command-line flags over an optional TOML file over defaults.

use dungeon_crawl_rendering::DEFAULT_TILE_SIZE;
use dungeon_crawl_system_session::SessionConfig;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Failures while loading the configuration file.
#[derive(Debug, Error)]
pub(crate) enum ConfigError {
    /// The file could not be read.
    #[error("failed to read config file {path}")]
    Read {
        /// File that was requested.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },
    /// The file is not valid TOML or carries unknown keys.
    #[error("failed to parse config file {path}")]
    Parse {
        /// File that was requested.
        path: PathBuf,
        /// Underlying parser failure.
        #[source]
        source: toml::de::Error,
    },
}

/// Values that may be supplied by the configuration file or the command line.
///
/// Every field is optional; missing values fall through to the next layer.
#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub(crate) struct Overrides {
    pub(crate) columns: Option<u32>,
    pub(crate) rows: Option<u32>,
    pub(crate) enemies: Option<u32>,
    pub(crate) carve_fraction: Option<f64>,
    pub(crate) seed: Option<u64>,
    pub(crate) tile_size: Option<f32>,
}

impl Overrides {
    /// Fills every field left empty in `self` from `lower`.
    #[must_use]
    pub(crate) fn or(self, lower: Self) -> Self {
        Self {
            columns: self.columns.or(lower.columns),
            rows: self.rows.or(lower.rows),
            enemies: self.enemies.or(lower.enemies),
            carve_fraction: self.carve_fraction.or(lower.carve_fraction),
            seed: self.seed.or(lower.seed),
            tile_size: self.tile_size.or(lower.tile_size),
        }
    }
}

/// Fully resolved settings for one run of the binary.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct Settings {
    pub(crate) session: SessionConfig,
    pub(crate) tile_size: f32,
}

impl Settings {
    /// Applies the overrides on top of the built-in defaults.
    #[must_use]
    pub(crate) fn resolve(overrides: Overrides) -> Self {
        let defaults = SessionConfig::default();
        Self {
            session: SessionConfig {
                columns: overrides.columns.unwrap_or(defaults.columns),
                rows: overrides.rows.unwrap_or(defaults.rows),
                enemy_count: overrides.enemies.unwrap_or(defaults.enemy_count),
                carve_fraction: overrides.carve_fraction.unwrap_or(defaults.carve_fraction),
                seed: overrides.seed.or(defaults.seed),
                ..defaults
            },
            tile_size: overrides.tile_size.unwrap_or(DEFAULT_TILE_SIZE),
        }
    }
}

/// Parses configuration file contents.
pub(crate) fn parse(contents: &str, path: &Path) -> Result<Overrides, ConfigError> {
    toml::from_str(contents).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Reads and parses the configuration file at `path`.
pub(crate) fn load(path: &Path) -> Result<Overrides, ConfigError> {
    let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    parse(&contents, path)
}
