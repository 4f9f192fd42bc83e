//! `localiza.toml` configuration.

use std::path::{Path, PathBuf};

use localiza_analytics_models::ContainmentMode;
use localiza_schema::{AliasTable, Normalizer, RepairConfig, SchemaError};
use serde::Deserialize;

/// Config file looked up in the working directory when `--config` is not
/// given.
pub const DEFAULT_CONFIG_FILE: &str = "localiza.toml";

/// Errors loading the configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The config or alias file could not be read.
    #[error("I/O error at {path}: {source}")]
    Io {
        /// Path that caused the error.
        path: String,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The config file is not valid TOML.
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// The alias override file is invalid.
    #[error(transparent)]
    Schema(#[from] SchemaError),
}

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AppConfig {
    /// Folder holding one sub-folder per candidate.
    #[serde(default = "default_candidates_dir")]
    pub candidates_dir: PathBuf,

    /// Folder holding layers shared by every candidate.
    #[serde(default = "default_common_data_dir")]
    pub common_data_dir: PathBuf,

    /// Layer style JSON file.
    #[serde(default = "default_styles_file")]
    pub styles_file: PathBuf,

    /// Polygon selection strategy.
    #[serde(default)]
    pub containment: ContainmentMode,

    /// Coordinate repair settings.
    #[serde(default)]
    pub repair: RepairConfig,

    /// TOML file whose alias lists replace the built-in ones, per field.
    #[serde(default)]
    pub aliases_file: Option<PathBuf>,
}

fn default_candidates_dir() -> PathBuf {
    PathBuf::from("candidatos")
}

fn default_common_data_dir() -> PathBuf {
    PathBuf::from("data")
}

fn default_styles_file() -> PathBuf {
    PathBuf::from("data/layers_style.json")
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            candidates_dir: default_candidates_dir(),
            common_data_dir: default_common_data_dir(),
            styles_file: default_styles_file(),
            containment: ContainmentMode::default(),
            repair: RepairConfig::default(),
            aliases_file: None,
        }
    }
}

impl AppConfig {
    /// Parses a config from TOML.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Toml`] if the TOML is malformed.
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(toml_str)?)
    }

    /// Loads the config.
    ///
    /// An explicit `path` must exist. Without one, [`DEFAULT_CONFIG_FILE`]
    /// is used when present and the defaults otherwise.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let path = match path {
            Some(path) => path,
            None => {
                let fallback = Path::new(DEFAULT_CONFIG_FILE);
                if !fallback.is_file() {
                    log::debug!("No {DEFAULT_CONFIG_FILE}; using defaults");
                    return Ok(Self::default());
                }
                fallback
            }
        };

        let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.display().to_string(),
            source: e,
        })?;
        let config = Self::from_toml(&contents)?;
        log::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Builds the normalizer for this config.
    ///
    /// # Errors
    ///
    /// Returns an error if the alias override file cannot be read or
    /// parsed.
    pub fn normalizer(&self) -> Result<Normalizer, ConfigError> {
        let mut aliases = AliasTable::builtin().clone();
        if let Some(path) = &self.aliases_file {
            let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
                path: path.display().to_string(),
                source: e,
            })?;
            aliases = aliases.with_overrides(AliasTable::from_toml(&contents)?);
        }
        Ok(Normalizer::new(aliases, self.repair))
    }
}
