//! TOML configuration for metamodel bootstrap and query path resolution.
//!
//! Every key is optional; a missing table or key falls back to its default.
//!
//! ```toml
//! [bootstrap]
//! validate = true
//! max_name_len = 64
//!
//! [paths]
//! max_depth = 16
//! ```

use serde::{Deserialize, Serialize};
use std::{fs, path::Path};
use thiserror::Error as ThisError;

/// Default maximum length for managed type and attribute names.
pub const DEFAULT_MAX_NAME_LEN: usize = 64;

/// Default maximum number of segments in a dotted query path.
pub const DEFAULT_MAX_PATH_DEPTH: usize = 16;

///
/// ConfigError
///

#[derive(Debug, ThisError)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config value for '{key}': {message}")]
    Invalid { key: &'static str, message: String },
}

///
/// Config
///

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub bootstrap: BootstrapConfig,
    pub paths: PathConfig,
}

impl Config {
    /// Parse and check a configuration from TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.check()?;

        Ok(config)
    }

    /// Read and parse a configuration file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;

        Self::from_toml_str(&text)
    }

    // Reject limits that would make every bootstrap or path fail.
    fn check(&self) -> Result<(), ConfigError> {
        if self.bootstrap.max_name_len == 0 {
            return Err(ConfigError::Invalid {
                key: "bootstrap.max_name_len",
                message: "must be greater than zero".to_string(),
            });
        }
        if self.paths.max_depth == 0 {
            return Err(ConfigError::Invalid {
                key: "paths.max_depth",
                message: "must be greater than zero".to_string(),
            });
        }

        Ok(())
    }
}

///
/// BootstrapConfig
/// Controls how `MetamodelBuilder::build` checks its input.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct BootstrapConfig {
    /// Run the staged schema-wide validation pass before freezing.
    pub validate: bool,

    /// Maximum length for managed type and attribute names.
    pub max_name_len: usize,
}

impl Default for BootstrapConfig {
    fn default() -> Self {
        Self {
            validate: true,
            max_name_len: DEFAULT_MAX_NAME_LEN,
        }
    }
}

///
/// PathConfig
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct PathConfig {
    /// Maximum number of segments accepted by dotted path resolution.
    pub max_depth: usize,
}

impl Default for PathConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_PATH_DEPTH,
        }
    }
}
