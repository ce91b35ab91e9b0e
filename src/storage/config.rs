//! Configuration handling for majic
//!
//! Settings live in a property-style TOML file at `~/.majic/clirc`. The file
//! is generated with default values on first run. Path values are templates
//! expanded against the environment (`${HOME}/.majic/output`).

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use directories::BaseDirs;
use thiserror::Error;
use toml::{Table, Value};

use crate::cli::Output;

/// Directory under the user's home holding the configuration file
pub const APP_CONFIG_HOME: &str = ".majic";

/// Configuration file name
pub const APP_CONFIG_FILE: &str = "clirc";

pub const KEY_PLUGINS_DIR: &str = "plugins_dir";
pub const KEY_INPUT_DIR: &str = "input_dir";
pub const KEY_OUTPUT_DIR: &str = "output_dir";
pub const KEY_DETAILED: &str = "detailed";
pub const KEY_VERBOSE: &str = "verbose";

pub const DEFAULT_PLUGINS_DIR: &str = "${HOME}/.majic/plugins";
pub const DEFAULT_INPUT_DIR: &str = "${HOME}/.majic/input";
pub const DEFAULT_OUTPUT_DIR: &str = "${HOME}/.majic/output";

const CONFIG_HEADER: &str = "# majic CLI configuration\n\
# Path values may reference environment variables, e.g. ${HOME}\n\n";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Could not determine the user's home directory")]
    NoHomeDir,

    #[error("Failed to create configuration directory {path}: {source}")]
    CreateDir { path: PathBuf, source: io::Error },

    #[error("Failed to read configuration {path}: {source}")]
    Read { path: PathBuf, source: io::Error },

    #[error("Failed to write configuration {path}: {source}")]
    Write { path: PathBuf, source: io::Error },

    #[error("Failed to parse configuration {path}: {message}")]
    Parse { path: PathBuf, message: String },
}

/// Key/value settings loaded from the configuration file
#[derive(Debug, Clone)]
pub struct Config {
    path: PathBuf,
    settings: Table,
}

impl Config {
    /// Loads the configuration from `~/.majic/clirc`, generating it if absent
    pub fn load(output: &Output) -> Result<Self, ConfigError> {
        let path = Self::default_path()?;
        Self::load_from(path, output)
    }

    /// Returns the location of the configuration file
    pub fn default_path() -> Result<PathBuf, ConfigError> {
        let dirs = BaseDirs::new().ok_or(ConfigError::NoHomeDir)?;
        Ok(dirs.home_dir().join(APP_CONFIG_HOME).join(APP_CONFIG_FILE))
    }

    /// Loads the configuration from a specific file, generating it if absent
    pub fn load_from(path: impl Into<PathBuf>, output: &Output) -> Result<Self, ConfigError> {
        let path = path.into();
        output.detailed(&format!("Configuration file: {}", path.display()));

        if !path.exists() {
            output.detailed("Generating default properties...");
            Self::write_defaults(&path)?;
        }

        let content = fs::read_to_string(&path).map_err(|source| ConfigError::Read {
            path: path.clone(),
            source,
        })?;

        let settings: Table = toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.clone(),
            message: e.to_string(),
        })?;

        Ok(Self { path, settings })
    }

    /// Default settings written on first run
    pub fn defaults() -> Table {
        let mut table = Table::new();
        table.insert(KEY_OUTPUT_DIR.into(), Value::from(DEFAULT_OUTPUT_DIR));
        table.insert(KEY_INPUT_DIR.into(), Value::from(DEFAULT_INPUT_DIR));
        table.insert(KEY_PLUGINS_DIR.into(), Value::from(DEFAULT_PLUGINS_DIR));
        table.insert(KEY_DETAILED.into(), Value::from(false));
        table.insert(KEY_VERBOSE.into(), Value::from(false));
        table
    }

    fn write_defaults(path: &Path) -> Result<(), ConfigError> {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir).map_err(|source| ConfigError::CreateDir {
                path: dir.to_path_buf(),
                source,
            })?;
        }

        let body = toml::to_string(&Self::defaults()).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

        fs::write(path, format!("{}{}", CONFIG_HEADER, body)).map_err(|source| {
            ConfigError::Write {
                path: path.to_path_buf(),
                source,
            }
        })
    }

    /// Returns the path of the loaded configuration file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the raw value for a key, if present
    pub fn get(&self, key: &str) -> Option<String> {
        self.settings.get(key).map(|value| match value {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        })
    }

    /// Returns the expanded value for a key, falling back to `default`
    ///
    /// A missing key is reported at normal level.
    pub fn get_or(&self, key: &str, default: &str, output: &Output) -> String {
        let raw = match self.get(key) {
            Some(value) => value,
            None => {
                output.normal(&format!(
                    "Could not retrieve configuration value for key: {}",
                    key
                ));
                default.to_string()
            }
        };

        match shellexpand::full(&raw) {
            Ok(expanded) => expanded.into_owned(),
            Err(e) => {
                output.detailed(&format!("Could not expand {}: {}", raw, e));
                raw
            }
        }
    }

    /// Reads a boolean setting; anything unparsable is false
    pub fn get_bool(&self, key: &str) -> bool {
        match self.settings.get(key) {
            Some(Value::Boolean(b)) => *b,
            Some(Value::String(s)) => s.trim().parse().unwrap_or(false),
            _ => false,
        }
    }
}
