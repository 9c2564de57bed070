//! JSON application configuration.
//!
//! # Responsibility
//! - Load `config.json` (PascalCase keys) shared with the desktop shell.
//! - Resolve the store location and the display user name with fallbacks.
//!
//! # Invariants
//! - Unknown top-level keys are kept and readable through `setting`.
//! - A blank configured user name counts as unset.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

/// Default config file name, resolved against the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "config.json";

const GUEST_USER_NAME: &str = "Guest";

#[derive(Debug)]
pub enum ConfigError {
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    Parse(serde_json::Error),
    /// A required top-level section is absent.
    MissingSection(&'static str),
    /// A required value is absent or blank.
    MissingValue(&'static str),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "failed to read config `{}`: {source}", path.display())
            }
            Self::Parse(err) => write!(f, "invalid config json: {err}"),
            Self::MissingSection(section) => {
                write!(f, "{section} configuration not found in config file")
            }
            Self::MissingValue(key) => write!(f, "config value `{key}` is required"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Parse(err) => Some(err),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(value: serde_json::Error) -> Self {
        Self::Parse(value)
    }
}

/// Document store connection settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct StoreConfig {
    /// SQLite file holding the document collections.
    #[serde(default)]
    pub database_path: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct DiaryConfig {
    #[serde(default)]
    pub store: Option<StoreConfig>,
    #[serde(default)]
    pub user_name: Option<String>,
    /// One of `trace|debug|info|warn|error`.
    #[serde(default)]
    pub log_level: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl DiaryConfig {
    /// Reads and parses a config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&text)
    }

    /// Parses config JSON text.
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Loads the file when it exists, otherwise returns defaults.
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Returns the configured database path.
    ///
    /// # Errors
    /// - `MissingSection("Store")` when the section is absent.
    /// - `MissingValue("Store.DatabasePath")` when the path is absent or blank.
    pub fn database_path(&self) -> Result<&Path, ConfigError> {
        let store = self
            .store
            .as_ref()
            .ok_or(ConfigError::MissingSection("Store"))?;
        match store.database_path.as_deref() {
            Some(path) if !path.as_os_str().is_empty() => Ok(path),
            _ => Err(ConfigError::MissingValue("Store.DatabasePath")),
        }
    }

    /// Configured user name, else `USER`, else `USERNAME`, else `"Guest"`.
    pub fn user_name(&self) -> String {
        self.user_name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(str::to_string)
            .or_else(|| env_non_empty("USER"))
            .or_else(|| env_non_empty("USERNAME"))
            .unwrap_or_else(|| GUEST_USER_NAME.to_string())
    }

    /// Reads an arbitrary extra top-level setting as `T`.
    ///
    /// Returns `None` when the key is absent or does not deserialize as `T`.
    pub fn setting<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.extra
            .get(key)
            .and_then(|value| serde_json::from_value(value.clone()).ok())
    }
}

fn env_non_empty(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .filter(|value| !value.trim().is_empty())
}
