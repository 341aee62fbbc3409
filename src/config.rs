//! TOML settings for the command line tools.
//!
//! Settings live in `kagglekit.toml` inside the app directory. A missing file
//! yields the built-in defaults; missing keys fall back per field.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::app_dirs::{self, AppDirError};
use crate::ml::submission::SubmissionDefaults;

/// File name of the settings file inside the app directory.
pub const CONFIG_FILE_NAME: &str = "kagglekit.toml";

/// Errors raised while loading settings.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The app directory could not be resolved.
    #[error(transparent)]
    AppDir(#[from] AppDirError),
    /// Failed to read the settings file.
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    /// The settings file is not valid TOML for [`Settings`].
    #[error("Invalid config file {path}: {source}")]
    ParseToml {
        path: PathBuf,
        source: toml::de::Error,
    },
}

/// Top-level settings document.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct Settings {
    #[serde(default)]
    pub submission: SubmissionSettings,
}

/// `[submission]` section: where datasets and submissions live.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct SubmissionSettings {
    pub data_dir: PathBuf,
    pub test_file: String,
    pub id_column: String,
    pub target_column: String,
    pub file_prefix: String,
}

impl Default for SubmissionSettings {
    fn default() -> Self {
        SubmissionDefaults::default().into()
    }
}

impl From<SubmissionDefaults> for SubmissionSettings {
    fn from(defaults: SubmissionDefaults) -> Self {
        Self {
            data_dir: defaults.data_dir,
            test_file: defaults.test_file,
            id_column: defaults.id_column,
            target_column: defaults.target_column,
            file_prefix: defaults.file_prefix,
        }
    }
}

impl From<SubmissionSettings> for SubmissionDefaults {
    fn from(settings: SubmissionSettings) -> Self {
        Self {
            data_dir: settings.data_dir,
            test_file: settings.test_file,
            id_column: settings.id_column,
            target_column: settings.target_column,
            file_prefix: settings.file_prefix,
        }
    }
}

impl Settings {
    /// Resolve the settings path inside the app directory.
    pub fn path() -> Result<PathBuf, ConfigError> {
        Ok(app_dirs::app_root_dir()?.join(CONFIG_FILE_NAME))
    }

    /// Load settings from the app directory, returning defaults if the file is missing.
    pub fn load_or_default() -> Result<Self, ConfigError> {
        Self::load_from(&Self::path()?)
    }

    /// Load settings from an explicit path, returning defaults if it does not exist.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::debug!("No config at {}; using defaults", path.display());
            return Ok(Self::default());
        }
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&text).map_err(|source| ConfigError::ParseToml {
            path: path.to_path_buf(),
            source,
        })
    }
}
