// Chunk: docs/chunks/async_highlight - Generation-tagged asynchronous token requests
//!
//! Highlighting configuration.
//!
//! The configuration is a JSON file; every field is optional and falls back
//! to its default. The default location is
//! `<platform config dir>/neon-json/config.json`.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Application name used for the config directory.
const APP_NAME: &str = "neon-json";

/// Config file name.
const CONFIG_FILENAME: &str = "config.json";

/// Errors from reading a configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid configuration in {}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Tunables for a highlight session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HighlightConfig {
    /// Query worker threads.
    pub worker_threads: usize,
    /// Grow dirty ranges to whole lines before querying.
    pub expand_to_lines: bool,
    /// Lines shown by the headless canvas.
    pub visible_lines: usize,
    /// Theme name.
    pub theme: String,
}

impl Default for HighlightConfig {
    fn default() -> Self {
        Self {
            worker_threads: 2,
            expand_to_lines: true,
            visible_lines: 40,
            theme: "catppuccin-mocha".to_string(),
        }
    }
}

impl HighlightConfig {
    /// Reads a configuration file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let json = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&json).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Reads a configuration file, or returns the defaults if it does not
    /// exist. Other errors are still reported.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        match Self::load(path) {
            Err(ConfigError::Io { source, .. }) if source.kind() == io::ErrorKind::NotFound => {
                Ok(Self::default())
            }
            other => other,
        }
    }

    /// Returns the default configuration file path, or `None` if the
    /// platform has no config directory.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(APP_NAME).join(CONFIG_FILENAME))
    }
}
