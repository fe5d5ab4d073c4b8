//! Harness configuration
//!
//! Loaded from a JSON file next to the test suite. The one recognized
//! `depends` value is `"sqlite"`, selecting the embedded reference backend;
//! the handle itself is always passed explicitly into the façade, never
//! pulled from a global registry.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Example shown when `depends` names an unknown backend
pub(crate) const DEPENDS_EXAMPLE: &str = r#"{"depends": "sqlite"}"#;

fn default_depends() -> String {
    "sqlite".to_string()
}

/// Settings for the embedded SQLite backend
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SqliteConfig {
    /// Store file path; in-memory when absent
    pub path: Option<PathBuf>,
}

/// Harness configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Name of the backend that supplies the store handle
    #[serde(default = "default_depends")]
    pub depends: String,

    #[serde(default)]
    pub sqlite: SqliteConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            depends: default_depends(),
            sqlite: SqliteConfig::default(),
        }
    }
}

impl Config {
    /// Default config file path, relative to the test run's working directory
    pub fn config_path() -> PathBuf {
        PathBuf::from("dockit.json")
    }

    /// Load from the default path, or return the default config if the file
    /// does not exist
    pub fn load() -> Result<Self> {
        let path = Self::config_path();
        if !path.exists() {
            return Ok(Self::default());
        }
        Self::load_from(&path)
    }

    /// Load from an explicit path
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: Config = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Save to an explicit path
    pub fn save_to(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).context("Failed to create config directory")?;
            }
        }

        let content = serde_json::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Use a file-backed store at the given path
    pub fn with_store_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.sqlite.path = Some(path.into());
        self
    }
}
