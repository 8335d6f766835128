//! Store location and configuration for deep-mind
//!
//! Handles the ~/.claude/deep-mind/ directory layout and config.toml

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// Main configuration structure (`config.toml` at the store root)
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Matrix assumed by `status` when no argument is given and the
    /// current directory carries no marker file
    #[serde(default)]
    pub default_matrix: Option<String>,
}

/// Returns the path to the store root (~/.claude/deep-mind)
pub fn store_home() -> Result<PathBuf> {
    let home = dirs::home_dir().context("Could not determine home directory")?;
    Ok(home.join(".claude").join("deep-mind"))
}

/// Path helpers for everything under the store root.
///
/// The root is explicit so tests can point the store at a temporary
/// directory instead of the user's home.
#[derive(Debug, Clone)]
pub struct StorePaths {
    pub root: PathBuf,
}

impl StorePaths {
    pub fn new() -> Result<Self> {
        Ok(Self { root: store_home()? })
    }

    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn config_file(&self) -> PathBuf {
        self.root.join("config.toml")
    }

    pub fn matrix_dir(&self, matrix: &str) -> PathBuf {
        self.root.join(matrix)
    }

    pub fn manifest_file(&self, matrix: &str) -> PathBuf {
        self.matrix_dir(matrix).join("manifest.json")
    }

    pub fn changelog_file(&self, matrix: &str) -> PathBuf {
        self.matrix_dir(matrix).join("changelog.md")
    }

    pub fn vertical_file(&self, matrix: &str, vertical: &str) -> PathBuf {
        self.matrix_dir(matrix).join(format!("{vertical}.md"))
    }
}

/// Load configuration from disk, falling back to defaults when absent
pub fn load_config(paths: &StorePaths) -> Result<Config> {
    let config_file = paths.config_file();
    if !config_file.exists() {
        return Ok(Config::default());
    }
    let content = fs::read_to_string(&config_file).context("Failed to read config.toml")?;
    toml::from_str(&content).context("Failed to parse config.toml")
}

/// Save configuration to disk
pub fn save_config(paths: &StorePaths, config: &Config) -> Result<()> {
    fs::create_dir_all(&paths.root).context("Failed to create store root")?;
    let content = toml::to_string_pretty(config).context("Failed to serialize config")?;
    fs::write(paths.config_file(), content).context("Failed to write config.toml")?;
    Ok(())
}
