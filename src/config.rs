//! src/config.rs

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;

use crate::backup::{ArchiveFormat, MaintenanceMode, DEFAULT_MESSAGE_TEMPLATE};

/// Returns the configuration directory path (~/.config/autoback).
pub fn get_config_dir() -> Result<PathBuf> {
    let config_dir = if cfg!(windows) {
        // Windows: %APPDATA%\autoback
        dirs::data_dir()
            .map(|p| p.join("autoback"))
            .context("Could not get data directory")?
    } else {
        // Linux/macOS: ~/.config/autoback
        dirs::config_dir()
            .map(|p| p.join("autoback"))
            .context("Could not get config directory")?
    };
    Ok(config_dir)
}

pub fn default_config_path() -> Result<PathBuf> {
    Ok(get_config_dir()?.join("config.toml"))
}

/// Represents the main configuration for the application.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Commit settings.
    pub commit: CommitConfig,
    /// Repository maintenance settings.
    pub maintenance: MaintenanceConfig,
    /// Archive export settings.
    pub archive: ArchiveConfig,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct CommitConfig {
    /// Message used when none is supplied. `{datetime}`, `{date}` and `{time}`
    /// are filled in.
    pub message_template: String,
}

impl Default for CommitConfig {
    fn default() -> Self {
        Self {
            message_template: DEFAULT_MESSAGE_TEMPLATE.to_string(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
#[serde(default)]
pub struct MaintenanceConfig {
    /// Mode used when no cleanup flag is given on the command line.
    pub mode: MaintenanceMode,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
#[serde(default)]
pub struct ArchiveConfig {
    /// Format used when `--archive-format` is absent. Unset means guess from
    /// the file extension.
    pub format: Option<ArchiveFormat>,
}

/// Writes the default configuration to `path`, creating parent directories.
pub async fn create_default_config(path: &Path) -> Result<()> {
    if let Some(dir) = path.parent() {
        if !dir.exists() {
            fs::create_dir_all(dir)
                .await
                .context("Could not create config directory")?;
        }
    }

    let config_content = toml::to_string(&Config::default())?;
    let mut file = fs::File::create(path)
        .await
        .with_context(|| format!("Could not create config file {}", path.display()))?;
    file.write_all(config_content.as_bytes()).await?;

    Ok(())
}

/// Loads the configuration from `path`, or the default location when None.
/// A missing file yields the defaults.
pub async fn load_config(path: Option<&Path>) -> Result<Config> {
    let config_path = match path {
        Some(p) => p.to_path_buf(),
        None => default_config_path()?,
    };

    if !config_path.exists() {
        return Ok(Config::default());
    }

    let config_content = fs::read_to_string(&config_path)
        .await
        .context("Could not read config file")?;
    let config: Config =
        toml::from_str(&config_content).context("Could not parse config file")?;

    Ok(config)
}
