use anyhow::{Context, Result};
use std::path::PathBuf;

/// Centralized path management for shortcast.
/// Single source of truth for where configuration and outputs live.

/// Get the shortcast config directory
pub fn shortcast_config_dir() -> Result<PathBuf> {
    let config_dir = dirs::config_dir()
        .context("Unable to determine user config directory")?
        .join("shortcast");

    std::fs::create_dir_all(&config_dir)
        .with_context(|| format!("creating config directory at {}", config_dir.display()))?;

    Ok(config_dir)
}

/// Path of the persisted schedule configuration
pub fn schedule_config_path() -> Result<PathBuf> {
    Ok(shortcast_config_dir()?.join("schedule.toml"))
}
