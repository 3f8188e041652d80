//! Platform-specific configuration paths.

use crate::constants::APP_NAME;
use crate::error::{Error, Result};
use directories::ProjectDirs;
use std::path::PathBuf;

/// Environment variable that points at an explicit config file.
pub const CONFIG_ENV_VAR: &str = "CAMTRAP_CONFIG";

/// Get the configuration directory for the current platform.
///
/// - Linux: `~/.config/camtrap/`
/// - macOS: `~/Library/Application Support/camtrap/`
/// - Windows: `%APPDATA%\camtrap\`
pub fn config_dir() -> Result<PathBuf> {
    ProjectDirs::from("", "", APP_NAME)
        .map(|dirs| dirs.config_dir().to_path_buf())
        .ok_or(Error::ConfigDirNotFound)
}

/// Get the full path to the config file.
///
/// `CAMTRAP_CONFIG` takes precedence over the platform directory when set
/// to a non-empty value.
pub fn config_file_path() -> Result<PathBuf> {
    if let Some(explicit) = std::env::var_os(CONFIG_ENV_VAR).filter(|v| !v.is_empty()) {
        return Ok(PathBuf::from(explicit));
    }
    Ok(config_dir()?.join("config.toml"))
}
