//! Cross-Platform Path Utilities
//!
//! Resolves the application directory (~/.archetype-studio/).

use std::path::{Path, PathBuf};

use crate::utils::error::{AppError, AppResult};

/// Get the user's home directory
pub fn home_dir() -> AppResult<PathBuf> {
    dirs::home_dir().ok_or_else(|| AppError::config("Could not determine home directory"))
}

/// Get the application directory (~/.archetype-studio/)
pub fn app_dir() -> AppResult<PathBuf> {
    Ok(home_dir()?.join(".archetype-studio"))
}

/// Get the config file path (~/.archetype-studio/config.json)
pub fn config_path() -> AppResult<PathBuf> {
    Ok(app_dir()?.join("config.json"))
}

/// Ensure a directory exists, creating it if necessary
pub fn ensure_dir(path: &Path) -> AppResult<()> {
    if !path.exists() {
        std::fs::create_dir_all(path)?;
    }
    Ok(())
}
