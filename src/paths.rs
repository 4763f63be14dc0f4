//! Path resolution for yadu's own configuration
//!
//! # Environment Variables
//!
//! - `YADU_CONFIG_DIR` - Override config directory (e.g., `~/dotfiles/yadu`)
//!
//! # Path Resolution Priority
//!
//! For config_dir():
//! 1. `YADU_CONFIG_DIR` environment variable
//! 2. `XDG_CONFIG_HOME/yadu` (if set)
//! 3. Platform config directory + `yadu`
//!    - Linux: `~/.config/yadu`
//!    - macOS: `~/Library/Application Support/yadu`
//!    - Windows: `%APPDATA%\yadu`

use anyhow::{Context, Result};
use std::path::PathBuf;

/// Environment variable for config directory override
pub const ENV_CONFIG_DIR: &str = "YADU_CONFIG_DIR";

/// Name of the config file inside the config directory
pub const CONFIG_FILE: &str = "config.toml";

const APP_DIR: &str = "yadu";

/// Get the yadu config directory path
pub fn config_dir() -> Result<PathBuf> {
    resolve_config_dir(
        std::env::var(ENV_CONFIG_DIR).ok().as_deref(),
        std::env::var("XDG_CONFIG_HOME").ok().as_deref(),
    )
}

/// Get the path of the config file
pub fn config_file() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE))
}

/// Resolve the config directory from explicit override values.
fn resolve_config_dir(override_dir: Option<&str>, xdg_config: Option<&str>) -> Result<PathBuf> {
    if let Some(dir) = override_dir.filter(|d| !d.is_empty()) {
        let path = expand(dir);
        log::debug!(
            "Using config dir from {}: {}",
            ENV_CONFIG_DIR,
            path.display()
        );
        return Ok(path);
    }

    if let Some(xdg) = xdg_config.filter(|d| !d.is_empty()) {
        let path = PathBuf::from(xdg).join(APP_DIR);
        log::debug!("Using XDG_CONFIG_HOME: {}", path.display());
        return Ok(path);
    }

    let base = dirs::config_dir().context("Could not determine config directory")?;
    let path = base.join(APP_DIR);
    log::debug!("Using default config dir: {}", path.display());
    Ok(path)
}

/// Expand ~ and environment variables in a path string.
///
/// Unknown variables leave the input unchanged.
pub fn expand(path: &str) -> PathBuf {
    let expanded = shellexpand::full(path).unwrap_or(std::borrow::Cow::Borrowed(path));
    PathBuf::from(expanded.as_ref())
}
