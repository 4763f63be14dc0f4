use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::paths;

// ============================================================================
// Yadu Config
// ============================================================================

/// Persisted settings: the active context directory and environment
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct YaduConfig {
    /// Context directory holding `units/` and `environments.yaml`
    #[serde(default)]
    pub context: String,

    /// Environment applied when none is named on the command line
    #[serde(default)]
    pub environment: String,
}

impl YaduConfig {
    /// Load config.toml, or defaults if it doesn't exist
    pub fn load() -> Result<Self> {
        Self::load_from(&paths::config_file()?)
    }

    /// Save config.toml
    pub fn save(&self) -> Result<()> {
        self.save_to(&paths::config_file()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            log::debug!("Config file {} does not exist, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        log::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create config directory: {}", dir.display()))?;
        }

        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        log::debug!("Saved config to {}", path.display());
        Ok(())
    }

    pub fn set_context(&mut self, context: &str) {
        self.context = context.to_string();
    }

    pub fn set_environment(&mut self, environment: &str) {
        self.environment = environment.to_string();
    }

    /// Expanded context directory, or an error if none is configured
    pub fn context_dir(&self) -> Result<PathBuf> {
        if self.context.trim().is_empty() {
            bail!("No context directory configured. Set one with 'yadu context <directory>'");
        }
        Ok(paths::expand(&self.context))
    }

    /// Active environment name, if one was selected
    pub fn active_environment(&self) -> Option<&str> {
        let env = self.environment.trim();
        (!env.is_empty()).then_some(env)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_load_missing_returns_default() {
        let tmp = TempDir::new().unwrap();
        let config = YaduConfig::load_from(&tmp.path().join("config.toml")).unwrap();
        assert_eq!(config, YaduConfig::default());
        assert!(config.active_environment().is_none());
    }

    #[test]
    fn test_save_and_load() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("nested").join("config.toml");

        let mut config = YaduConfig::default();
        config.set_context("/home/me/dotfiles");
        config.set_environment("laptop");
        config.save_to(&path).unwrap();

        let loaded = YaduConfig::load_from(&path).unwrap();
        assert_eq!(loaded.context, "/home/me/dotfiles");
        assert_eq!(loaded.active_environment(), Some("laptop"));
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config.toml");
        fs::write(&path, "context = \"/srv/dots\"\n").unwrap();

        let config = YaduConfig::load_from(&path).unwrap();
        assert_eq!(config.context, "/srv/dots");
        assert!(config.environment.is_empty());
    }

    #[test]
    fn test_invalid_file_errors() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config.toml");
        fs::write(&path, "context = [").unwrap();

        let err = YaduConfig::load_from(&path).unwrap_err();
        assert!(err.to_string().contains("Failed to parse"));
    }

    #[test]
    fn test_context_dir_requires_value() {
        let config = YaduConfig::default();
        assert!(config.context_dir().is_err());
    }

    #[test]
    fn test_context_dir_expands_tilde() {
        let mut config = YaduConfig::default();
        config.set_context("~/dotfiles");
        let home = dirs::home_dir().unwrap();
        assert_eq!(config.context_dir().unwrap(), home.join("dotfiles"));
    }
}
