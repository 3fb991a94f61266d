//! Engine configuration, path resolution and YAML persistence.

use crate::defaults;
use crate::error::ConfigError;
use crate::types::{LastTabPolicy, LogLevel};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Top-level configuration for a tab engine instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Config {
    /// Tab lifecycle options
    #[serde(default)]
    pub tabs: TabsConfig,

    /// Session persistence options
    #[serde(default)]
    pub session: SessionConfig,

    /// Verbosity of the logging bridge
    #[serde(default)]
    pub log_level: LogLevel,
}

/// Options that shape open/close behavior.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TabsConfig {
    /// Behavior when closing the sole remaining tab
    #[serde(default)]
    pub last_tab_policy: LastTabPolicy,

    /// How many closed tabs can be reopened with undo-close (0 disables it)
    #[serde(default = "defaults::recently_closed_limit")]
    pub recently_closed_limit: usize,
}

impl Default for TabsConfig {
    fn default() -> Self {
        Self {
            last_tab_policy: LastTabPolicy::default(),
            recently_closed_limit: defaults::recently_closed_limit(),
        }
    }
}

/// Options for saving and restoring the open-tab set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Restore the previous session when the host starts
    #[serde(default = "defaults::restore_on_startup")]
    pub restore_on_startup: bool,

    /// Override for the session file location
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<PathBuf>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            restore_on_startup: defaults::restore_on_startup(),
            file: None,
        }
    }
}

impl Config {
    /// Load configuration from the default location, falling back to defaults
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path();
        log::info!("Config path: {:?}", config_path);
        Self::load_from(&config_path)
    }

    /// Load configuration from a specific file
    ///
    /// A missing or empty file yields the defaults. A file that exists but
    /// cannot be parsed or fails validation is an error.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            log::info!("Config file {:?} not found, using defaults", path);
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .map_err(ConfigError::from)
            .with_context(|| format!("Failed to read config from {:?}", path))?;

        if contents.trim().is_empty() {
            return Ok(Self::default());
        }

        let config: Config = serde_yaml_ng::from_str(&contents)
            .map_err(ConfigError::from)
            .with_context(|| format!("Failed to parse config from {:?}", path))?;
        config.validate()?;

        log::info!("Loaded config from {:?}", path);
        Ok(config)
    }

    /// Save configuration to the default location
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path())
    }

    /// Save configuration to a specific file
    pub fn save_to(&self, path: &Path) -> Result<()> {
        self.validate()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory {:?}", parent))?;
        }

        let yaml = serde_yaml_ng::to_string(self).context("Failed to serialize config")?;

        // Atomic save: write to temp file then rename to prevent corruption on crash
        let temp_path = path.with_extension("yaml.tmp");
        fs::write(&temp_path, &yaml)
            .with_context(|| format!("Failed to write config to {:?}", temp_path))?;
        fs::rename(&temp_path, path)
            .with_context(|| format!("Failed to move config into place at {:?}", path))?;

        Ok(())
    }

    /// Check field values that serde cannot check on its own
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(file) = &self.session.file
            && file.as_os_str().is_empty()
        {
            return Err(ConfigError::Validation(
                "session.file must not be empty when set".to_string(),
            ));
        }
        Ok(())
    }

    /// Get the configuration directory path (`~/.config/tabdeck`)
    pub fn config_dir() -> PathBuf {
        #[cfg(target_os = "windows")]
        {
            if let Some(config_dir) = dirs::config_dir() {
                config_dir.join("tabdeck")
            } else {
                PathBuf::from(".")
            }
        }
        #[cfg(not(target_os = "windows"))]
        {
            if let Some(home_dir) = dirs::home_dir() {
                home_dir.join(".config").join("tabdeck")
            } else {
                PathBuf::from(".")
            }
        }
    }

    /// Get the configuration file path
    pub fn config_path() -> PathBuf {
        Self::config_dir().join("config.yaml")
    }

    /// Get the effective session file path
    pub fn session_path(&self) -> PathBuf {
        self.session
            .file
            .clone()
            .unwrap_or_else(|| Self::config_dir().join(defaults::session_file_name()))
    }
}
