// Application Configuration
// Defaults compiled from config.yaml at build time, optionally overridden by a
// mirror-manager.yaml file at runtime

use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

use crate::utilities::PatternMatcher;

// Include the auto-generated config from build.rs
pub mod compiled {
    include!(concat!(env!("OUT_DIR"), "/compiled_config.rs"));
}

/// Runtime override file name, looked up in the working directory
pub const OVERRIDE_FILE_NAME: &str = "mirror-manager.yaml";

/// Environment variable pointing at an explicit override file
pub const CONFIG_ENV_VAR: &str = "MIRROR_MANAGER_CONFIG";

/// Application-level configuration for mirror-manager
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// UI and display settings
    pub ui: UiSettings,

    /// Initial values of the form toggles
    pub defaults: DefaultSettings,

    /// Logging settings
    pub logging: LoggingSettings,

    /// Patterns never mirrored nor purged
    pub global_excludes: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct UiSettings {
    /// Completion polling interval
    pub tick_interval_ms: u64,

    /// Lifetime of a toast notice
    pub toast_duration_ms: u64,

    /// Value at which the progress indicator wraps back to zero
    pub progress_max: u16,

    /// Amount added to the progress indicator per tick
    pub progress_increment: u16,

    /// Enable mouse support
    pub mouse_enabled: bool,
}

#[derive(Debug, Clone)]
pub struct DefaultSettings {
    /// Purge checkbox starts checked
    pub purge: bool,

    /// Create checkbox starts checked
    pub create: bool,
}

#[derive(Debug, Clone)]
pub struct LoggingSettings {
    /// Filter directive used when MIRROR_MANAGER_LOG is unset
    pub level: String,

    /// Directory receiving the log file
    pub directory: PathBuf,
}

/// Invalid configuration values
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("tick_interval_ms must be greater than zero")]
    ZeroTickInterval,

    #[error("progress_max must be greater than zero")]
    ZeroProgressMax,

    #[error("progress_increment must be between 1 and progress_max ({max}), got {increment}")]
    ProgressIncrementOutOfRange { increment: u16, max: u16 },

    #[error("invalid global exclude pattern: {0}")]
    InvalidExclude(String),
}

impl Default for UiSettings {
    fn default() -> Self {
        Self {
            tick_interval_ms: compiled::TICK_INTERVAL_MS,
            toast_duration_ms: compiled::TOAST_DURATION_MS,
            progress_max: compiled::PROGRESS_MAX,
            progress_increment: compiled::PROGRESS_INCREMENT,
            mouse_enabled: compiled::MOUSE_ENABLED,
        }
    }
}

impl Default for DefaultSettings {
    fn default() -> Self {
        Self {
            purge: compiled::DEFAULT_PURGE,
            create: compiled::DEFAULT_CREATE,
        }
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: compiled::LOG_LEVEL.to_string(),
            directory: std::env::temp_dir().join("mirror-manager"),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            ui: UiSettings::default(),
            defaults: DefaultSettings::default(),
            logging: LoggingSettings::default(),
            global_excludes: compiled::GLOBAL_EXCLUDES
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

/// Optional overrides read from mirror-manager.yaml
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConfigOverrides {
    pub ui: UiOverrides,
    pub defaults: DefaultOverrides,
    pub logging: LoggingOverrides,
    /// Replaces the compiled exclude list when present
    pub global_excludes: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct UiOverrides {
    pub tick_interval_ms: Option<u64>,
    pub toast_duration_ms: Option<u64>,
    pub progress_max: Option<u16>,
    pub progress_increment: Option<u16>,
    pub mouse_enabled: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DefaultOverrides {
    pub purge: Option<bool>,
    pub create: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingOverrides {
    pub level: Option<String>,
    pub directory: Option<PathBuf>,
}

impl ConfigOverrides {
    /// Parse overrides from YAML text
    pub fn from_yaml(content: &str) -> Result<Self> {
        // An empty document deserializes to unit, not to an empty map
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(content).context("Failed to parse config override YAML")
    }

    /// Load overrides from a file
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config overrides: {}", path.display()))?;
        Self::from_yaml(&content)
            .with_context(|| format!("Invalid config overrides: {}", path.display()))
    }
}

impl AppConfig {
    /// Compiled defaults plus whatever override file can be found
    ///
    /// `MIRROR_MANAGER_CONFIG` must name an existing file when set. Otherwise
    /// `mirror-manager.yaml` in the working directory is used if present.
    pub fn load() -> Result<Self> {
        let mut config = Self::default();

        if let Some(path) = Self::override_path()? {
            let overrides = ConfigOverrides::load(&path)?;
            config.apply(overrides);
        }

        config.validate()?;
        Ok(config)
    }

    fn override_path() -> Result<Option<PathBuf>> {
        if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
            let path = PathBuf::from(path);
            if !path.is_file() {
                anyhow::bail!(
                    "{} points at {}, which is not a file",
                    CONFIG_ENV_VAR,
                    path.display()
                );
            }
            return Ok(Some(path));
        }

        let local = std::env::current_dir()?.join(OVERRIDE_FILE_NAME);
        Ok(local.is_file().then_some(local))
    }

    /// Layer overrides on top of the current values
    pub fn apply(&mut self, overrides: ConfigOverrides) {
        let ui = overrides.ui;
        if let Some(v) = ui.tick_interval_ms {
            self.ui.tick_interval_ms = v;
        }
        if let Some(v) = ui.toast_duration_ms {
            self.ui.toast_duration_ms = v;
        }
        if let Some(v) = ui.progress_max {
            self.ui.progress_max = v;
        }
        if let Some(v) = ui.progress_increment {
            self.ui.progress_increment = v;
        }
        if let Some(v) = ui.mouse_enabled {
            self.ui.mouse_enabled = v;
        }

        if let Some(v) = overrides.defaults.purge {
            self.defaults.purge = v;
        }
        if let Some(v) = overrides.defaults.create {
            self.defaults.create = v;
        }

        if let Some(v) = overrides.logging.level {
            self.logging.level = v;
        }
        if let Some(v) = overrides.logging.directory {
            self.logging.directory = v;
        }

        if let Some(excludes) = overrides.global_excludes {
            self.global_excludes = excludes;
        }
    }

    /// Reject values the event loop cannot work with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.ui.tick_interval_ms == 0 {
            return Err(ConfigError::ZeroTickInterval);
        }
        if self.ui.progress_max == 0 {
            return Err(ConfigError::ZeroProgressMax);
        }
        let increment = self.ui.progress_increment;
        if increment == 0 || increment > self.ui.progress_max {
            return Err(ConfigError::ProgressIncrementOutOfRange {
                increment,
                max: self.ui.progress_max,
            });
        }
        PatternMatcher::new(&self.global_excludes)
            .map_err(|e| ConfigError::InvalidExclude(e.to_string()))?;
        Ok(())
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.ui.tick_interval_ms)
    }

    pub fn toast_duration(&self) -> Duration {
        Duration::from_millis(self.ui.toast_duration_ms)
    }
}
