//! Configuration for the call hierarchy panel.
//!
//! Layered configuration with three sources, later ones winning:
//! - Default values
//! - TOML configuration file (`.calltree/settings.toml` in an ancestor
//!   directory, or an explicit path)
//! - Environment variable overrides
//!
//! # Environment Variables
//!
//! Environment variables are prefixed with `CALLTREE_` and use double
//! underscores to separate nested levels:
//! - `CALLTREE_PANEL__DEBOUNCE_MS=200` sets `panel.debounce_ms`
//! - `CALLTREE_PANEL__AUTO_EXPAND=false` sets `panel.auto_expand`
//! - `CALLTREE_LOGGING__DEFAULT=debug` sets `logging.default`

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Failures while loading or validating settings.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load configuration: {reason}")]
    Load { reason: String },

    #[error("Unknown log level '{level}' (expected error, warn, info, debug, trace, or off)")]
    UnknownLogLevel { level: String },
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Settings {
    /// Version of the configuration schema
    #[serde(default = "default_version")]
    pub version: u32,

    /// Panel behavior
    #[serde(default)]
    pub panel: PanelConfig,

    /// Logging levels
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct PanelConfig {
    /// Quiet window after the last cursor movement before a refresh
    /// fires, in milliseconds
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,

    /// Window within which a second activation of the same row becomes a
    /// navigation, in milliseconds
    #[serde(default = "default_double_activation_ms")]
    pub double_activation_ms: u64,

    /// Auto-expand the first level of a freshly shown hierarchy
    #[serde(default = "default_true")]
    pub auto_expand: bool,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LoggingConfig {
    /// Default level for all components
    #[serde(default = "default_log_level")]
    pub default: String,

    /// Per-component overrides, e.g. `panel = "debug"`
    #[serde(default)]
    pub modules: HashMap<String, String>,
}

// Default value functions
fn default_version() -> u32 {
    1
}
fn default_debounce_ms() -> u64 {
    300
}
fn default_double_activation_ms() -> u64 {
    300
}
fn default_true() -> bool {
    true
}
fn default_log_level() -> String {
    "warn".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            version: default_version(),
            panel: PanelConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for PanelConfig {
    fn default() -> Self {
        Self {
            debounce_ms: default_debounce_ms(),
            double_activation_ms: default_double_activation_ms(),
            auto_expand: true,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            default: default_log_level(),
            modules: HashMap::new(),
        }
    }
}

impl PanelConfig {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn double_activation(&self) -> Duration {
        Duration::from_millis(self.double_activation_ms)
    }
}

impl Settings {
    /// Load configuration from all sources.
    ///
    /// Searches ancestor directories for `.calltree/settings.toml`; a
    /// missing file just means defaults plus environment overrides.
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::find_workspace_config()
            .unwrap_or_else(|| PathBuf::from(".calltree/settings.toml"));
        Self::load_from(config_path)
    }

    /// Load configuration from a specific file plus environment overrides.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let settings: Settings = Figment::new()
            .merge(Serialized::defaults(Settings::default()))
            .merge(Toml::file(path))
            // Double underscore separates nesting levels; single
            // underscores stay inside field names.
            .merge(Env::prefixed("CALLTREE_").map(|key| {
                key.as_str().to_lowercase().replace("__", ".").into()
            }))
            .extract()
            .map_err(|e| ConfigError::Load {
                reason: e.to_string(),
            })?;
        settings.validate()?;
        Ok(settings)
    }

    /// Find the workspace config by walking ancestors for a `.calltree`
    /// directory.
    fn find_workspace_config() -> Option<PathBuf> {
        let current = std::env::current_dir().ok()?;

        for ancestor in current.ancestors() {
            let config_dir = ancestor.join(".calltree");
            if config_dir.exists() && config_dir.is_dir() {
                return Some(config_dir.join("settings.toml"));
            }
        }

        None
    }

    fn validate(&self) -> Result<(), ConfigError> {
        for level in
            std::iter::once(&self.logging.default).chain(self.logging.modules.values())
        {
            if !is_known_level(level) {
                return Err(ConfigError::UnknownLogLevel {
                    level: level.clone(),
                });
            }
        }
        Ok(())
    }
}

fn is_known_level(level: &str) -> bool {
    matches!(
        level.to_ascii_lowercase().as_str(),
        "error" | "warn" | "info" | "debug" | "trace" | "off"
    )
}
