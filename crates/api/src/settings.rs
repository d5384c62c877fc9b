//! Server Settings
//!
//! Layered from an optional file and `CLINIC__` environment variables,
//! e.g. `CLINIC__SERVER__ADDR=127.0.0.1:9000`.

use config::{Config, ConfigError, Environment, File, FileFormat};
use inference_engine::{ModelConfig, ModelProfile};
use serde::Deserialize;
use tracing::warn;

/// Environment variable naming the configuration file
pub const CONFIG_PATH_VAR: &str = "CLINIC_CONFIG";

const DEFAULT_CONFIG_PATH: &str = "config/default";

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "default_addr")]
    pub addr: String,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            addr: default_addr(),
        }
    }
}

fn default_addr() -> String {
    "0.0.0.0:8080".to_string()
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LoggingSettings {
    /// Maximum level: trace, debug, info, warn or error
    #[serde(default = "default_level")]
    pub level: String,
    /// Emit JSON lines instead of human-readable output
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_level(),
            json: false,
        }
    }
}

fn default_level() -> String {
    "info".to_string()
}

/// Top-level settings
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
    #[serde(default)]
    pub models: Vec<ModelConfig>,
}

impl Settings {
    /// Load from `$CLINIC_CONFIG` (or `config/default.*` when unset) and
    /// the environment. A missing file is not an error.
    pub fn load() -> Result<Self, ConfigError> {
        let path = std::env::var(CONFIG_PATH_VAR).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        Config::builder()
            .add_source(File::with_name(&path).required(false))
            .add_source(Environment::with_prefix("CLINIC").separator("__"))
            .build()?
            .try_deserialize()
    }

    /// Parse settings from TOML text
    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(File::from_str(text, FileFormat::Toml))
            .build()?
            .try_deserialize()
    }

    /// Models to serve; every built-in profile in mock mode when none are
    /// configured
    pub fn model_configs(&self) -> Vec<ModelConfig> {
        if !self.models.is_empty() {
            return self.models.clone();
        }
        warn!("No models configured, serving built-in profiles with mock classifiers");
        ModelProfile::builtin_names()
            .iter()
            .map(|name| ModelConfig::mock(name))
            .collect()
    }
}
