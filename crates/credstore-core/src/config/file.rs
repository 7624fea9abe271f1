//! YAML configuration file
//!
//! Default location: `~/.config/credstore/config.yaml` (platform config dir).
//!
//! ```yaml
//! backing:
//!   kind: file
//!   path: /var/lib/myapp/credentials
//! format: legacy
//! logging:
//!   sink: console
//!   level: warn
//! ```

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::backing::StoreError;
use crate::codec::WireFormat;
use crate::logging::{ConsoleLogger, FileLogger, LogLevel, NoOpLogger, SharedLogger};

pub const ENV_BACKING: &str = "CREDSTORE_BACKING";
pub const ENV_FORMAT: &str = "CREDSTORE_FORMAT";
pub const ENV_LOG_LEVEL: &str = "CREDSTORE_LOG_LEVEL";

/// Errors that can occur while loading configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Unknown backing store: {0}")]
    UnknownBacking(String),

    #[error("Failed to open backing store: {0}")]
    Store(#[from] StoreError),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Which backing store to use and how to open it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackingConfig {
    /// Registered backing name: `memory`, `shared`, `file`, `keychain`, ...
    #[serde(default = "default_backing_kind")]
    pub kind: String,

    /// Directory for the `file` backing
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,

    /// Service name for the `keychain` backing
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service: Option<String>,
}

fn default_backing_kind() -> String {
    "memory".to_string()
}

impl Default for BackingConfig {
    fn default() -> Self {
        Self::kind(default_backing_kind())
    }
}

impl BackingConfig {
    pub fn kind(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            path: None,
            service: None,
        }
    }

    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn with_service(mut self, service: impl Into<String>) -> Self {
        self.service = Some(service.into());
        self
    }
}

/// Where log output goes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogSink {
    None,
    #[default]
    Console,
    File,
}

/// Logging settings
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default)]
    pub sink: LogSink,

    #[serde(default)]
    pub level: LogLevel,

    /// Log file for the `file` sink
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,

    /// Line prefix for the `console` sink
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prefix: Option<String>,
}

impl LoggingConfig {
    /// Build the logger described by this section
    pub fn build_logger(&self) -> ConfigResult<SharedLogger> {
        let logger: SharedLogger = match self.sink {
            LogSink::None => Arc::new(NoOpLogger::new()),
            LogSink::Console => {
                let console = match &self.prefix {
                    Some(prefix) => ConsoleLogger::with_prefix(prefix.clone()),
                    None => ConsoleLogger::new(),
                };
                Arc::new(console.with_min_level(self.level))
            }
            LogSink::File => {
                let path = self.path.clone().unwrap_or_else(FileLogger::default_path);
                Arc::new(FileLogger::open(path, self.level)?)
            }
        };
        Ok(logger)
    }
}

/// Configuration file structure
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StoreConfig {
    #[serde(default)]
    pub backing: BackingConfig,

    /// Output format for newly written credentials
    #[serde(default)]
    pub format: WireFormat,

    #[serde(default)]
    pub logging: LoggingConfig,
}

impl StoreConfig {
    /// User-level config path (`~/.config/credstore/config.yaml`)
    pub fn user_path() -> PathBuf {
        let config_dir = dirs::config_dir()
            .unwrap_or_else(|| dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")).join(".config"));
        config_dir.join("credstore").join("config.yaml")
    }

    /// Load config from `path`; a missing file yields the defaults
    pub fn load(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Load the user-level config and apply environment overrides
    pub fn load_user() -> ConfigResult<Self> {
        let mut config = Self::load(Self::user_path())?;
        config.apply_env_overrides()?;
        Ok(config)
    }

    pub fn from_yaml(content: &str) -> ConfigResult<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(content)?)
    }

    pub fn to_yaml(&self) -> ConfigResult<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Save config to `path`, creating parent directories
    pub fn save(&self, path: impl AsRef<Path>) -> ConfigResult<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, self.to_yaml()?)?;
        Ok(())
    }

    /// Apply `CREDSTORE_*` environment variables
    pub fn apply_env_overrides(&mut self) -> ConfigResult<()> {
        self.apply_overrides_from(|name| std::env::var(name).ok())
    }

    /// Apply overrides using `lookup` to resolve variable names
    pub fn apply_overrides_from<F>(&mut self, lookup: F) -> ConfigResult<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(kind) = lookup(ENV_BACKING).filter(|v| !v.trim().is_empty()) {
            self.backing.kind = kind.trim().to_lowercase();
        }
        if let Some(format) = lookup(ENV_FORMAT).filter(|v| !v.trim().is_empty()) {
            self.format = format.parse().map_err(ConfigError::Invalid)?;
        }
        if let Some(level) = lookup(ENV_LOG_LEVEL).filter(|v| !v.trim().is_empty()) {
            self.logging.level = level.parse().map_err(ConfigError::Invalid)?;
        }
        Ok(())
    }
}
