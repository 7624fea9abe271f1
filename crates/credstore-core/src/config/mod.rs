//! Store configuration
//!
//! - `StoreConfig`: YAML file (user level) with environment overrides

mod file;

pub use file::{
    StoreConfig, BackingConfig, LoggingConfig, LogSink, ConfigError, ConfigResult,
    ENV_BACKING, ENV_FORMAT, ENV_LOG_LEVEL,
};
