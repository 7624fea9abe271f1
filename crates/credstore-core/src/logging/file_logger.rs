//! File-based logger
//!
//! Appends log lines to a file. Useful when the process has no visible
//! stderr (daemons, editor extension hosts).

use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::SystemTime;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use super::traits::Logger;

/// Log levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace = 0,
    Debug = 1,
    Info = 2,
    #[default]
    Warn = 3,
    Error = 4,
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogLevel::Trace => write!(f, "TRACE"),
            LogLevel::Debug => write!(f, "DEBUG"),
            LogLevel::Info => write!(f, "INFO "),
            LogLevel::Warn => write!(f, "WARN "),
            LogLevel::Error => write!(f, "ERROR"),
        }
    }
}

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "trace" => Ok(LogLevel::Trace),
            "debug" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "error" => Ok(LogLevel::Error),
            other => Err(format!("unknown log level '{}'", other)),
        }
    }
}

/// Logger that appends to a file
pub struct FileLogger {
    path: PathBuf,
    file: Mutex<File>,
    min_level: LogLevel,
    module: String,
}

impl FileLogger {
    /// Open (or create) `path` for appending
    pub fn open(path: impl Into<PathBuf>, min_level: LogLevel) -> io::Result<Self> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        Ok(Self {
            path,
            file: Mutex::new(file),
            min_level,
            module: "credstore".to_string(),
        })
    }

    /// Default log location in the temp directory
    pub fn default_path() -> PathBuf {
        let mut path = std::env::temp_dir();
        path.push("credstore.log");
        path
    }

    /// Set the module tag written on every line
    pub fn with_module(mut self, module: impl Into<String>) -> Self {
        self.module = module.into();
        self
    }

    /// Path of the log file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Truncate the log file, keeping the append handle
    pub fn clear(&self) -> io::Result<()> {
        self.file.lock().set_len(0)
    }

    fn write(&self, level: LogLevel, message: &str) {
        if level < self.min_level {
            return;
        }

        let timestamp = SystemTime::now()
            .duration_since(SystemTime::UNIX_EPOCH)
            .map(|d| {
                let secs = d.as_secs();
                let millis = d.subsec_millis();
                let hours = (secs % 86400) / 3600;
                let mins = (secs % 3600) / 60;
                let secs = secs % 60;
                format!("{:02}:{:02}:{:02}.{:03}", hours, mins, secs, millis)
            })
            .unwrap_or_else(|_| "??:??:??.???".to_string());

        let mut file = self.file.lock();
        let _ = writeln!(file, "[{}] [{}] [{}] {}", timestamp, level, self.module, message);
        let _ = file.flush();
    }
}

impl Logger for FileLogger {
    fn debug(&self, message: &str) {
        self.write(LogLevel::Debug, message);
    }

    fn info(&self, message: &str) {
        self.write(LogLevel::Info, message);
    }

    fn warn(&self, message: &str) {
        self.write(LogLevel::Warn, message);
    }

    fn error(&self, message: &str) {
        self.write(LogLevel::Error, message);
    }
}

impl std::fmt::Debug for FileLogger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileLogger")
            .field("path", &self.path)
            .field("min_level", &self.min_level)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_log_levels() {
        assert!(LogLevel::Debug > LogLevel::Trace);
        assert!(LogLevel::Info > LogLevel::Debug);
        assert!(LogLevel::Warn > LogLevel::Info);
        assert!(LogLevel::Error > LogLevel::Warn);
    }

    #[test]
    fn test_parse_level() {
        assert_eq!("WARN".parse::<LogLevel>().unwrap(), LogLevel::Warn);
        assert_eq!("warning".parse::<LogLevel>().unwrap(), LogLevel::Warn);
        assert_eq!(" debug ".parse::<LogLevel>().unwrap(), LogLevel::Debug);
        assert!("loud".parse::<LogLevel>().is_err());
    }

    #[test]
    fn test_file_logger_filters_and_writes() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("logs").join("credstore.log");
        let logger = FileLogger::open(&path, LogLevel::Warn).unwrap();

        logger.debug("hidden debug");
        logger.info("hidden info");
        logger.warn("visible warning");
        logger.error("visible error");

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(!content.contains("hidden"));
        assert!(content.contains("[WARN ] [credstore] visible warning"));
        assert!(content.contains("visible error"));
    }

    #[test]
    fn test_file_logger_clear() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("credstore.log");
        let logger = FileLogger::open(&path, LogLevel::Debug).unwrap().with_module("test");

        logger.info("first");
        logger.clear().unwrap();
        logger.info("second");

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(!content.contains("first"));
        assert!(content.contains("[test] second"));
    }

    #[test]
    fn test_file_logger_appends_after_clear() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("credstore.log");
        let logger = FileLogger::open(&path, LogLevel::Debug).unwrap();

        logger.info("before");
        logger.clear().unwrap();
        logger.info("second");

        // Another writer appending to the same file must not be overwritten
        let mut other = OpenOptions::new().append(true).open(&path).unwrap();
        writeln!(other, "external line").unwrap();
        logger.info("third");

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(!content.contains("before"));
        assert!(content.contains("second"));
        assert!(content.contains("external line"));
        assert!(content.contains("third"));
    }

    #[test]
    fn test_default_level_is_warn() {
        assert_eq!(LogLevel::default(), LogLevel::Warn);
    }
}
