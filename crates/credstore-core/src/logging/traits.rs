//! Logger trait definition

use std::sync::Arc;

/// Logger abstraction injected into stores and codecs
///
/// Implementations:
/// - `NoOpLogger`: Silent logger
/// - `ConsoleLogger`: Logs to stdout/stderr
/// - `FileLogger`: Appends to a log file
/// - `MemoryLogger`: Records messages for inspection
pub trait Logger: Send + Sync {
    /// Log a debug message
    fn debug(&self, message: &str);

    /// Log an info message
    fn info(&self, message: &str);

    /// Log a warning message
    fn warn(&self, message: &str);

    /// Log an error message
    fn error(&self, message: &str);

    /// Log a warning caused by `err`
    fn warn_error(&self, err: &dyn std::error::Error, message: &str) {
        self.warn(&format!("{}: {}", message, err));
    }
}

/// Type alias for an Arc-wrapped logger
pub type SharedLogger = Arc<dyn Logger>;
