//! In-memory recording logger

use parking_lot::Mutex;

use super::file_logger::LogLevel;
use super::traits::Logger;

/// A logger that keeps every message in memory
///
/// Handy for asserting on warnings emitted by a store.
#[derive(Debug, Default)]
pub struct MemoryLogger {
    entries: Mutex<Vec<(LogLevel, String)>>,
}

impl MemoryLogger {
    pub fn new() -> Self {
        Self::default()
    }

    /// All recorded messages in order
    pub fn entries(&self) -> Vec<(LogLevel, String)> {
        self.entries.lock().clone()
    }

    /// Messages recorded at `level`
    pub fn messages(&self, level: LogLevel) -> Vec<String> {
        self.entries
            .lock()
            .iter()
            .filter(|(l, _)| *l == level)
            .map(|(_, m)| m.clone())
            .collect()
    }

    /// Number of warnings recorded
    pub fn warning_count(&self) -> usize {
        self.messages(LogLevel::Warn).len()
    }

    pub fn clear(&self) {
        self.entries.lock().clear();
    }

    fn record(&self, level: LogLevel, message: &str) {
        self.entries.lock().push((level, message.to_string()));
    }
}

impl Logger for MemoryLogger {
    fn debug(&self, message: &str) {
        self.record(LogLevel::Debug, message);
    }

    fn info(&self, message: &str) {
        self.record(LogLevel::Info, message);
    }

    fn warn(&self, message: &str) {
        self.record(LogLevel::Warn, message);
    }

    fn error(&self, message: &str) {
        self.record(LogLevel::Error, message);
    }
}
