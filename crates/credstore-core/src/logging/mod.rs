//! Logging abstractions
//!
//! Stores receive a `SharedLogger` instead of writing to a global sink.

mod traits;
mod noop;
mod console;
mod memory;
pub mod file_logger;

pub use traits::{Logger, SharedLogger};
pub use noop::NoOpLogger;
pub use console::ConsoleLogger;
pub use memory::MemoryLogger;
pub use file_logger::{FileLogger, LogLevel};
