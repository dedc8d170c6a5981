//! Logging abstraction handed to the orchestrator and the repository configurator.
//!
//! Components receive an `Arc<dyn Logger>` at construction instead of reaching for a
//! process-wide logger, which lets entry points pick the output format and lets tests
//! record what was logged.

use std::fmt;

use tracing::{debug, error, info, warn};

#[cfg(test)]
#[path = "logger_tests.rs"]
mod tests;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LogLevel {
    Debug,
    Info,
    Warning,
    Error,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warning => "warning",
            LogLevel::Error => "error",
        };
        f.write_str(name)
    }
}

/// Structured key/value pairs attached to a log message.
pub type LogProperties<'a> = &'a [(&'a str, &'a str)];

pub trait Logger: Send + Sync {
    fn log(&self, level: LogLevel, message: &str, properties: LogProperties<'_>);

    fn debug(&self, message: &str, properties: LogProperties<'_>) {
        self.log(LogLevel::Debug, message, properties);
    }

    fn info(&self, message: &str, properties: LogProperties<'_>) {
        self.log(LogLevel::Info, message, properties);
    }

    fn warning(&self, message: &str, properties: LogProperties<'_>) {
        self.log(LogLevel::Warning, message, properties);
    }

    fn error(&self, message: &str, properties: LogProperties<'_>) {
        self.log(LogLevel::Error, message, properties);
    }
}

/// Forwards to the `tracing` macros; the subscriber installed by the binary decides the
/// output.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingLogger;

impl Logger for TracingLogger {
    fn log(&self, level: LogLevel, message: &str, properties: LogProperties<'_>) {
        let properties = format_properties(properties);
        match level {
            LogLevel::Debug => debug!(properties = %properties, "{}", message),
            LogLevel::Info => info!(properties = %properties, "{}", message),
            LogLevel::Warning => warn!(properties = %properties, "{}", message),
            LogLevel::Error => error!(properties = %properties, "{}", message),
        }
    }
}

/// Renders properties as `key=value` pairs separated by spaces.
pub fn format_properties(properties: LogProperties<'_>) -> String {
    properties
        .iter()
        .map(|(key, value)| format!("{}={}", key, value))
        .collect::<Vec<_>>()
        .join(" ")
}
