//! Logger writing GitHub Actions workflow commands.
//!
//! See <https://docs.github.com/en/actions/using-workflows/workflow-commands-for-github-actions>.

use std::io::{self, Write};
use std::sync::Mutex;

use module_creator_core::{logger::format_properties, LogLevel, LogProperties, Logger};

#[cfg(test)]
#[path = "action_logger_tests.rs"]
mod tests;

/// Emits `::debug::`, `::warning::` and `::error::` lines so the runner renders them as
/// debug output or annotations. Info messages are written as plain log lines.
pub struct ActionLogger<W: Write + Send> {
    writer: Mutex<W>,
}

impl ActionLogger<io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write + Send> ActionLogger<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer: Mutex::new(writer),
        }
    }

    pub fn into_inner(self) -> W {
        match self.writer.into_inner() {
            Ok(writer) => writer,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

impl<W: Write + Send> Logger for ActionLogger<W> {
    fn log(&self, level: LogLevel, message: &str, properties: LogProperties<'_>) {
        let line = format_command(level, message, properties);
        let mut writer = match self.writer.lock() {
            Ok(writer) => writer,
            Err(poisoned) => poisoned.into_inner(),
        };
        // Nowhere left to report a failed write to.
        let _ = writeln!(writer, "{}", line).and_then(|_| writer.flush());
    }
}

/// Formats one log line. Properties are appended to the message in parentheses.
///
/// Info has no workflow command; its line is the escaped message alone.
pub fn format_command(level: LogLevel, message: &str, properties: LogProperties<'_>) -> String {
    let text = if properties.is_empty() {
        message.to_string()
    } else {
        format!("{} ({})", message, format_properties(properties))
    };

    let command = match level {
        LogLevel::Debug => "debug",
        LogLevel::Info => return escape_data(&text),
        LogLevel::Warning => "warning",
        LogLevel::Error => "error",
    };

    format!("::{}::{}", command, escape_data(&text))
}

/// Escapes a workflow command message.
pub fn escape_data(value: &str) -> String {
    value
        .replace('%', "%25")
        .replace('\r', "%0D")
        .replace('\n', "%0A")
}
