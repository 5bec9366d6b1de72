//! Destinations for trace lines

use super::formatter::LogFormatter;
use super::Severity;
use chrono::{DateTime, Local};
use std::io::Write;
use std::sync::Mutex;

/// Receives one line per wrapped call, in call-completion order
///
/// Sinks must not fail the traced call: write problems are handled inside the sink.
pub trait LogSink: Send + Sync {
    fn emit(&self, severity: Severity, timestamp: DateTime<Local>, message: &str);
}

/// Forwards lines to `tracing` under the `object_tracker` target
///
/// The subscriber stamps its own time, so `timestamp` is unused here.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl LogSink for TracingSink {
    fn emit(&self, severity: Severity, _timestamp: DateTime<Local>, message: &str) {
        match severity {
            Severity::Trace => tracing::trace!(target: "object_tracker", "{}", message),
            Severity::Debug => tracing::debug!(target: "object_tracker", "{}", message),
            Severity::Info => tracing::info!(target: "object_tracker", "{}", message),
            Severity::Warn => tracing::warn!(target: "object_tracker", "{}", message),
            Severity::Error => tracing::error!(target: "object_tracker", "{}", message),
        }
    }
}

/// Writes formatted lines to any writer
pub struct WriterSink<W: Write + Send> {
    writer: Mutex<W>,
    formatter: LogFormatter,
}

impl<W: Write + Send> WriterSink<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer: Mutex::new(writer),
            formatter: LogFormatter::new(),
        }
    }

    /// Recover the underlying writer
    pub fn into_inner(self) -> W {
        self.writer.into_inner().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl<W: Write + Send> LogSink for WriterSink<W> {
    fn emit(&self, severity: Severity, timestamp: DateTime<Local>, message: &str) {
        let line = self.formatter.format(severity, &timestamp, message);
        let mut writer = self.writer.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        if let Err(e) = writer.write_all(line.as_bytes()).and_then(|_| writer.flush()) {
            tracing::warn!("Failed to write trace line: {}", e);
        }
    }
}

/// Discards every line
///
/// Null object for callers who only want hooks.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl LogSink for NullSink {
    fn emit(&self, _severity: Severity, _timestamp: DateTime<Local>, _message: &str) {
        // Do nothing
    }
}
