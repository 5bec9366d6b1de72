//! Log line formatting and sinks
//!
//! Every wrapped call produces exactly one trace line. The tracker hands that line to a
//! [`LogSink`] together with a [`Severity`] and a timestamp; the sink decides where it goes.
//!
//! - **TracingSink**: forwards to `tracing` events (the default)
//! - **WriterSink**: formats lines with [`LogFormatter`] and writes them to any `io::Write`
//! - **NullSink**: discards everything
//!
//! Lines look like:
//!
//! ```text
//! [2026-10-18T09:15:02.481233] DEBUG -- ObjectTracker: called "Robot.create" [src/robot.rs:12] (0.00002)
//! ```
//!
//! [`init_logging`] installs a `tracing_subscriber` fmt subscriber that renders every
//! `tracing` event in that same layout.

pub mod formatter;
pub mod sink;

pub use formatter::{init_logging, LogFormatter, TrackerLogFormat, PROGNAME, TIMESTAMP_FORMAT};
pub use sink::{LogSink, NullSink, TracingSink, WriterSink};

use crate::error::TrackerError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Severity attached to a log line
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl Severity {
    pub fn label(&self) -> &'static str {
        match self {
            Severity::Trace => "TRACE",
            Severity::Debug => "DEBUG",
            Severity::Info => "INFO",
            Severity::Warn => "WARN",
            Severity::Error => "ERROR",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.label())
    }
}

impl From<tracing::Level> for Severity {
    fn from(level: tracing::Level) -> Self {
        match level {
            tracing::Level::TRACE => Severity::Trace,
            tracing::Level::DEBUG => Severity::Debug,
            tracing::Level::INFO => Severity::Info,
            tracing::Level::WARN => Severity::Warn,
            tracing::Level::ERROR => Severity::Error,
        }
    }
}

impl FromStr for Severity {
    type Err = TrackerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "trace" => Ok(Severity::Trace),
            "debug" => Ok(Severity::Debug),
            "info" => Ok(Severity::Info),
            "warn" | "warning" => Ok(Severity::Warn),
            "error" => Ok(Severity::Error),
            other => Err(TrackerError::ConfigError(format!("unknown log level: {}", other))),
        }
    }
}
