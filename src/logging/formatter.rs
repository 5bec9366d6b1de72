//! Line formatting for trace output

use super::Severity;
use crate::error::{Result, TrackerError};
use chrono::{DateTime, Local};
use tracing::{Event, Subscriber};
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::{FmtContext, FormatEvent, FormatFields};
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::EnvFilter;

/// Program name stamped on every line
pub const PROGNAME: &str = "ObjectTracker";

/// ISO-8601 with microseconds
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.6f";

/// Formats `[<timestamp>] <SEVERITY> -- ObjectTracker: <message>` lines
#[derive(Debug, Clone, Copy, Default)]
pub struct LogFormatter;

impl LogFormatter {
    pub fn new() -> Self {
        Self
    }

    /// Format a single line, including the trailing newline
    pub fn format(&self, severity: Severity, time: &DateTime<Local>, message: &str) -> String {
        format!(
            "[{}] {:>5} -- {}: {}\n",
            time.format(TIMESTAMP_FORMAT),
            severity,
            PROGNAME,
            message
        )
    }
}

/// `tracing_subscriber` event format producing the same layout as [`LogFormatter`]
#[derive(Debug, Clone, Copy, Default)]
pub struct TrackerLogFormat;

impl<S, N> FormatEvent<S, N> for TrackerLogFormat
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> std::fmt::Result {
        let severity = Severity::from(*event.metadata().level());
        write!(
            &mut writer,
            "[{}] {:>5} -- {}: ",
            Local::now().format(TIMESTAMP_FORMAT),
            severity,
            PROGNAME
        )?;
        ctx.field_format().format_fields(writer.by_ref(), event)?;
        writeln!(writer)
    }
}

/// Install a global fmt subscriber using [`TrackerLogFormat`]
///
/// The filter comes from `RUST_LOG` and defaults to `debug` so trace lines are visible.
pub fn init_logging() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .event_format(TrackerLogFormat)
        .try_init()
        .map_err(|e| TrackerError::ConfigError(format!("failed to install logger: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use regex::Regex;
    use std::io;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct CaptureWriter(Arc<Mutex<Vec<u8>>>);

    impl io::Write for CaptureWriter {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_format_line() {
        let time = Local.with_ymd_and_hms(2026, 3, 4, 5, 6, 7).unwrap();
        let line = LogFormatter::new().format(Severity::Debug, &time, "called \"Robot.create\"");

        assert_eq!(
            line,
            "[2026-03-04T05:06:07.000000] DEBUG -- ObjectTracker: called \"Robot.create\"\n"
        );
    }

    #[test]
    fn test_format_right_aligns_short_severity() {
        let time = Local.with_ymd_and_hms(2026, 3, 4, 5, 6, 7).unwrap();
        let line = LogFormatter::new().format(Severity::Info, &time, "ready");
        assert!(line.contains("]  INFO -- ObjectTracker: ready"));
    }

    #[test]
    fn test_tracing_event_format() {
        let capture = CaptureWriter::default();
        let writer = capture.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::TRACE)
            .event_format(TrackerLogFormat)
            .with_writer(move || writer.clone())
            .finish();

        tracing::subscriber::with_default(subscriber, || {
            tracing::warn!("battery low");
        });

        let output = String::from_utf8(capture.0.lock().unwrap().clone()).unwrap();
        let pattern =
            Regex::new(r"^\[\d{4}-\d{2}-\d{2}T\d{2}:\d{2}:\d{2}\.\d{6}\]  WARN -- ObjectTracker: battery low\n$")
                .unwrap();
        assert!(pattern.is_match(&output), "unexpected output: {:?}", output);
    }
}
