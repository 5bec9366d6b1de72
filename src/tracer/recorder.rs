//! Runs the original operation and measures it
//!
//! The recorder times exactly the original call: hook dispatch and logging happen
//! outside the measured window. Errors and panics from the call are captured in the
//! [`CallOutcome`] rather than propagated, so the caller can finish logging and run the
//! `after` hooks before deciding what to hand back.

use super::trace_event::TraceEvent;
use crate::error::Result;
use chrono::Local;
use serde_json::Value;
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::time::{Duration, Instant};
use uuid::Uuid;

/// How the original operation ended
pub enum CallOutcome {
    /// Returned normally, with a value or an error
    Returned(Result<Value>),
    /// Panicked; the payload is kept for `resume_unwind`
    Panicked(Box<dyn Any + Send>),
}

impl CallOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, CallOutcome::Returned(Ok(_)))
    }
}

/// Everything observed about one call
pub struct Recording {
    pub outcome: CallOutcome,
    pub event: TraceEvent,
    pub duration: Duration,
}

impl Recording {
    /// Trace message without the duration suffix
    pub fn message(&self) -> String {
        self.event.message()
    }

    /// Trace message with the duration suffix
    pub fn log_line(&self) -> String {
        self.event.log_line()
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TraceRecorder;

impl TraceRecorder {
    pub fn new() -> Self {
        Self
    }

    pub fn record<F>(&self, display_name: &str, args: &[Value], origin: &str, call: F) -> Recording
    where
        F: FnOnce() -> Result<Value>,
    {
        let timestamp = Local::now();
        let started = Instant::now();
        let caught = panic::catch_unwind(AssertUnwindSafe(call));
        let duration = started.elapsed();

        let (result, error) = match &caught {
            Ok(Ok(value)) => (Some(value.clone()), None),
            Ok(Err(e)) => (None, Some(e.to_string())),
            Err(payload) => (None, Some(format!("panicked: {}", panic_message(&**payload)))),
        };

        let event = TraceEvent {
            call_id: Uuid::new_v4(),
            timestamp,
            display_name: display_name.to_string(),
            args: args.to_vec(),
            origin: origin.to_string(),
            duration_seconds: duration.as_secs_f64(),
            result,
            error,
        };

        let outcome = match caught {
            Ok(returned) => CallOutcome::Returned(returned),
            Err(payload) => CallOutcome::Panicked(payload),
        };

        Recording {
            outcome,
            event,
            duration,
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TrackerError;
    use serde_json::json;

    #[test]
    fn test_record_success() {
        let recording = TraceRecorder::new().record("Robot.create", &[], "src/robot.rs:1", || Ok(json!(7)));

        assert!(recording.outcome.is_success());
        assert_eq!(recording.event.result, Some(json!(7)));
        assert_eq!(recording.message(), "called \"Robot.create\" [src/robot.rs:1]");
        assert!(recording.event.duration_seconds >= 0.0);
    }

    #[test]
    fn test_record_error_is_captured() {
        let recording = TraceRecorder::new().record("Robot.create", &[json!(1)], "unknown", || {
            Err(TrackerError::OperationFailed("jammed".to_string()))
        });

        match recording.outcome {
            CallOutcome::Returned(Err(TrackerError::OperationFailed(msg))) => assert_eq!(msg, "jammed"),
            _ => panic!("Expected captured OperationFailed"),
        }
        assert_eq!(recording.event.result, None);
        assert_eq!(recording.event.error.as_deref(), Some("Operation failed: jammed"));
    }

    #[test]
    fn test_record_panic_is_captured() {
        let recording =
            TraceRecorder::new().record("Robot#explode", &[], "unknown", || panic!("kaboom"));

        assert!(matches!(recording.outcome, CallOutcome::Panicked(_)));
        assert_eq!(recording.event.error.as_deref(), Some("panicked: kaboom"));
    }

    #[test]
    fn test_duration_covers_only_the_call() {
        let recording = TraceRecorder::new().record("Robot.speak", &[], "unknown", || {
            std::thread::sleep(Duration::from_millis(20));
            Ok(Value::Null)
        });

        assert!(recording.duration >= Duration::from_millis(20));
        assert!(recording.log_line().ends_with(&format!("({:.5})", recording.duration.as_secs_f64())));
    }
}
