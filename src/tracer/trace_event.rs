//! Per-call trace record
//!
//! A [`TraceEvent`] is built for every wrapped call and handed straight to the log sink.
//! It is never stored.

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// Observation of a single wrapped call
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TraceEvent {
    /// Unique id of this call
    pub call_id: Uuid,
    /// When the original operation started
    pub timestamp: DateTime<Local>,
    /// `Type.op` or `Type#op`
    pub display_name: String,
    /// Arguments the call received
    pub args: Vec<Value>,
    /// Declaration site of the operation, or `unknown`
    pub origin: String,
    /// Wall-clock time spent in the original operation
    pub duration_seconds: f64,
    /// Returned value; `None` when the call failed
    pub result: Option<Value>,
    /// Failure description when the call returned an error or panicked
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl TraceEvent {
    pub fn succeeded(&self) -> bool {
        self.error.is_none()
    }

    /// `called "<display_name>" [with [<args>]] [<origin>]`
    pub fn message(&self) -> String {
        let mut msg = format!("called \"{}\"", self.display_name);
        if !self.args.is_empty() {
            let rendered: Vec<String> = self.args.iter().map(render_arg).collect();
            msg.push_str(&format!(" with [{}]", rendered.join(", ")));
        }
        msg.push_str(&format!(" [{}]", self.origin));
        msg
    }

    /// The message followed by the duration in seconds, as written to the log
    pub fn log_line(&self) -> String {
        format!("{} ({:.5})", self.message(), self.duration_seconds)
    }

    pub fn printable_summary(&self) -> String {
        let time_str = self.timestamp.format("%H:%M:%S%.3f").to_string();

        let mut summary = format!(
            "[{}] TraceEvent (call_id: {})\n   Operation: {}\n   Origin: {}",
            time_str, self.call_id, self.display_name, self.origin
        );

        if !self.args.is_empty() {
            summary.push_str(&format!("\n   Arguments: {} argument{}", self.args.len(), plural(self.args.len())));
        }

        match (&self.result, &self.error) {
            (_, Some(error)) => summary.push_str(&format!("\n   Error: {}", error)),
            (Some(result), None) => {
                let result_str = result.to_string();
                let result_preview = if result_str.chars().count() > 100 {
                    format!("{}...", result_str.chars().take(100).collect::<String>())
                } else {
                    result_str
                };
                summary.push_str(&format!("\n   Result: {}", result_preview));
            }
            (None, None) => {}
        }

        summary.push_str(&format!("\n   Duration: {:.5}s", self.duration_seconds));
        summary
    }
}

fn render_arg(arg: &Value) -> String {
    match arg {
        Value::Null => "nil".to_string(),
        other => other.to_string(),
    }
}

fn plural(count: usize) -> &'static str {
    if count != 1 {
        "s"
    } else {
        ""
    }
}
