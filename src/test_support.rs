//! Shared fixtures for unit tests: a `Robot` type, its instances, and a capturing sink.

use crate::error::{Result, TrackerError};
use crate::logging::{LogSink, Severity};
use crate::target::{arg, optional_arg, OperationDecl, TargetKind, Trackable};
use crate::operation;
use chrono::{DateTime, Local};
use serde_json::{json, Value};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

static ENV_LOCK: Mutex<()> = Mutex::new(());

/// Serializes tests that touch `OBJECT_TRACKER_*` variables or the global tracker
pub fn lock_env() -> MutexGuard<'static, ()> {
    ENV_LOCK.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Ordered record of everything that happened during a test
#[derive(Clone, Default)]
pub struct Journal(Arc<Mutex<Vec<String>>>);

impl Journal {
    pub fn record(&self, entry: impl Into<String>) {
        self.0.lock().unwrap().push(entry.into());
    }

    pub fn entries(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }
}

/// The `Robot` type: static operations plus zero-argument construction
pub struct RobotType {
    journal: Journal,
}

impl RobotType {
    pub fn new(journal: Journal) -> Self {
        Self { journal }
    }

    pub fn build(&self, name: &str) -> RobotInstance {
        RobotInstance {
            name: name.to_string(),
            journal: self.journal.clone(),
        }
    }
}

impl Trackable for RobotType {
    fn type_name(&self) -> &str {
        "Robot"
    }

    fn kind(&self) -> TargetKind {
        TargetKind::TypeLevel
    }

    fn operations(&self) -> Vec<OperationDecl> {
        vec![
            operation!("create"),
            operation!("speak"),
            operation!("reset"),
            operation!("equals"),
            operation!("hashCode"),
        ]
    }

    fn invoke(&self, name: &str, args: &[Value]) -> Result<Value> {
        self.journal.record(format!("original:Robot.{}", name));
        match name {
            "create" => Ok(json!({"name": "unit"})),
            "speak" => {
                let word: String = arg(args, 0)?;
                Ok(json!(format!("Robot says {}", word)))
            }
            "reset" => Ok(Value::Null),
            "equals" => Ok(json!(true)),
            "hashCode" => Ok(json!(42)),
            other => Err(TrackerError::UnknownOperation(other.to_string())),
        }
    }

    fn instantiate(&self, args: &[Value]) -> Result<Arc<dyn Trackable>> {
        let name: Option<String> = optional_arg(args, 0)?;
        Ok(Arc::new(self.build(name.as_deref().unwrap_or("unit"))))
    }
}

/// A single robot
pub struct RobotInstance {
    name: String,
    journal: Journal,
}

impl Trackable for RobotInstance {
    fn type_name(&self) -> &str {
        "Robot"
    }

    fn kind(&self) -> TargetKind {
        TargetKind::InstanceLevel
    }

    fn operations(&self) -> Vec<OperationDecl> {
        vec![
            operation!("greet"),
            operation!("beep"),
            operation!("fail"),
            operation!("explode"),
            operation!("clone"),
        ]
    }

    fn invoke(&self, name: &str, args: &[Value]) -> Result<Value> {
        self.journal.record(format!("original:Robot#{}", name));
        match name {
            "greet" => {
                let who: String = arg(args, 0)?;
                Ok(json!(format!("{} greets {}", self.name, who)))
            }
            "beep" => Ok(json!("beep")),
            "fail" => Err(TrackerError::OperationFailed("jammed".to_string())),
            "explode" => panic!("boom"),
            "clone" => Ok(json!(self.name)),
            other => Err(TrackerError::UnknownOperation(other.to_string())),
        }
    }
}

/// Sink that keeps lines and mirrors them into a journal
pub struct CaptureSink {
    journal: Journal,
    lines: Mutex<Vec<String>>,
}

impl CaptureSink {
    pub fn new(journal: Journal) -> Self {
        Self {
            journal,
            lines: Mutex::new(Vec::new()),
        }
    }

    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().unwrap().clone()
    }
}

impl LogSink for CaptureSink {
    fn emit(&self, _severity: Severity, _timestamp: DateTime<Local>, message: &str) {
        self.journal.record(format!("log:{}", message));
        self.lines.lock().unwrap().push(message.to_string());
    }
}
