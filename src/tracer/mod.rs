//! Call interception and tracing
//!
//! The tracer wraps operations of [`Trackable`](crate::Trackable) targets so that every
//! call is timed, logged and exposed to hooks, while the original result is handed back
//! unchanged.
//!
//! # Architecture
//!
//! - **OperationSelector**: enumerates a target's operations, drops reserved ones and
//!   classifies each as static or instance
//! - **SourceLocator**: turns recorded declaration sites into short origin strings
//! - **HookRegistry**: ordered `before`/`after` callbacks with per-hook fault isolation
//! - **TraceRecorder**: runs and times the original call, producing a [`TraceEvent`]
//! - **Tracker**: an instrumentation session that plans, then installs, a [`Tracked`]
//!   decorator over the target
//!
//! # Call order
//!
//! For every wrapped call: `before` hooks in registration order, the original operation,
//! one log line, then `after` hooks in registration order. The `after` hooks run even if
//! the original returned an error or panicked; the failure is then handed back to the
//! caller (or swallowed, under [`FailurePolicy::Swallow`](crate::FailurePolicy)).
//!
//! # Usage Example
//!
//! ```rust,ignore
//! use object_tracker::prelude::*;
//! use std::sync::Arc;
//!
//! let tracker = Tracker::new(TrackerConfig::default());
//! let robot = tracker.instrument(
//!     Arc::new(RobotType::default()),
//!     InstrumentOptions::new()
//!         .except(["reset"])
//!         .before(before_hook(|_ctx, name, _args| {
//!             println!("about to call {}", name);
//!             Ok(())
//!         })),
//! )?;
//!
//! robot.invoke("create", &[])?;
//! // DEBUG -- ObjectTracker: called "Robot.create" [src/robot.rs:14] (0.00001)
//! ```

pub mod hooks;
pub mod recorder;
pub mod reserved;
pub mod selector;
pub mod source_locator;
pub mod trace_event;
pub mod tracked;
pub mod tracker;

// Re-export main types
pub use hooks::{after_hook, before_hook, AfterHook, BeforeHook, Hook, HookPhase, HookRegistry};
pub use recorder::{CallOutcome, Recording, TraceRecorder};
pub use reserved::{ReservedOperationSet, DEFAULT_RESERVED};
pub use selector::{display_name, OperationDescriptor, OperationKind, OperationSelector, Selection};
pub use source_locator::{SourceLocator, DEFAULT_ORIGIN_SEGMENTS, UNKNOWN_ORIGIN};
pub use trace_event::TraceEvent;
pub use tracked::Tracked;
pub use tracker::{instrument, is_tracked, InstrumentOptions, Tracker};
