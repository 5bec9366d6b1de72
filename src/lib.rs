pub mod config;
pub mod error;
pub mod logging;
pub mod target;
pub mod tracer;

#[cfg(test)]
mod test_support;

pub use config::{FailurePolicy, TrackerConfig};
pub use error::{Result, TrackerError};
pub use target::{arg, optional_arg, OperationDecl, TargetKind, Trackable};
pub use tracer::{instrument, is_tracked, InstrumentOptions, Tracked, Tracker};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prelude module for common imports
pub mod prelude {
    pub use crate::error::{Result, TrackerError};
    pub use crate::logging::{init_logging, LogSink, Severity, TracingSink, WriterSink};
    pub use crate::target::{arg, optional_arg, OperationDecl, TargetKind, Trackable};
    pub use crate::tracer::{
        after_hook, before_hook, instrument, is_tracked, Hook, InstrumentOptions, Tracked, Tracker,
    };
    pub use crate::{operation, FailurePolicy, TrackerConfig};
}
