//! Error types and result aliases for the ObjectTracker library.
//!
//! This module defines the core error type [`TrackerError`] and the [`Result`] type alias
//! used throughout the library. Instrumentation, argument decoding and the operations of
//! trackable targets all report failures through `Result<T>`.
//!
//! Hook failures are deliberately absent: they are discarded at the dispatch boundary and
//! never reach a caller.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum TrackerError {
    #[error("Unknown operation: {0}")]
    UnknownOperation(String),

    #[error("Operation failed: {0}")]
    OperationFailed(String),

    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),

    #[error("Type cannot be instantiated: {0}")]
    NotInstantiable(String),

    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, TrackerError>;
