//! Tracker configuration
//!
//! [`TrackerConfig::default`] suits most callers. [`TrackerConfig::from_env`] reads overrides
//! from the environment:
//!
//! - `OBJECT_TRACKER_RESERVED`: comma-separated operation names never to wrap
//! - `OBJECT_TRACKER_ORIGIN_SEGMENTS`: path components kept in origins (default 5)
//! - `OBJECT_TRACKER_FAILURE_POLICY`: `propagate` (default) or `swallow`
//! - `OBJECT_TRACKER_LOG_LEVEL`: severity of trace lines (default `debug`)

use crate::error::{Result, TrackerError};
use crate::logging::Severity;
use crate::tracer::DEFAULT_ORIGIN_SEGMENTS;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

pub const ENV_RESERVED: &str = "OBJECT_TRACKER_RESERVED";
pub const ENV_ORIGIN_SEGMENTS: &str = "OBJECT_TRACKER_ORIGIN_SEGMENTS";
pub const ENV_FAILURE_POLICY: &str = "OBJECT_TRACKER_FAILURE_POLICY";
pub const ENV_LOG_LEVEL: &str = "OBJECT_TRACKER_LOG_LEVEL";

/// What a wrapped call returns when the original operation fails
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FailurePolicy {
    /// Hand the original error (or panic) back to the caller after logging and hooks
    Propagate,
    /// Turn failures into `Ok(Value::Null)`
    Swallow,
}

impl FromStr for FailurePolicy {
    type Err = TrackerError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "propagate" => Ok(FailurePolicy::Propagate),
            "swallow" => Ok(FailurePolicy::Swallow),
            other => Err(TrackerError::ConfigError(format!("unknown failure policy: {}", other))),
        }
    }
}

/// Configuration for a [`Tracker`](crate::Tracker) session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackerConfig {
    /// Names added to the default reserved set
    pub reserved: Vec<String>,
    /// Trailing path components kept in origin strings
    pub origin_segments: usize,
    pub failure_policy: FailurePolicy,
    /// Severity of emitted trace lines
    pub severity: Severity,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            reserved: Vec::new(),
            origin_segments: DEFAULT_ORIGIN_SEGMENTS,
            failure_policy: FailurePolicy::Propagate,
            severity: Severity::Debug,
        }
    }
}

impl TrackerConfig {
    /// Defaults overridden by any `OBJECT_TRACKER_*` variables that are set
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Ok(reserved) = std::env::var(ENV_RESERVED) {
            config.reserved = reserved
                .split(',')
                .map(str::trim)
                .filter(|name| !name.is_empty())
                .map(String::from)
                .collect();
        }

        if let Ok(segments) = std::env::var(ENV_ORIGIN_SEGMENTS) {
            config.origin_segments = segments
                .trim()
                .parse()
                .ok()
                .filter(|n: &usize| *n > 0)
                .ok_or_else(|| {
                    TrackerError::ConfigError(format!(
                        "{} must be a positive integer, got {:?}",
                        ENV_ORIGIN_SEGMENTS, segments
                    ))
                })?;
        }

        if let Ok(policy) = std::env::var(ENV_FAILURE_POLICY) {
            config.failure_policy = policy.parse()?;
        }

        if let Ok(level) = std::env::var(ENV_LOG_LEVEL) {
            config.severity = level.parse()?;
        }

        Ok(config)
    }

    pub fn with_reserved<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.reserved.extend(names.into_iter().map(Into::into));
        self
    }

    pub fn with_failure_policy(mut self, policy: FailurePolicy) -> Self {
        self.failure_policy = policy;
        self
    }

    pub fn with_origin_segments(mut self, segments: usize) -> Self {
        self.origin_segments = segments;
        self
    }

    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }
}
