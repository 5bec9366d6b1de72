//! Helpers for decoding positional JSON arguments inside `Trackable::invoke`.

use crate::error::{Result, TrackerError};
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Decode the required argument at `index`
pub fn arg<T: DeserializeOwned>(args: &[Value], index: usize) -> Result<T> {
    let value = args
        .get(index)
        .ok_or_else(|| TrackerError::InvalidArguments(format!("missing argument {}", index)))?;

    serde_json::from_value(value.clone())
        .map_err(|e| TrackerError::InvalidArguments(format!("argument {}: {}", index, e)))
}

/// Decode the argument at `index`, treating a missing or `null` value as `None`
pub fn optional_arg<T: DeserializeOwned>(args: &[Value], index: usize) -> Result<Option<T>> {
    match args.get(index) {
        None | Some(Value::Null) => Ok(None),
        Some(_) => arg(args, index).map(Some),
    }
}
