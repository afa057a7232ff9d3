//! Canonical textual encoding for saved values.
//!
//! The same JSON text is written to the store and compared for change
//! detection, so two values are "equal" here iff they serialize identically.
//! Values pass through `serde_json::Value` first: its object map is ordered
//! by key, so hash maps encode the same regardless of iteration order.

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::AutosaveError;

/// Encode `value` as compact JSON with object keys sorted.
///
/// # Errors
///
/// Returns [`AutosaveError::Serialization`] when `value` cannot be serialized
/// (for example a map with non-string keys).
pub fn encode<T: Serialize>(value: &T) -> Result<String, AutosaveError> {
    let tree = serde_json::to_value(value)?;
    Ok(serde_json::to_string(&tree)?)
}

/// Decode JSON text produced by [`encode`].
///
/// # Errors
///
/// Returns [`AutosaveError::Serialization`] when `raw` is malformed or does
/// not match the shape of `T`.
pub fn decode<T: DeserializeOwned>(raw: &str) -> Result<T, AutosaveError> {
    Ok(serde_json::from_str(raw)?)
}

#[cfg(test)]
#[path = "codec_test.rs"]
mod tests;
