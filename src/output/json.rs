//! JSON serialization for benchmark results.

use serde::Serialize;

use crate::error::Result;

/// Serialize results (a single [`BenchResult`](crate::BenchResult) or a slice) to compact JSON.
///
/// # Errors
///
/// Returns [`Error::Json`](crate::Error::Json) if serialization fails.
pub fn to_json<T: Serialize + ?Sized>(results: &T) -> Result<String> {
    Ok(serde_json::to_string(results)?)
}

/// Serialize results to pretty-printed JSON.
///
/// # Errors
///
/// Returns [`Error::Json`](crate::Error::Json) if serialization fails.
pub fn to_json_pretty<T: Serialize + ?Sized>(results: &T) -> Result<String> {
    Ok(serde_json::to_string_pretty(results)?)
}
