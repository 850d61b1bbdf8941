//! Permissive field deserializers.
//!
//! Statistics producers differ in which fields they populate and occasionally
//! emit a field with an unexpected type. Every helper here accepts any JSON
//! value and falls back to a default instead of failing the whole record.

use std::collections::BTreeMap;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use tracing::debug;

use super::snapshot::{NOT_ASSIGNED, UNSET_OFFSET};

/// Interpret a JSON value as an integer, accepting integral floats.
pub(crate) fn as_int(value: &Value) -> Option<i64> {
    value
        .as_i64()
        .or_else(|| value.as_u64().map(|v| v.min(i64::MAX as u64) as i64))
        .or_else(|| value.as_f64().filter(|f| f.is_finite()).map(|f| f as i64))
}

pub(crate) fn int<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(as_int(&value))
}

pub(crate) fn counter<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(int(deserializer)?.unwrap_or(0))
}

pub(crate) fn int_or_not_assigned<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(int(deserializer)?.unwrap_or(NOT_ASSIGNED))
}

pub(crate) fn int_or_unset<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(int(deserializer)?.unwrap_or(UNSET_OFFSET))
}

pub(crate) fn string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::String(s) => Some(s),
        _ => None,
    })
}

/// Extract `avg` from a rolling window object such as `"rtt": {"avg": 1200}`.
pub(crate) fn window_avg<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(value.get("avg").and_then(as_int))
}

/// Deserialize an object of entries, dropping entries that do not convert.
pub(crate) fn map<'de, D, T>(deserializer: D) -> Result<BTreeMap<String, T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let Value::Object(entries) = Value::deserialize(deserializer)? else {
        return Ok(BTreeMap::new());
    };

    Ok(entries
        .into_iter()
        .filter_map(|(key, value)| match serde_json::from_value::<T>(value) {
            Ok(entry) => Some((key, entry)),
            Err(e) => {
                debug!(key = %key, error = %e, "skipping malformed entry");
                None
            }
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn as_int_accepts_integral_numbers_only() {
        assert_eq!(as_int(&json!(42)), Some(42));
        assert_eq!(as_int(&json!(-1001)), Some(-1001));
        assert_eq!(as_int(&json!(12.0)), Some(12));
        assert_eq!(as_int(&json!("12")), None);
        assert_eq!(as_int(&json!(null)), None);
        assert_eq!(as_int(&json!({"avg": 1})), None);
    }
}
