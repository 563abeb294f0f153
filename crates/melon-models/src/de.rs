//! Lenient field decoders for backend payloads.
//!
//! The catalog backend is inconsistent about scalar types: ids arrive as
//! numbers or strings, and timestamps as numbers, numeric strings or `null`.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Decode a string-or-number into an owned string. `null` becomes empty.
pub(crate) fn string_lenient<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(opt_string_lenient(deserializer)?.unwrap_or_default())
}

/// Decode an optional string-or-number. Empty strings are kept as-is.
pub(crate) fn opt_string_lenient<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        Some(Value::Bool(b)) => Some(b.to_string()),
        _ => None,
    })
}

/// Decode an optional epoch-millisecond timestamp.
///
/// Anything that is not an integer (or an integer in a string) decodes to
/// `None` instead of failing the whole record.
pub(crate) fn opt_millis_lenient<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Number(n)) => n.as_i64(),
        Some(Value::String(s)) => s.trim().parse().ok(),
        _ => None,
    })
}

/// Decode an optional non-negative size, defaulting to zero.
pub(crate) fn size_lenient<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Number(n)) => n.as_u64().unwrap_or(0),
        Some(Value::String(s)) => s.trim().parse().unwrap_or(0),
        _ => 0,
    })
}
