//! Tolerant deserializers for collaborator payloads.
//!
//! Optional fields that are absent, `null`, or carry a value of the wrong JSON
//! type all collapse to `None`. A `null` sequence becomes empty.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};

/// Deserialize an optional field, mapping malformed values to `None`
pub fn optional<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| serde_json::from_value(v).ok()))
}

/// Deserialize a sequence, mapping `null` to an empty vector
pub fn sequence<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}
