//! Custom serde helpers for identifiers the API sends in varying shapes
//!
//! Wallet ids come back as JSON numbers from some endpoints and as strings
//! from others. They are kept as strings internally and written back as
//! numbers whenever they look numeric.

use serde::{Deserialize, Deserializer, Serializer, de};

/// Deserialize an identifier that can be:
/// - JSON integer: `12345`
/// - String: `"12345"`, `"a1b2"` (trimmed, must be non-empty)
pub fn deserialize_flexible_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum FlexibleId {
        Int(i64),
        String(String),
    }

    match FlexibleId::deserialize(deserializer)? {
        FlexibleId::Int(i) => Ok(i.to_string()),
        FlexibleId::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                Err(de::Error::custom("identifier must not be empty"))
            } else {
                Ok(trimmed.to_string())
            }
        }
    }
}

/// Serialize an identifier as a JSON integer when it parses as one
pub fn serialize_flexible_id<S>(id: &str, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match id.parse::<i64>() {
        Ok(numeric) => serializer.serialize_i64(numeric),
        Err(_) => serializer.serialize_str(id),
    }
}
