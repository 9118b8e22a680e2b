//! Lenient deserializers for the API's loosely-typed scalar fields.

use serde::{Deserialize, Deserializer, de::Error as _};
use serde_json::Value;

use crate::FeatureId;

/// Deserializes a required record id from a JSON string or number.
///
/// # Errors
///
/// Fails when the value is null, empty, or not a string/number.
pub fn id<'de, D>(deserializer: D) -> Result<FeatureId, D::Error>
where
    D: Deserializer<'de>,
{
    code(deserializer)?
        .map(FeatureId::from)
        .ok_or_else(|| D::Error::custom("record id (gid) is missing or empty"))
}

/// Deserializes an optional code (ward/zone number) from a JSON string or
/// number. Blank strings become `None`.
///
/// # Errors
///
/// Fails when the value is neither null, a string, nor a number.
pub fn code<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => {
            let trimmed = s.trim();
            Ok((!trimmed.is_empty()).then(|| trimmed.to_string()))
        }
        Some(Value::Number(n)) => Ok(Some(n.to_string())),
        Some(other) => Err(D::Error::custom(format!(
            "expected string or number, found {other}"
        ))),
    }
}

/// Deserializes an optional float from a JSON number or numeric string.
/// Unparseable strings become `None`.
///
/// # Errors
///
/// Fails when the value is neither null, a string, nor a number.
pub fn number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) => Ok(n.as_f64()),
        Some(Value::String(s)) => Ok(s.trim().parse::<f64>().ok().filter(|v| v.is_finite())),
        Some(other) => Err(D::Error::custom(format!(
            "expected number or numeric string, found {other}"
        ))),
    }
}
