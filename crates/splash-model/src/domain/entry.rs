use serde::{Deserialize, Serialize};

use crate::{ModelError, ModelResult};

/// A `key value;` pair read from a properties dictionary.
///
/// The value is the raw token between the key and the terminating `;`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigEntry {
    key: String,
    value: String,
}

impl ConfigEntry {
    /// Create an entry, rejecting values that could not be written back as a single token.
    pub fn new<K, V>(key: K, value: V) -> ModelResult<Self>
    where
        K: Into<String>,
        V: Into<String>,
    {
        let key = key.into();
        let value = value.into();
        Self::validate_value(&key, &value)?;
        Ok(Self { key, value })
    }

    /// Check that `value` is a single non-empty token without whitespace or `;`.
    pub fn validate_value(key: &str, value: &str) -> ModelResult<()> {
        if value.is_empty() || value.chars().any(|c| c.is_whitespace() || c == ';') {
            return Err(ModelError::InvalidValue {
                key: key.to_string(),
                value: value.to_string(),
            });
        }
        Ok(())
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn value(&self) -> &str {
        &self.value
    }
}
