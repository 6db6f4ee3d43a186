//! Strongly-typed identifier value objects.

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use super::ValidationError;

/// Identifier of a persisted draft or template.
///
/// The store assigns ids and the core treats them as opaque strings
/// (numeric ids such as `"42"` are as valid as UUIDs). An id is used as a
/// single URL path segment, so it may not be blank or contain `/`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(into = "String")]
pub struct DocumentId(String);

impl DocumentId {
    /// Creates a new random DocumentId.
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Parses a store-assigned identifier.
    pub fn parse(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into();
        if value.trim().is_empty() {
            return Err(ValidationError::empty_field("document_id"));
        }
        if value.contains('/') {
            return Err(ValidationError::invalid_format(
                "document_id",
                "must not contain '/'",
            ));
        }
        Ok(Self(value))
    }

    /// Returns the raw identifier.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for DocumentId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for DocumentId {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for DocumentId {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

/// Stores may hand out numeric ids; both `"42"` and `42` are accepted.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Text(String),
    Number(u64),
}

impl<'de> Deserialize<'de> for DocumentId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = match RawId::deserialize(deserializer)? {
            RawId::Text(s) => s,
            RawId::Number(n) => n.to_string(),
        };
        DocumentId::parse(raw).map_err(serde::de::Error::custom)
    }
}

impl From<DocumentId> for String {
    fn from(id: DocumentId) -> Self {
        id.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_ids_are_unique() {
        assert_ne!(DocumentId::new(), DocumentId::new());
    }

    #[test]
    fn parse_accepts_numeric_ids() {
        let id: DocumentId = "42".parse().unwrap();
        assert_eq!(id.as_str(), "42");
        assert_eq!(id.to_string(), "42");
    }

    #[test]
    fn parse_rejects_blank_ids() {
        assert!(DocumentId::parse("  ").is_err());
    }

    #[test]
    fn parse_rejects_path_separators() {
        assert!(DocumentId::parse("a/b").is_err());
    }

    #[test]
    fn serializes_as_plain_string() {
        let id = DocumentId::parse("abc").unwrap();
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"abc\"");
    }

    #[test]
    fn deserialization_validates() {
        assert!(serde_json::from_str::<DocumentId>("\"\"").is_err());
        let id: DocumentId = serde_json::from_str("\"7\"").unwrap();
        assert_eq!(id.as_str(), "7");
    }

    #[test]
    fn deserializes_numeric_ids() {
        let id: DocumentId = serde_json::from_str("42").unwrap();
        assert_eq!(id.as_str(), "42");
    }
}
