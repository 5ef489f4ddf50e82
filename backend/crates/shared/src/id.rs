//! Common ID Types
//!
//! Type-safe ID wrappers for locally owned records.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::convert::Infallible;
use std::fmt;
use std::marker::PhantomData;
use std::str::FromStr;
use uuid::Uuid;

/// Generic typed ID wrapper
///
/// The value is an opaque string. New ids are UUID v4 strings, but any
/// string already persisted (or sent by a client) is accepted as-is.
///
/// Usage:
/// ```
/// use kernel::id::{Id, markers};
/// type RecordId = Id<markers::HistoryRecord>;
/// let id = RecordId::new();
/// assert_eq!(id.to_string().parse::<RecordId>().unwrap(), id);
/// ```
pub struct Id<T> {
    value: String,
    _marker: PhantomData<T>,
}

impl<T> Id<T> {
    /// Create a new random ID (UUID v4 string)
    pub fn new() -> Self {
        Self::from_string(Uuid::new_v4().to_string())
    }

    pub fn from_string(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            _marker: PhantomData,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.value
    }

    pub fn into_string(self) -> String {
        self.value
    }
}

impl<T> Default for Id<T> {
    fn default() -> Self {
        Self::new()
    }
}

// Manual impls so the marker type needs no bounds
impl<T> Clone for Id<T> {
    fn clone(&self) -> Self {
        Self::from_string(self.value.clone())
    }
}

impl<T> PartialEq for Id<T> {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}

impl<T> Eq for Id<T> {}

impl<T> std::hash::Hash for Id<T> {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.value.hash(state);
    }
}

impl<T> fmt::Debug for Id<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Id({})", self.value)
    }
}

impl<T> fmt::Display for Id<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.value)
    }
}

impl<T> FromStr for Id<T> {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from_string(s))
    }
}

impl<T> From<String> for Id<T> {
    fn from(value: String) -> Self {
        Self::from_string(value)
    }
}

impl<T> From<&str> for Id<T> {
    fn from(value: &str) -> Self {
        Self::from_string(value)
    }
}

impl<T> Serialize for Id<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.value)
    }
}

impl<'de, T> Deserialize<'de> for Id<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        String::deserialize(deserializer).map(Self::from_string)
    }
}

/// Marker types for different record IDs
pub mod markers {
    /// Marker for history record IDs
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct HistoryRecord;
}

pub type HistoryRecordId = Id<markers::HistoryRecord>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_unique() {
        let a = HistoryRecordId::new();
        let b = HistoryRecordId::new();
        assert_ne!(a, b);
    }

    #[test]
    fn test_new_ids_are_uuids() {
        let id = HistoryRecordId::new();
        assert!(Uuid::parse_str(id.as_str()).is_ok());
    }

    #[test]
    fn test_id_serializes_as_plain_string() {
        let id = HistoryRecordId::new();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"{}\"", id));

        let back: HistoryRecordId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }

    #[test]
    fn test_any_string_is_accepted() {
        let id = "history_1700000000000_abc123xyz".parse::<HistoryRecordId>().unwrap();
        assert_eq!(id.as_str(), "history_1700000000000_abc123xyz");

        let id: HistoryRecordId = serde_json::from_str("\"legacy\"").unwrap();
        assert_eq!(id, HistoryRecordId::from("legacy"));

        assert!(serde_json::from_str::<HistoryRecordId>("3").is_err());
    }
}
