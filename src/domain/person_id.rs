//! PersonId value object.

use super::errors::ValidationError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// A type-safe wrapper for person IDs.
///
/// Person IDs are assigned by the phonebook when a record is first persisted
/// and never change afterwards. Surrounding whitespace is trimmed and a blank
/// ID is rejected.
///
/// # Example
///
/// ```
/// use phonebook_mcp_server::domain::PersonId;
///
/// let id = PersonId::new("42").unwrap();
/// assert_eq!(id.as_str(), "42");
/// assert_eq!(id.numeric(), Some(42));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PersonId(String);

impl PersonId {
    /// Create a new PersonId, validating that it's not blank.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::EmptyId` if the provided ID is empty or whitespace.
    pub fn new(id: impl Into<String>) -> Result<Self, ValidationError> {
        let id = id.into();
        let trimmed = id.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::EmptyId);
        }
        if trimmed.len() == id.len() {
            Ok(Self(id))
        } else {
            Ok(Self(trimmed.to_string()))
        }
    }

    /// Build a PersonId from a numeric sequence value.
    pub fn from_sequence(value: u64) -> Self {
        Self(value.to_string())
    }

    /// Get the ID as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The numeric value of the ID, if it is one.
    pub fn numeric(&self) -> Option<u64> {
        self.0.parse().ok()
    }
}

// Serde support - serialize as string
impl Serialize for PersonId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.0.serialize(serializer)
    }
}

// Serde support - deserialize from string with validation
impl<'de> Deserialize<'de> for PersonId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        PersonId::new(s).map_err(serde::de::Error::custom)
    }
}

impl fmt::Display for PersonId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
