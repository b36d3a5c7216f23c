//! Error types for the Phonebook MCP Server.
//!
//! This module defines custom error types using `thiserror` for precise error handling.

use crate::domain::{PersonId, PhoneId};
use thiserror::Error;

/// Errors that can occur when talking to the storage provider.
#[derive(Error, Debug)]
pub enum StorageError {
    /// Database error from SQLite
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// I/O error while preparing the database location
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A write that must touch an existing row found none
    #[error("row missing: {0}")]
    RowMissing(String),

    /// A stored or submitted record cannot be represented
    #[error("invalid record: {0}")]
    InvalidRecord(String),

    /// The provider could not be reached or its worker failed
    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

/// Errors reported by the phonebook core.
#[derive(Error, Debug)]
pub enum PhonebookError {
    /// The persisted phonebook could not be materialized at construction
    #[error("phonebook initialization failed: {0}")]
    Initialization(#[source] StorageError),

    /// No person with this ID exists
    #[error("person not found: {0}")]
    PersonNotFound(PersonId),

    /// The person has no phone with this ID
    #[error("phone {phone_id} not found for person {person_id}")]
    PhoneNotFound { person_id: String, phone_id: String },

    /// A write to the storage provider failed; nothing was applied
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    /// Input the core refuses to accept (e.g. a blank identifier)
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

impl PhonebookError {
    pub(crate) fn phone_not_found(person_id: Option<&PersonId>, phone_id: &str) -> Self {
        Self::PhoneNotFound {
            person_id: person_id.map(|id| id.to_string()).unwrap_or_default(),
            phone_id: phone_id.to_string(),
        }
    }

    /// Whether the error means the addressed record does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::PersonNotFound(_) | Self::PhoneNotFound { .. })
    }
}

impl From<(&PersonId, &PhoneId)> for PhonebookError {
    fn from((person_id, phone_id): (&PersonId, &PhoneId)) -> Self {
        Self::PhoneNotFound {
            person_id: person_id.to_string(),
            phone_id: phone_id.to_string(),
        }
    }
}

/// Errors that can occur during configuration loading.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Environment variable has invalid value
    #[error("Invalid value for {var}: {reason}")]
    InvalidValue { var: String, reason: String },
}

/// Convenience type alias for Results with StorageError
pub type StorageResult<T> = Result<T, StorageError>;

/// Convenience type alias for Results with PhonebookError
pub type PhonebookResult<T> = Result<T, PhonebookError>;

/// Convenience type alias for Results with ConfigError
pub type ConfigResult<T> = Result<T, ConfigError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = StorageError::RowMissing("phone 1/2".to_string());
        assert_eq!(err.to_string(), "row missing: phone 1/2");

        let err = PhonebookError::PersonNotFound(PersonId::new("9").unwrap());
        assert_eq!(err.to_string(), "person not found: 9");

        let err = ConfigError::InvalidValue {
            var: "STORAGE_BUSY_TIMEOUT_MS".to_string(),
            reason: "Must be greater than zero".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Invalid value for STORAGE_BUSY_TIMEOUT_MS: Must be greater than zero"
        );
    }

    #[test]
    fn test_phone_not_found_variants() {
        let person = PersonId::new("3").unwrap();
        let phone = PhoneId::new("8").unwrap();
        let err = PhonebookError::from((&person, &phone));
        assert!(err.is_not_found());
        assert_eq!(err.to_string(), "phone 8 not found for person 3");

        let err = PhonebookError::phone_not_found(None, "1");
        assert!(err.to_string().contains("phone 1 not found"));
    }

    #[test]
    fn test_storage_error_wraps_into_phonebook_error() {
        let err: PhonebookError = StorageError::Unavailable("closed".to_string()).into();
        assert!(!err.is_not_found());
        assert_eq!(err.to_string(), "storage error: storage unavailable: closed");
    }
}
