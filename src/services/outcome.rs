//! Outcomes of phonebook actions.

use crate::domain::PhoneId;
use crate::error::PhonebookError;
use crate::models::Person;
use serde::Serialize;

/// The action a report describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    Add,
    Edit,
    Delete,
}

/// Result of one add/edit/delete request on a phone or a person.
///
/// The variants keep "input rejected", "record missing" and "storage failed"
/// apart so the caller can word its message precisely.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Outcome {
    /// The change was committed.
    Success {
        /// The phone the action addressed, if it was about a phone.
        #[serde(skip_serializing_if = "Option::is_none")]
        phone_id: Option<PhoneId>,
        /// The committed state of the person, absent after a person deletion.
        #[serde(skip_serializing_if = "Option::is_none")]
        person: Option<Person>,
    },

    /// Input failed validation; nothing was attempted.
    ValidationFailed { message: String },

    /// The person or phone does not exist.
    NotFound,

    /// Storage rejected the write; nothing was applied.
    PersistenceFailed { reason: String },
}

impl Outcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    pub(crate) fn success(phone_id: Option<PhoneId>, person: Option<Person>) -> Self {
        Self::Success { phone_id, person }
    }

    pub(crate) fn validation_failed(message: impl Into<String>) -> Self {
        Self::ValidationFailed {
            message: message.into(),
        }
    }
}

impl From<PhonebookError> for Outcome {
    fn from(err: PhonebookError) -> Self {
        match err {
            PhonebookError::PersonNotFound(_) | PhonebookError::PhoneNotFound { .. } => {
                Self::NotFound
            }
            PhonebookError::InvalidInput(message) => Self::ValidationFailed { message },
            PhonebookError::Storage(e) | PhonebookError::Initialization(e) => {
                Self::PersistenceFailed {
                    reason: e.to_string(),
                }
            }
        }
    }
}

/// An outcome together with its result code and label for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActionReport {
    pub action: Action,
    pub code: &'static str,
    pub label: &'static str,
    #[serde(flatten)]
    pub outcome: Outcome,
}

impl ActionReport {
    pub fn new(action: Action, outcome: Outcome) -> Self {
        let (code, label) = match (&outcome, action) {
            (Outcome::ValidationFailed { .. }, _) => {
                ("VALIDATION_FAILURE", "Input data is invalid")
            }
            (Outcome::Success { .. }, Action::Delete) => {
                ("DELETION_SUCCESS", "Deletion completed successfully")
            }
            (_, Action::Delete) => (
                "DELETION_FAILURE",
                "Deletion failed (the record may not exist)",
            ),
            (Outcome::Success { .. }, _) => ("UPDATE_SUCCESS", "Update completed successfully"),
            (_, _) => ("UPDATE_FAILURE", "Update failed"),
        };

        Self {
            action,
            code,
            label,
            outcome,
        }
    }

    pub fn is_success(&self) -> bool {
        self.outcome.is_success()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::PersonId;
    use crate::error::StorageError;

    #[test]
    fn test_report_codes() {
        let ok = Outcome::success(None, None);
        assert_eq!(ActionReport::new(Action::Add, ok.clone()).code, "UPDATE_SUCCESS");
        assert_eq!(ActionReport::new(Action::Edit, ok.clone()).code, "UPDATE_SUCCESS");
        assert_eq!(ActionReport::new(Action::Delete, ok).code, "DELETION_SUCCESS");

        assert_eq!(
            ActionReport::new(Action::Delete, Outcome::NotFound).code,
            "DELETION_FAILURE"
        );
        assert_eq!(
            ActionReport::new(Action::Edit, Outcome::NotFound).code,
            "UPDATE_FAILURE"
        );
        assert_eq!(
            ActionReport::new(Action::Add, Outcome::validation_failed("bad")).code,
            "VALIDATION_FAILURE"
        );
    }

    #[test]
    fn test_outcome_from_phonebook_error() {
        let err = PhonebookError::PersonNotFound(PersonId::new("1").unwrap());
        assert_eq!(Outcome::from(err), Outcome::NotFound);

        let err = PhonebookError::Storage(StorageError::Unavailable("down".to_string()));
        assert!(matches!(
            Outcome::from(err),
            Outcome::PersistenceFailed { .. }
        ));
    }

    #[test]
    fn test_report_serialization() {
        let report = ActionReport::new(
            Action::Add,
            Outcome::validation_failed("Phone number is invalid"),
        );
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["action"], "add");
        assert_eq!(json["code"], "VALIDATION_FAILURE");
        assert_eq!(json["status"], "validation_failed");
        assert_eq!(json["message"], "Phone number is invalid");
    }
}
