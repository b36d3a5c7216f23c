//! Person service layer.
//!
//! Business logic for creating, renaming and deleting phonebook records.

use crate::domain::{validate_name_part, ValidationError, NAME_FORMAT_MESSAGE};
use crate::error::PhonebookError;
use crate::models::Person;
use crate::phonebook::Phonebook;
use crate::services::outcome::{Action, ActionReport, Outcome};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::warn;

/// Person service trait for business operations.
#[async_trait]
pub trait PersonService: Send + Sync {
    /// All persons ordered by ID.
    async fn list_persons(&self) -> Vec<Person>;

    /// Get one person by ID.
    async fn get_person(&self, person_id: &str) -> Option<Person>;

    /// Create a person with no phones.
    async fn add_person(&self, name: &str, surname: &str, middlename: Option<&str>)
        -> ActionReport;

    /// Replace a person's name parts.
    async fn edit_person(
        &self,
        person_id: &str,
        name: &str,
        surname: &str,
        middlename: Option<&str>,
    ) -> ActionReport;

    /// Delete a person and their phones.
    async fn delete_person(&self, person_id: &str) -> ActionReport;
}

/// Default implementation of PersonService.
pub struct PersonServiceImpl {
    phonebook: Arc<Phonebook>,
}

/// Validation helper functions.
impl PersonServiceImpl {
    /// Validate name parts; middlename may be empty.
    fn validate_names(
        name: &str,
        surname: &str,
        middlename: &str,
    ) -> Result<(), ValidationError> {
        for (field, value, allow_empty) in [
            ("name", name, false),
            ("surname", surname, false),
            ("middlename", middlename, true),
        ] {
            if !validate_name_part(value, allow_empty) {
                return Err(ValidationError::InvalidName {
                    field,
                    value: value.to_string(),
                });
            }
        }
        Ok(())
    }
}

impl PersonServiceImpl {
    /// Create a new person service.
    pub fn new(phonebook: Arc<Phonebook>) -> Self {
        Self { phonebook }
    }

    fn rejected(&self, action: Action, err: ValidationError) -> ActionReport {
        warn!("Rejected person for {:?}: {}", action, err);
        self.phonebook.metrics().record_validation_rejection();
        ActionReport::new(action, Outcome::validation_failed(NAME_FORMAT_MESSAGE))
    }
}

#[async_trait]
impl PersonService for PersonServiceImpl {
    async fn list_persons(&self) -> Vec<Person> {
        self.phonebook.list_persons().await
    }

    async fn get_person(&self, person_id: &str) -> Option<Person> {
        if person_id.trim().is_empty() {
            return None;
        }
        self.phonebook.get_person(Some(person_id)).await
    }

    async fn add_person(
        &self,
        name: &str,
        surname: &str,
        middlename: Option<&str>,
    ) -> ActionReport {
        let middlename = middlename.unwrap_or_default();
        if let Err(e) = Self::validate_names(name, surname, middlename) {
            return self.rejected(Action::Add, e);
        }

        let outcome = match self
            .phonebook
            .add_person(name.trim(), surname.trim(), middlename.trim())
            .await
        {
            Ok(person) => Outcome::success(None, Some(person)),
            Err(e) => e.into(),
        };
        ActionReport::new(Action::Add, outcome)
    }

    async fn edit_person(
        &self,
        person_id: &str,
        name: &str,
        surname: &str,
        middlename: Option<&str>,
    ) -> ActionReport {
        let middlename = middlename.unwrap_or_default();
        if let Err(e) = Self::validate_names(name, surname, middlename) {
            return self.rejected(Action::Edit, e);
        }

        let Some(mut person) = self.get_person(person_id).await else {
            return ActionReport::new(Action::Edit, Outcome::NotFound);
        };
        person.name = name.trim().to_string();
        person.surname = surname.trim().to_string();
        person.middlename = middlename.trim().to_string();

        let outcome = match self.phonebook.update_person(&mut person).await {
            Ok(()) => Outcome::success(None, Some(person)),
            Err(e) => e.into(),
        };
        ActionReport::new(Action::Edit, outcome)
    }

    async fn delete_person(&self, person_id: &str) -> ActionReport {
        let outcome = match self.phonebook.delete_person(person_id).await {
            Ok(_) => Outcome::success(None, None),
            Err(e) if e.is_not_found() => Outcome::NotFound,
            Err(PhonebookError::InvalidInput(_)) => Outcome::NotFound,
            Err(e) => e.into(),
        };
        ActionReport::new(Action::Delete, outcome)
    }
}
