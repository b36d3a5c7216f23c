//! Phone service layer.
//!
//! Validates phone input before it reaches the phonebook and reports every
//! request as an [`ActionReport`].

use crate::domain::{PhoneId, PhoneNumber, PHONE_FORMAT_MESSAGE};
use crate::models::Person;
use crate::phonebook::Phonebook;
use crate::services::outcome::{Action, ActionReport, Outcome};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{info, warn};

/// Phone service trait for business operations.
#[async_trait]
pub trait PhoneService: Send + Sync {
    /// Resolve a person; an absent ID gives an unsaved person for the add flow.
    async fn get_person(&self, person_id: Option<&str>) -> Option<Person>;

    /// Validate `number` and add it to the person (creating them if unsaved).
    async fn add_number(&self, person_id: Option<&str>, number: Option<&str>) -> ActionReport;

    /// Validate `number` and store it under an existing phone ID.
    async fn edit_number(
        &self,
        person_id: &str,
        phone_id: &str,
        number: Option<&str>,
    ) -> ActionReport;

    /// Remove one phone.
    async fn delete_number(&self, person_id: &str, phone_id: &str) -> ActionReport;
}

/// Default implementation of PhoneService.
pub struct PhoneServiceImpl {
    phonebook: Arc<Phonebook>,
}

impl PhoneServiceImpl {
    /// Create a new phone service.
    pub fn new(phonebook: Arc<Phonebook>) -> Self {
        Self { phonebook }
    }

    /// The number if it passes validation; otherwise the rejection report.
    fn validated(
        &self,
        action: Action,
        number: Option<&str>,
    ) -> Result<PhoneNumber, ActionReport> {
        PhoneNumber::from_opt(number).map_err(|e| {
            warn!("Rejected phone number for {:?}: {}", action, e);
            self.phonebook.metrics().record_validation_rejection();
            ActionReport::new(action, Outcome::validation_failed(PHONE_FORMAT_MESSAGE))
        })
    }

    async fn resolve(
        &self,
        action: Action,
        person_id: Option<&str>,
    ) -> Result<Person, ActionReport> {
        self.phonebook.get_person(person_id).await.ok_or_else(|| {
            warn!("Person {:?} not found for {:?}", person_id, action);
            ActionReport::new(action, Outcome::NotFound)
        })
    }
}

#[async_trait]
impl PhoneService for PhoneServiceImpl {
    async fn get_person(&self, person_id: Option<&str>) -> Option<Person> {
        self.phonebook.get_person(person_id).await
    }

    async fn add_number(&self, person_id: Option<&str>, number: Option<&str>) -> ActionReport {
        let action = Action::Add;
        let number = match self.validated(action, number) {
            Ok(number) => number,
            Err(report) => return report,
        };
        let mut person = match self.resolve(action, person_id).await {
            Ok(person) => person,
            Err(report) => return report,
        };

        let outcome = match self.phonebook.add_number(&mut person, number.as_str()).await {
            Ok(phone_id) => {
                info!("Phone {} added", phone_id);
                Outcome::success(Some(phone_id), Some(person))
            }
            Err(e) => {
                warn!("Adding phone failed: {}", e);
                e.into()
            }
        };
        ActionReport::new(action, outcome)
    }

    async fn edit_number(
        &self,
        person_id: &str,
        phone_id: &str,
        number: Option<&str>,
    ) -> ActionReport {
        let action = Action::Edit;
        let number = match self.validated(action, number) {
            Ok(number) => number,
            Err(report) => return report,
        };
        let mut person = match self.resolve(action, Some(person_id)).await {
            Ok(person) => person,
            Err(report) => return report,
        };

        let outcome = match self
            .phonebook
            .update_number(&mut person, phone_id, number.as_str())
            .await
        {
            Ok(()) => Outcome::success(PhoneId::new(phone_id).ok(), Some(person)),
            Err(e) => {
                warn!("Editing phone {} failed: {}", phone_id, e);
                e.into()
            }
        };
        ActionReport::new(action, outcome)
    }

    async fn delete_number(&self, person_id: &str, phone_id: &str) -> ActionReport {
        let action = Action::Delete;
        let mut person = match self.resolve(action, Some(person_id)).await {
            Ok(person) => person,
            Err(report) => return report,
        };

        let outcome = match self.phonebook.delete_number(&mut person, phone_id).await {
            Ok(()) => Outcome::success(None, Some(person)),
            Err(e) => {
                warn!("Deleting phone {} failed: {}", phone_id, e);
                e.into()
            }
        };
        ActionReport::new(action, outcome)
    }
}
