use crate::domain::{PersonId, PhoneId};
use crate::error::StorageResult;
use crate::models::Person;
use async_trait::async_trait;

/// Durable storage behind the phonebook.
///
/// The phonebook is the only writer. Each write either commits completely
/// or reports an error and leaves storage unchanged. Writes that address an
/// existing row fail with `StorageError::RowMissing` when the row is absent.
#[async_trait]
pub trait PhonebookRepository: Send + Sync {
    /// Materialize every stored person together with their phones.
    async fn load_all(&self) -> StorageResult<Vec<Person>>;

    /// Store a new person and all of their phones in one transaction.
    async fn insert_person(&self, person: &Person) -> StorageResult<()>;

    /// Update the name parts of an existing person.
    async fn update_person(&self, person: &Person) -> StorageResult<()>;

    /// Delete a person and all of their phones in one transaction.
    async fn delete_person(&self, person_id: &PersonId) -> StorageResult<()>;

    /// Add one phone to an existing person.
    async fn insert_phone(
        &self,
        person_id: &PersonId,
        phone_id: &PhoneId,
        number: &str,
    ) -> StorageResult<()>;

    /// Overwrite the number stored under an existing phone ID.
    async fn update_phone(
        &self,
        person_id: &PersonId,
        phone_id: &PhoneId,
        number: &str,
    ) -> StorageResult<()>;

    /// Remove one phone.
    async fn delete_phone(&self, person_id: &PersonId, phone_id: &PhoneId) -> StorageResult<()>;
}
