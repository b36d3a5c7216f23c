use async_trait::async_trait;
use phonebook_mcp_server::domain::{PersonId, PhoneId};
use phonebook_mcp_server::error::{StorageError, StorageResult};
use phonebook_mcp_server::models::Person;
use phonebook_mcp_server::repositories::PhonebookRepository;
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Debug, Clone, Default)]
struct StoredPerson {
    name: String,
    surname: String,
    middlename: String,
    phones: BTreeMap<PhoneId, String>,
}

/// Mock phonebook repository for testing.
///
/// Keeps rows in memory, tracks method calls for verification and can be
/// switched to fail every write (or the initial load) on demand. Writes can
/// also be slowed down to hold them in flight.
#[allow(dead_code)]
#[derive(Clone, Default)]
pub struct MockPhonebookRepository {
    persons: Arc<Mutex<HashMap<PersonId, StoredPerson>>>,
    call_counts: Arc<Mutex<HashMap<String, usize>>>,
    fail_writes: Arc<AtomicBool>,
    fail_load: Arc<AtomicBool>,
    write_delay_ms: Arc<AtomicU64>,
}

#[allow(dead_code)]
impl MockPhonebookRepository {
    /// Create a new empty MockPhonebookRepository.
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a stored person, as if written by an earlier run.
    pub fn add_person(&self, person: &Person) {
        let Some(id) = person.id().cloned() else {
            return;
        };
        let mut persons = self.persons.lock().unwrap();
        persons.insert(id, Self::to_stored(person));
    }

    /// Make every following write fail (or succeed again).
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Make `load_all` fail.
    pub fn set_fail_load(&self, fail: bool) {
        self.fail_load.store(fail, Ordering::SeqCst);
    }

    /// Delay every following write by `delay` before it takes effect.
    pub fn set_write_delay(&self, delay: Duration) {
        self.write_delay_ms.store(delay.as_millis() as u64, Ordering::SeqCst);
    }

    /// Get the number of times a method was called.
    pub fn get_call_count(&self, method: &str) -> usize {
        let counts = self.call_counts.lock().unwrap();
        *counts.get(method).unwrap_or(&0)
    }

    /// Reset all call counts.
    pub fn reset_call_counts(&self) {
        let mut counts = self.call_counts.lock().unwrap();
        counts.clear();
    }

    /// The stored number, bypassing the phonebook.
    pub fn stored_number(&self, person_id: &str, phone_id: &str) -> Option<String> {
        let persons = self.persons.lock().unwrap();
        let person = persons.get(&PersonId::new(person_id).ok()?)?;
        person.phones.get(&PhoneId::new(phone_id).ok()?).cloned()
    }

    /// Number of stored phones for a person.
    pub fn stored_phone_count(&self, person_id: &str) -> usize {
        let persons = self.persons.lock().unwrap();
        PersonId::new(person_id)
            .ok()
            .and_then(|id| persons.get(&id).map(|p| p.phones.len()))
            .unwrap_or(0)
    }

    /// Number of stored persons.
    pub fn stored_person_count(&self) -> usize {
        self.persons.lock().unwrap().len()
    }

    fn track_call(&self, method: &str) {
        let mut counts = self.call_counts.lock().unwrap();
        *counts.entry(method.to_string()).or_insert(0) += 1;
    }

    async fn before_write(&self) -> StorageResult<()> {
        let delay_ms = self.write_delay_ms.load(Ordering::SeqCst);
        if delay_ms > 0 {
            tokio::time::sleep(Duration::from_millis(delay_ms)).await;
        }

        if self.fail_writes.load(Ordering::SeqCst) {
            Err(StorageError::Unavailable("injected write failure".to_string()))
        } else {
            Ok(())
        }
    }

    fn to_stored(person: &Person) -> StoredPerson {
        StoredPerson {
            name: person.name.clone(),
            surname: person.surname.clone(),
            middlename: person.middlename.clone(),
            phones: person
                .phones()
                .iter()
                .map(|(id, number)| (id.clone(), number.clone()))
                .collect(),
        }
    }
}

#[async_trait]
impl PhonebookRepository for MockPhonebookRepository {
    async fn load_all(&self) -> StorageResult<Vec<Person>> {
        self.track_call("load_all");

        if self.fail_load.load(Ordering::SeqCst) {
            return Err(StorageError::Unavailable("injected load failure".to_string()));
        }

        let persons = self.persons.lock().unwrap();
        Ok(persons
            .iter()
            .map(|(id, stored)| {
                stored.phones.iter().fold(
                    Person::new(
                        id.clone(),
                        stored.name.clone(),
                        stored.surname.clone(),
                        stored.middlename.clone(),
                    ),
                    |person, (phone_id, number)| person.with_phone(phone_id.clone(), number.clone()),
                )
            })
            .collect())
    }

    async fn insert_person(&self, person: &Person) -> StorageResult<()> {
        self.track_call("insert_person");
        self.before_write().await?;

        let id = person
            .id()
            .cloned()
            .ok_or_else(|| StorageError::InvalidRecord("person has no ID".to_string()))?;
        let mut persons = self.persons.lock().unwrap();
        if persons.contains_key(&id) {
            return Err(StorageError::InvalidRecord(format!(
                "person {} already exists",
                id
            )));
        }
        persons.insert(id, Self::to_stored(person));
        Ok(())
    }

    async fn update_person(&self, person: &Person) -> StorageResult<()> {
        self.track_call("update_person");
        self.before_write().await?;

        let id = person
            .id()
            .ok_or_else(|| StorageError::InvalidRecord("person has no ID".to_string()))?;
        let mut persons = self.persons.lock().unwrap();
        let stored = persons
            .get_mut(id)
            .ok_or_else(|| StorageError::RowMissing(format!("person {}", id)))?;
        stored.name = person.name.clone();
        stored.surname = person.surname.clone();
        stored.middlename = person.middlename.clone();
        Ok(())
    }

    async fn delete_person(&self, person_id: &PersonId) -> StorageResult<()> {
        self.track_call("delete_person");
        self.before_write().await?;

        let mut persons = self.persons.lock().unwrap();
        persons
            .remove(person_id)
            .map(|_| ())
            .ok_or_else(|| StorageError::RowMissing(format!("person {}", person_id)))
    }

    async fn insert_phone(
        &self,
        person_id: &PersonId,
        phone_id: &PhoneId,
        number: &str,
    ) -> StorageResult<()> {
        self.track_call("insert_phone");
        self.before_write().await?;

        let mut persons = self.persons.lock().unwrap();
        let stored = persons
            .get_mut(person_id)
            .ok_or_else(|| StorageError::RowMissing(format!("person {}", person_id)))?;
        if stored.phones.contains_key(phone_id) {
            return Err(StorageError::InvalidRecord(format!(
                "phone {}/{} already exists",
                person_id, phone_id
            )));
        }
        stored.phones.insert(phone_id.clone(), number.to_string());
        Ok(())
    }

    async fn update_phone(
        &self,
        person_id: &PersonId,
        phone_id: &PhoneId,
        number: &str,
    ) -> StorageResult<()> {
        self.track_call("update_phone");
        self.before_write().await?;

        let mut persons = self.persons.lock().unwrap();
        let slot = persons
            .get_mut(person_id)
            .and_then(|stored| stored.phones.get_mut(phone_id))
            .ok_or_else(|| StorageError::RowMissing(format!("phone {}/{}", person_id, phone_id)))?;
        *slot = number.to_string();
        Ok(())
    }

    async fn delete_phone(&self, person_id: &PersonId, phone_id: &PhoneId) -> StorageResult<()> {
        self.track_call("delete_phone");
        self.before_write().await?;

        let mut persons = self.persons.lock().unwrap();
        persons
            .get_mut(person_id)
            .and_then(|stored| stored.phones.remove(phone_id))
            .map(|_| ())
            .ok_or_else(|| StorageError::RowMissing(format!("phone {}/{}", person_id, phone_id)))
    }
}
