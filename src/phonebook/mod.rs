//! The phonebook core: the in-memory set of persons and the only writer of
//! persisted phonebook state.
//!
//! Every mutation follows the same discipline: lock the person, write to
//! storage, and only after the write commits apply the change in memory.
//! A failed write therefore leaves both sides untouched. The write and the
//! in-memory update run on a task of their own that owns the person's lock,
//! so dropping the caller's future cannot separate them.
//!
//! Mutations on one person are serialized by that person's lock; mutations
//! on different persons run in parallel.

use crate::domain::{PersonId, PhoneId};
use crate::error::{PhonebookError, PhonebookResult, StorageError, StorageResult};
use crate::metrics::{Metrics, StorageTimer};
use crate::models::Person;
use crate::repositories::PhonebookRepository;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard, RwLock};
use tracing::{debug, error, info};

/// One person's lock. `None` while the person is being created and once
/// they have been deleted, so callers holding the slot see them as absent.
type PersonSlot = Arc<Mutex<Option<Person>>>;

type PersonMap = Arc<RwLock<HashMap<PersonId, PersonSlot>>>;

/// A storage write with owned arguments, ready to move onto a task.
enum StorageWrite {
    InsertPerson(Person),
    UpdatePerson(Person),
    DeletePerson(PersonId),
    InsertPhone(PersonId, PhoneId, String),
    UpdatePhone(PersonId, PhoneId, String),
    DeletePhone(PersonId, PhoneId),
}

impl StorageWrite {
    async fn run(&self, repository: &dyn PhonebookRepository) -> StorageResult<()> {
        match self {
            Self::InsertPerson(person) => repository.insert_person(person).await,
            Self::UpdatePerson(person) => repository.update_person(person).await,
            Self::DeletePerson(person_id) => repository.delete_person(person_id).await,
            Self::InsertPhone(person_id, phone_id, number) => {
                repository.insert_phone(person_id, phone_id, number).await
            }
            Self::UpdatePhone(person_id, phone_id, number) => {
                repository.update_phone(person_id, phone_id, number).await
            }
            Self::DeletePhone(person_id, phone_id) => {
                repository.delete_phone(person_id, phone_id).await
            }
        }
    }
}

/// Phonebook service shared by all request handlers (`Arc<Phonebook>`).
pub struct Phonebook {
    repository: Arc<dyn PhonebookRepository>,
    persons: PersonMap,
    next_person_id: AtomicU64,
    metrics: Metrics,
}

impl Phonebook {
    /// Materialize the persisted phonebook.
    ///
    /// # Errors
    ///
    /// Returns `PhonebookError::Initialization` if storage cannot be read.
    /// No phonebook exists in that case, so nothing can operate on a
    /// partially loaded state.
    pub async fn open(
        repository: Arc<dyn PhonebookRepository>,
        metrics: Metrics,
    ) -> PhonebookResult<Self> {
        let loaded = repository.load_all().await.map_err(|e| {
            error!("Failed to load phonebook from storage: {}", e);
            PhonebookError::Initialization(e)
        })?;

        let mut persons = HashMap::with_capacity(loaded.len());
        let mut max_id = 0;
        for person in loaded {
            if let Some(id) = person.id().cloned() {
                max_id = max_id.max(id.numeric().unwrap_or(0));
                persons.insert(id, Arc::new(Mutex::new(Some(person))));
            }
        }

        info!("Phonebook loaded with {} person(s)", persons.len());

        Ok(Self {
            repository,
            persons: Arc::new(RwLock::new(persons)),
            next_person_id: AtomicU64::new(max_id.saturating_add(1)),
            metrics,
        })
    }

    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    /// Resolve a person by ID.
    ///
    /// An absent or blank ID yields an unsaved empty person, which
    /// [`add_number`](Self::add_number) turns into a new record. An unknown
    /// ID yields `None`.
    pub async fn get_person(&self, id: Option<&str>) -> Option<Person> {
        let Some(id) = id.and_then(|id| PersonId::new(id).ok()) else {
            return Some(Person::unsaved());
        };

        let slot = self.slot(&id).await?;
        let guard = slot.lock().await;
        guard.clone()
    }

    /// All persons, ordered by ID (numeric IDs in numeric order).
    pub async fn list_persons(&self) -> Vec<Person> {
        let slots: Vec<PersonSlot> = self.persons.read().await.values().cloned().collect();

        let mut persons = Vec::with_capacity(slots.len());
        for slot in slots {
            if let Some(person) = slot.lock().await.clone() {
                persons.push(person);
            }
        }
        persons.sort_by(|a, b| sort_key(a).cmp(&sort_key(b)));
        persons
    }

    /// Number of persons, counting any whose creation is still being written.
    pub async fn len(&self) -> usize {
        self.persons.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Add a number under a fresh phone ID and return that ID.
    ///
    /// On an unsaved person this creates the person record together with
    /// its first number. The number is stored as given: checking its format
    /// is the caller's job (see `domain::validate`).
    ///
    /// On success `person` is refreshed to the committed state.
    pub async fn add_number(&self, person: &mut Person, number: &str) -> PhonebookResult<PhoneId> {
        let Some(person_id) = person.id().cloned() else {
            return self.create_with_number(person, number).await;
        };

        let guard = self.lock_person(&person_id).await?;
        let phone_id = match &*guard {
            Some(current) => current.next_phone_id(),
            None => return Err(PhonebookError::PersonNotFound(person_id)),
        };

        let write =
            StorageWrite::InsertPhone(person_id.clone(), phone_id.clone(), number.to_string());
        let (new_id, number) = (phone_id.clone(), number.to_string());
        let committed = self
            .commit(person_id.clone(), guard, write, move |slot| {
                if let Some(current) = slot {
                    current.insert_phone(new_id, number);
                }
            })
            .await?;
        *person = committed.ok_or_else(|| PhonebookError::PersonNotFound(person_id.clone()))?;

        info!("Added phone {} to person {}", phone_id, person_id);
        Ok(phone_id)
    }

    /// Overwrite the number stored under `phone_id`.
    ///
    /// Fails with `PhoneNotFound` and changes nothing if the person has no
    /// such phone. On success `person` is refreshed to the committed state.
    pub async fn update_number(
        &self,
        person: &mut Person,
        phone_id: &str,
        number: &str,
    ) -> PhonebookResult<()> {
        let (person_id, phone_id) = Self::phone_address(person, phone_id)?;

        let guard = self.lock_person(&person_id).await?;
        match &*guard {
            Some(current) if current.phones().contains_key(&phone_id) => {}
            Some(_) => return Err(PhonebookError::from((&person_id, &phone_id))),
            None => return Err(PhonebookError::PersonNotFound(person_id)),
        }

        let write =
            StorageWrite::UpdatePhone(person_id.clone(), phone_id.clone(), number.to_string());
        let (target, number) = (phone_id.clone(), number.to_string());
        let committed = self
            .commit(person_id.clone(), guard, write, move |slot| {
                if let Some(current) = slot {
                    current.replace_phone(&target, number);
                }
            })
            .await?;
        *person = committed.ok_or_else(|| PhonebookError::PersonNotFound(person_id.clone()))?;

        info!("Updated phone {} of person {}", phone_id, person_id);
        Ok(())
    }

    /// Remove the phone stored under `phone_id`.
    ///
    /// Fails with `PhoneNotFound` and changes nothing if the person has no
    /// such phone, so deleting twice fails the second time. On success
    /// `person` is refreshed to the committed state.
    pub async fn delete_number(&self, person: &mut Person, phone_id: &str) -> PhonebookResult<()> {
        let (person_id, phone_id) = Self::phone_address(person, phone_id)?;

        let guard = self.lock_person(&person_id).await?;
        match &*guard {
            Some(current) if current.phones().contains_key(&phone_id) => {}
            Some(_) => return Err(PhonebookError::from((&person_id, &phone_id))),
            None => return Err(PhonebookError::PersonNotFound(person_id)),
        }

        let write = StorageWrite::DeletePhone(person_id.clone(), phone_id.clone());
        let target = phone_id.clone();
        let committed = self
            .commit(person_id.clone(), guard, write, move |slot| {
                if let Some(current) = slot {
                    current.remove_phone(&target);
                }
            })
            .await?;
        *person = committed.ok_or_else(|| PhonebookError::PersonNotFound(person_id.clone()))?;

        info!("Deleted phone {} of person {}", phone_id, person_id);
        Ok(())
    }

    /// Create a person with no phones.
    pub async fn add_person(
        &self,
        name: &str,
        surname: &str,
        middlename: &str,
    ) -> PhonebookResult<Person> {
        let mut person = Person::unsaved();
        person.set_names(name.to_string(), surname.to_string(), middlename.to_string());
        self.insert_new(person).await
    }

    /// Persist the name parts of `person`.
    ///
    /// Phones are not touched; the stored phones are kept even if the
    /// snapshot passed in is stale. On success `person` is refreshed.
    pub async fn update_person(&self, person: &mut Person) -> PhonebookResult<()> {
        let person_id = person
            .id()
            .cloned()
            .ok_or_else(|| PhonebookError::InvalidInput("person has not been saved".to_string()))?;

        let guard = self.lock_person(&person_id).await?;
        let mut updated = match &*guard {
            Some(current) => current.clone(),
            None => return Err(PhonebookError::PersonNotFound(person_id)),
        };
        updated.set_names(
            person.name.clone(),
            person.surname.clone(),
            person.middlename.clone(),
        );

        let write = StorageWrite::UpdatePerson(updated.clone());
        let committed = self
            .commit(person_id.clone(), guard, write, move |slot| {
                *slot = Some(updated);
            })
            .await?;
        *person = committed.ok_or_else(|| PhonebookError::PersonNotFound(person_id.clone()))?;

        info!("Updated person {}", person_id);
        Ok(())
    }

    /// Delete a person and all of their phones.
    pub async fn delete_person(&self, person_id: &str) -> PhonebookResult<Person> {
        let person_id = PersonId::new(person_id)
            .map_err(|e| PhonebookError::InvalidInput(e.to_string()))?;

        let guard = self.lock_person(&person_id).await?;
        let Some(removed) = (*guard).clone() else {
            return Err(PhonebookError::PersonNotFound(person_id));
        };

        let write = StorageWrite::DeletePerson(person_id.clone());
        self.commit(person_id.clone(), guard, write, |slot| {
            *slot = None;
        })
        .await?;

        info!("Deleted person {}", person_id);
        Ok(removed)
    }

    async fn slot(&self, id: &PersonId) -> Option<PersonSlot> {
        self.persons.read().await.get(id).cloned()
    }

    /// Take the lock of a known person. The slot may still be empty.
    async fn lock_person(
        &self,
        person_id: &PersonId,
    ) -> PhonebookResult<OwnedMutexGuard<Option<Person>>> {
        let slot = self
            .slot(person_id)
            .await
            .ok_or_else(|| PhonebookError::PersonNotFound(person_id.clone()))?;
        Ok(slot.lock_owned().await)
    }

    /// Create the record for an unsaved person together with its first number.
    ///
    /// The record keeps whatever name parts the unsaved person carries, which
    /// for `Person::unsaved()` are empty. Name rules are enforced by the
    /// person service, not here; the names can be filled in later through
    /// [`update_person`](Self::update_person).
    async fn create_with_number(
        &self,
        person: &mut Person,
        number: &str,
    ) -> PhonebookResult<PhoneId> {
        let mut new_person = person.clone();
        let phone_id = new_person.next_phone_id();
        new_person.insert_phone(phone_id.clone(), number.to_string());

        *person = self.insert_new(new_person).await?;
        Ok(phone_id)
    }

    /// Assign an ID to `person`, store it, then publish it in memory.
    ///
    /// The ID is reserved with an empty slot under a short map lock, so other
    /// persons stay reachable while the write is pending and the new person
    /// is not observable before it is durable.
    async fn insert_new(&self, mut person: Person) -> PhonebookResult<Person> {
        let id = PersonId::from_sequence(self.next_person_id.fetch_add(1, Ordering::SeqCst));
        person.assign_id(id.clone());

        let slot: PersonSlot = Arc::new(Mutex::new(None));
        let guard = Arc::clone(&slot).lock_owned().await;
        self.persons.write().await.insert(id.clone(), slot);

        let write = StorageWrite::InsertPerson(person.clone());
        let committed = self
            .commit(id.clone(), guard, write, move |slot| {
                *slot = Some(person);
            })
            .await?;
        let person = committed.ok_or_else(|| PhonebookError::PersonNotFound(id.clone()))?;

        info!(
            "Created person {} with {} phone(s)",
            id,
            person.phones().len()
        );
        Ok(person)
    }

    /// Persist `write` and, once it has committed, `apply` it to the person.
    ///
    /// Both steps run on a spawned task that owns the person's lock, so they
    /// complete together even if the caller stops waiting. A slot left empty
    /// afterwards (deleted, or a creation that failed) is removed from the
    /// map. Returns the committed snapshot.
    async fn commit<A>(
        &self,
        person_id: PersonId,
        mut guard: OwnedMutexGuard<Option<Person>>,
        write: StorageWrite,
        apply: A,
    ) -> PhonebookResult<Option<Person>>
    where
        A: FnOnce(&mut Option<Person>) + Send + 'static,
    {
        let repository = Arc::clone(&self.repository);
        let persons = Arc::clone(&self.persons);
        let timer = StorageTimer::new(self.metrics.clone());

        let task = tokio::spawn(async move {
            let written = write.run(repository.as_ref()).await;
            match &written {
                Ok(()) => {
                    timer.complete();
                    apply(&mut *guard);
                }
                Err(e) => {
                    timer.complete_with_error();
                    error!("Storage write for person {} failed: {}", person_id, e);
                }
            }

            let snapshot = (*guard).clone();
            drop(guard);
            if snapshot.is_none() {
                persons.write().await.remove(&person_id);
            }
            written.map(|()| snapshot)
        });

        task.await
            .map_err(|e| StorageError::Unavailable(format!("Task join error: {}", e)))?
            .map_err(PhonebookError::Storage)
    }

    /// The saved person's ID and a parsed phone ID, or `PhoneNotFound`.
    fn phone_address(person: &Person, phone_id: &str) -> PhonebookResult<(PersonId, PhoneId)> {
        let person_id = person
            .id()
            .cloned()
            .ok_or_else(|| PhonebookError::phone_not_found(None, phone_id))?;
        let phone_id = PhoneId::new(phone_id)
            .map_err(|_| PhonebookError::phone_not_found(Some(&person_id), phone_id))?;
        debug!("Resolved phone {} of person {}", phone_id, person_id);
        Ok((person_id, phone_id))
    }
}

fn sort_key(person: &Person) -> (bool, u64, String) {
    let id = person.id();
    let numeric = id.and_then(PersonId::numeric);
    (
        numeric.is_none(),
        numeric.unwrap_or(0),
        id.map(|id| id.as_str().to_string()).unwrap_or_default(),
    )
}
