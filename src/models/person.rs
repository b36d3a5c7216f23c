//! Person model: one phonebook record and the numbers it owns.

use crate::domain::{PersonId, PhoneId};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A person in the phonebook.
///
/// A `Person` handed out by the phonebook is a snapshot: mutating methods
/// are crate-private and only the phonebook applies them, after the
/// corresponding write has been committed to storage.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Person {
    /// Stable identifier; `None` until the record is first persisted
    id: Option<PersonId>,

    /// Given name
    pub name: String,

    /// Family name
    pub surname: String,

    /// Middle name or patronymic (may be empty)
    pub middlename: String,

    /// Phone numbers keyed by their per-person phone ID
    phones: HashMap<PhoneId, String>,
}

impl Person {
    /// An empty person that has not been persisted yet.
    ///
    /// Adding a number to it through the phonebook creates the record.
    pub fn unsaved() -> Self {
        Self::default()
    }

    /// Create a persisted person with no phones.
    pub fn new(
        id: PersonId,
        name: impl Into<String>,
        surname: impl Into<String>,
        middlename: impl Into<String>,
    ) -> Self {
        Self {
            id: Some(id),
            name: name.into(),
            surname: surname.into(),
            middlename: middlename.into(),
            phones: HashMap::new(),
        }
    }

    /// Attach a phone while materializing a record from storage.
    pub fn with_phone(mut self, phone_id: PhoneId, number: impl Into<String>) -> Self {
        self.phones.insert(phone_id, number.into());
        self
    }

    pub fn id(&self) -> Option<&PersonId> {
        self.id.as_ref()
    }

    pub fn is_saved(&self) -> bool {
        self.id.is_some()
    }

    /// Current phone numbers keyed by phone ID.
    pub fn phones(&self) -> &HashMap<PhoneId, String> {
        &self.phones
    }

    /// Look up one number by its phone ID.
    pub fn phone(&self, phone_id: &str) -> Option<&str> {
        let phone_id = PhoneId::new(phone_id).ok()?;
        self.phones.get(&phone_id).map(String::as_str)
    }

    /// Phones ordered by phone ID (numeric IDs first, in numeric order).
    pub fn sorted_phones(&self) -> Vec<(&PhoneId, &str)> {
        let mut phones: Vec<_> = self
            .phones
            .iter()
            .map(|(id, number)| (id, number.as_str()))
            .collect();
        phones.sort_by(|(a, _), (b, _)| {
            (a.numeric().is_none(), a.numeric(), a.as_str())
                .cmp(&(b.numeric().is_none(), b.numeric(), b.as_str()))
        });
        phones
    }

    /// "Surname Name Middlename", skipping empty parts.
    pub fn full_name(&self) -> String {
        [&self.surname, &self.name, &self.middlename]
            .iter()
            .map(|part| part.trim())
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }

    pub(crate) fn assign_id(&mut self, id: PersonId) {
        self.id = Some(id);
    }

    /// Numeric phone ID one above the largest numeric ID in use, never
    /// equal to an existing key.
    pub(crate) fn next_phone_id(&self) -> PhoneId {
        let mut next = self
            .phones
            .keys()
            .filter_map(PhoneId::numeric)
            .max()
            .and_then(|max| max.checked_add(1))
            .unwrap_or(1);

        loop {
            let candidate = PhoneId::from_sequence(next);
            if !self.phones.contains_key(&candidate) {
                return candidate;
            }
            // Wraps back to 1 at u64::MAX; terminates because the map is finite.
            next = next.checked_add(1).unwrap_or(1);
        }
    }

    pub(crate) fn insert_phone(&mut self, phone_id: PhoneId, number: String) {
        self.phones.insert(phone_id, number);
    }

    /// Replace the value at `phone_id`; returns false if there is none.
    pub(crate) fn replace_phone(&mut self, phone_id: &PhoneId, number: String) -> bool {
        match self.phones.get_mut(phone_id) {
            Some(slot) => {
                *slot = number;
                true
            }
            None => false,
        }
    }

    pub(crate) fn remove_phone(&mut self, phone_id: &PhoneId) -> Option<String> {
        self.phones.remove(phone_id)
    }

    pub(crate) fn set_names(&mut self, name: String, surname: String, middlename: String) {
        self.name = name;
        self.surname = surname;
        self.middlename = middlename;
    }
}
