use crate::domain::{PersonId, PhoneId};
use crate::error::{StorageError, StorageResult};
use crate::models::Person;
use crate::repositories::traits::PhonebookRepository;
use async_trait::async_trait;
use rusqlite::{params, Connection, OpenFlags};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::{debug, warn};

/// Schema SQL embedded at compile time.
const SCHEMA_SQL: &str = include_str!("schema.sql");

/// Phonebook repository backed by SQLite.
///
/// All statements run on tokio's blocking pool through `spawn_blocking`.
/// The connection guard and any open transaction live only inside that
/// closure, so an error or panic mid-operation releases the connection and
/// rolls the transaction back.
pub struct SqlitePhonebookRepository {
    conn: Arc<Mutex<Connection>>,
    path: Option<PathBuf>,
}

impl SqlitePhonebookRepository {
    /// Open or create a phonebook database at `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created or the database
    /// cannot be opened and initialized.
    pub fn open(path: impl AsRef<Path>, busy_timeout: Duration) -> StorageResult<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_WRITE
                | OpenFlags::SQLITE_OPEN_CREATE
                | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;
        conn.busy_timeout(busy_timeout)?;
        conn.execute_batch(SCHEMA_SQL)?;

        debug!("Opened phonebook database at {}", path.display());

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
            path: Some(path.to_path_buf()),
        })
    }

    /// Create a non-durable in-memory database.
    ///
    /// # Errors
    ///
    /// Returns an error if the schema cannot be applied.
    pub fn in_memory() -> StorageResult<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(SCHEMA_SQL)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
            path: None,
        })
    }

    /// The database file, or `None` for an in-memory store.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Run `op` against the connection on the blocking pool.
    async fn run<T, F>(&self, op: F) -> StorageResult<T>
    where
        F: FnOnce(&mut Connection) -> StorageResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let conn = Arc::clone(&self.conn);

        tokio::task::spawn_blocking(move || {
            let mut guard = conn
                .lock()
                .map_err(|_| StorageError::Unavailable("connection lock poisoned".to_string()))?;
            op(&mut guard)
        })
        .await
        .map_err(|e| StorageError::Unavailable(format!("Task join error: {}", e)))?
    }

    fn load_all_blocking(conn: &mut Connection) -> StorageResult<Vec<Person>> {
        let mut phones: HashMap<String, Vec<(String, String)>> = HashMap::new();
        {
            let mut stmt = conn.prepare("SELECT person_id, phone_id, number FROM phone")?;
            let rows = stmt.query_map([], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                ))
            })?;
            for row in rows {
                let (person_id, phone_id, number) = row?;
                phones.entry(person_id).or_default().push((phone_id, number));
            }
        }

        let mut stmt = conn.prepare("SELECT id, name, surname, middlename FROM person")?;
        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, String>(3)?,
            ))
        })?;

        let mut persons = Vec::new();
        for row in rows {
            let (id, name, surname, middlename) = row?;
            let person_id = PersonId::new(id.as_str())
                .map_err(|e| StorageError::InvalidRecord(format!("person {:?}: {}", id, e)))?;

            let mut person = Person::new(person_id, name, surname, middlename);
            for (phone_id, number) in phones.remove(&id).unwrap_or_default() {
                let phone_id = PhoneId::new(phone_id.as_str()).map_err(|e| {
                    StorageError::InvalidRecord(format!("phone {:?} of {}: {}", phone_id, id, e))
                })?;
                person = person.with_phone(phone_id, number);
            }
            persons.push(person);
        }

        if !phones.is_empty() {
            warn!(
                "Ignoring phones of {} person id(s) with no person row",
                phones.len()
            );
        }

        Ok(persons)
    }

    fn insert_person_blocking(conn: &mut Connection, person: &Person) -> StorageResult<()> {
        let id = person
            .id()
            .ok_or_else(|| StorageError::InvalidRecord("person has no id".to_string()))?;

        let tx = conn.transaction()?;
        tx.execute(
            "INSERT INTO person (id, name, surname, middlename) VALUES (?1, ?2, ?3, ?4)",
            params![id.as_str(), person.name, person.surname, person.middlename],
        )?;
        {
            let mut stmt =
                tx.prepare("INSERT INTO phone (person_id, phone_id, number) VALUES (?1, ?2, ?3)")?;
            for (phone_id, number) in person.phones() {
                stmt.execute(params![id.as_str(), phone_id.as_str(), number])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    fn delete_person_blocking(conn: &mut Connection, person_id: &str) -> StorageResult<()> {
        let tx = conn.transaction()?;
        tx.execute("DELETE FROM phone WHERE person_id = ?1", params![person_id])?;
        let deleted = tx.execute("DELETE FROM person WHERE id = ?1", params![person_id])?;
        if deleted == 0 {
            // Dropping the transaction rolls the phone deletion back.
            return Err(StorageError::RowMissing(format!("person {}", person_id)));
        }
        tx.commit()?;
        Ok(())
    }
}

/// Map "no row touched" to `RowMissing`.
fn expect_one(affected: usize, what: impl FnOnce() -> String) -> StorageResult<()> {
    if affected == 0 {
        Err(StorageError::RowMissing(what()))
    } else {
        Ok(())
    }
}

#[async_trait]
impl PhonebookRepository for SqlitePhonebookRepository {
    async fn load_all(&self) -> StorageResult<Vec<Person>> {
        self.run(Self::load_all_blocking).await
    }

    async fn insert_person(&self, person: &Person) -> StorageResult<()> {
        let person = person.clone();
        self.run(move |conn| Self::insert_person_blocking(conn, &person))
            .await
    }

    async fn update_person(&self, person: &Person) -> StorageResult<()> {
        let person = person.clone();
        self.run(move |conn| {
            let id = person
                .id()
                .ok_or_else(|| StorageError::InvalidRecord("person has no id".to_string()))?;
            let affected = conn.execute(
                "UPDATE person SET name = ?2, surname = ?3, middlename = ?4 WHERE id = ?1",
                params![id.as_str(), person.name, person.surname, person.middlename],
            )?;
            expect_one(affected, || format!("person {}", id))
        })
        .await
    }

    async fn delete_person(&self, person_id: &PersonId) -> StorageResult<()> {
        let person_id = person_id.clone();
        self.run(move |conn| Self::delete_person_blocking(conn, person_id.as_str()))
            .await
    }

    async fn insert_phone(
        &self,
        person_id: &PersonId,
        phone_id: &PhoneId,
        number: &str,
    ) -> StorageResult<()> {
        let (person_id, phone_id, number) = (person_id.clone(), phone_id.clone(), number.to_string());
        self.run(move |conn| {
            conn.execute(
                "INSERT INTO phone (person_id, phone_id, number) VALUES (?1, ?2, ?3)",
                params![person_id.as_str(), phone_id.as_str(), number],
            )?;
            Ok(())
        })
        .await
    }

    async fn update_phone(
        &self,
        person_id: &PersonId,
        phone_id: &PhoneId,
        number: &str,
    ) -> StorageResult<()> {
        let (person_id, phone_id, number) = (person_id.clone(), phone_id.clone(), number.to_string());
        self.run(move |conn| {
            let affected = conn.execute(
                "UPDATE phone SET number = ?3 WHERE person_id = ?1 AND phone_id = ?2",
                params![person_id.as_str(), phone_id.as_str(), number],
            )?;
            expect_one(affected, || format!("phone {} of person {}", phone_id, person_id))
        })
        .await
    }

    async fn delete_phone(&self, person_id: &PersonId, phone_id: &PhoneId) -> StorageResult<()> {
        let (person_id, phone_id) = (person_id.clone(), phone_id.clone());
        self.run(move |conn| {
            let affected = conn.execute(
                "DELETE FROM phone WHERE person_id = ?1 AND phone_id = ?2",
                params![person_id.as_str(), phone_id.as_str()],
            )?;
            expect_one(affected, || format!("phone {} of person {}", phone_id, person_id))
        })
        .await
    }
}
