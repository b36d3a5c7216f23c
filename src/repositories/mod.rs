mod sqlite_phonebook_repository;
mod traits;

pub use sqlite_phonebook_repository::SqlitePhonebookRepository;
pub use traits::PhonebookRepository;
