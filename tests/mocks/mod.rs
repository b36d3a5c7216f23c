//! Mock implementations for testing.
//!
//! Mock repositories record calls and can be told to fail writes, so the
//! phonebook can be tested without a real storage provider.

pub mod mock_phonebook_repository;

#[allow(unused_imports)]
pub use mock_phonebook_repository::MockPhonebookRepository;
