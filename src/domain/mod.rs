//! Domain value objects and validation rules.
//!
//! This module contains type-safe wrappers for phonebook identifiers and
//! the format rules a phone number or a person's name must satisfy before
//! the service layer lets it reach the phonebook.

pub mod errors;
pub mod person_id;
pub mod person_name;
pub mod phone;
pub mod phone_id;

pub use errors::ValidationError;
pub use person_id::PersonId;
pub use person_name::{validate_name_part, NAME_FORMAT_MESSAGE, NAME_PART_MAX_LEN};
pub use phone::{validate, validate_opt, PhoneNumber, PHONE_FORMAT_MESSAGE};
pub use phone_id::PhoneId;
