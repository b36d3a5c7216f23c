//! Application service layer.
//!
//! Services validate caller input, drive the phonebook, and translate every
//! result into an outcome the presentation layer can report precisely.

mod outcome;
mod person_service;
mod phone_service;

pub use outcome::{Action, ActionReport, Outcome};
pub use person_service::{PersonService, PersonServiceImpl};
pub use phone_service::{PhoneService, PhoneServiceImpl};
