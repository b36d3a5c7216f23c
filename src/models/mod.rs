//! Data models for phonebook entities.

pub mod person;

pub use person::Person;
