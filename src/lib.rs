//! Phonebook MCP Server - a phonebook backend exposed through the Model Context Protocol.
//!
//! Persons carry a set of phone numbers keyed by phone ID. Numbers are
//! validated before they are stored, every change is persisted before it
//! becomes visible, and changes to the same person are serialized.
//!
//! # Architecture
//!
//! - **domain**: Identifier newtypes and the phone number format rules
//! - **models**: The `Person` record
//! - **repositories**: Durable storage behind the phonebook (SQLite)
//! - **phonebook**: The in-memory phonebook and its persist-first mutations
//! - **services**: Validation and result reporting on top of the phonebook
//! - **server**: MCP protocol server
//! - **error**, **config**, **metrics**: Shared infrastructure

pub mod config;
pub mod domain;
pub mod error;
pub mod metrics;
pub mod models;
pub mod phonebook;
pub mod repositories;
pub mod server;
pub mod services;

// Re-export commonly used types
pub use config::Config;
pub use domain::{validate, validate_opt, PersonId, PhoneId, PhoneNumber, PHONE_FORMAT_MESSAGE};
pub use error::{ConfigError, PhonebookError, StorageError};
pub use metrics::{Metrics, MetricsSummary, StorageTimer};
pub use models::Person;
pub use phonebook::Phonebook;
pub use repositories::{PhonebookRepository, SqlitePhonebookRepository};
pub use server::PhonebookMcpServer;
pub use services::{
    Action, ActionReport, Outcome, PersonService, PersonServiceImpl, PhoneService,
    PhoneServiceImpl,
};
