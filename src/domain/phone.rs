//! Phone number validation and the PhoneNumber value object.

use super::errors::ValidationError;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Message shown to the user when a phone number fails validation.
pub const PHONE_FORMAT_MESSAGE: &str =
    "Phone number must be a string of 2 to 50 characters consisting of digits, plus signs, minus signs and # signs.";

// Every allowed character is ASCII, so a length counted in bytes equals the
// length counted in characters for any string the pattern accepts.
static PHONE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9+\-#]{2,50}$").expect("Failed to compile phone number regex"));

/// Check a phone number string against the format rule.
///
/// Passes iff the string is 2 to 50 characters long and consists only of
/// `0-9`, `+`, `-` and `#`. Never fails.
///
/// # Example
///
/// ```
/// use phonebook_mcp_server::domain::validate;
///
/// assert!(validate("+7-495-123#45"));
/// assert!(!validate("1"));
/// assert!(!validate("12*34"));
/// ```
pub fn validate(number: &str) -> bool {
    PHONE_PATTERN.is_match(number)
}

/// Like [`validate`], treating an absent value as invalid.
pub fn validate_opt(number: Option<&str>) -> bool {
    number.is_some_and(validate)
}

/// A phone number known to satisfy [`validate`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PhoneNumber(String);

impl PhoneNumber {
    /// Create a new PhoneNumber, validating the format.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::InvalidPhone` if the phone format is invalid.
    pub fn new(phone: impl Into<String>) -> Result<Self, ValidationError> {
        let phone = phone.into();

        if !validate(&phone) {
            return Err(ValidationError::InvalidPhone(phone));
        }

        Ok(Self(phone))
    }

    /// Get the phone number as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Build from input that may be absent; an absent number is invalid.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::InvalidPhone` unless [`validate_opt`] passes.
    pub fn from_opt(phone: Option<&str>) -> Result<Self, ValidationError> {
        let value = phone.unwrap_or_default().to_string();
        if !validate_opt(phone) {
            return Err(ValidationError::InvalidPhone(value));
        }

        Ok(Self(value))
    }
}

impl Serialize for PhoneNumber {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.0.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for PhoneNumber {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        PhoneNumber::new(s).map_err(serde::de::Error::custom)
    }
}

impl fmt::Display for PhoneNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
