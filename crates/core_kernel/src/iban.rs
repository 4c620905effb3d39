//! International bank account numbers
//!
//! An [`Iban`] is stored in normalized form: uppercase, with all spaces
//! removed. Grammar: 2 letters (country), 2 check digits, 4 alphanumerics,
//! 7 digits, then up to 16 further alphanumerics.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

static IBAN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Z]{2}\d{2}[A-Z0-9]{4}\d{7}[A-Z0-9]{0,16}$").unwrap());

/// Errors that can occur during IBAN construction
#[derive(Debug, Error, PartialEq, Eq)]
pub enum IbanError {
    #[error("invalid IBAN format: {0:?}")]
    InvalidFormat(String),
}

/// A validated, normalized international bank account number
///
/// Two inputs differing only by letter case or interior spacing normalize
/// to the same value and compare equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Iban(String);

impl Iban {
    /// Parses and normalizes an account number
    pub fn new(input: &str) -> Result<Self, IbanError> {
        let normalized: String = input
            .chars()
            .filter(|c| !c.is_whitespace())
            .map(|c| c.to_ascii_uppercase())
            .collect();

        if !IBAN_RE.is_match(&normalized) {
            return Err(IbanError::InvalidFormat(input.to_string()));
        }

        Ok(Self(normalized))
    }

    /// Returns the normalized string form
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Iban {
    type Error = IbanError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(&value)
    }
}

impl From<Iban> for String {
    fn from(iban: Iban) -> String {
        iban.0
    }
}

impl fmt::Display for Iban {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
