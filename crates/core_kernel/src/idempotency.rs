//! Idempotency keys for request deduplication

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

static KEY_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Za-z0-9]{10}$").unwrap());

/// Errors that can occur during idempotency key construction
#[derive(Debug, Error, PartialEq, Eq)]
pub enum IdempotencyKeyError {
    #[error("invalid idempotency key: {0:?}")]
    InvalidFormat(String),
}

/// A caller-supplied deduplication token
///
/// Exactly 10 ASCII alphanumeric characters, case-sensitive. Any other
/// length or character class is rejected at construction.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct IdempotencyKey(String);

impl IdempotencyKey {
    /// Validates and wraps a key
    pub fn new(value: &str) -> Result<Self, IdempotencyKeyError> {
        if !KEY_RE.is_match(value) {
            return Err(IdempotencyKeyError::InvalidFormat(value.to_string()));
        }

        Ok(Self(value.to_string()))
    }

    /// Returns the key as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for IdempotencyKey {
    type Error = IdempotencyKeyError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(&value)
    }
}

impl From<IdempotencyKey> for String {
    fn from(key: IdempotencyKey) -> String {
        key.0
    }
}

impl fmt::Display for IdempotencyKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
