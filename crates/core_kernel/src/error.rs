//! Core error types used across the system

use crate::iban::IbanError;
use crate::idempotency::IdempotencyKeyError;
use crate::money::AmountError;
use thiserror::Error;

/// Core error type for the kernel
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("amount error: {0}")]
    Amount(#[from] AmountError),

    #[error("IBAN error: {0}")]
    Iban(#[from] IbanError),

    #[error("idempotency key error: {0}")]
    IdempotencyKey(#[from] IdempotencyKeyError),

    #[error("validation error: {0}")]
    Validation(String),
}

impl CoreError {
    pub fn validation(message: impl Into<String>) -> Self {
        CoreError::Validation(message.into())
    }
}
