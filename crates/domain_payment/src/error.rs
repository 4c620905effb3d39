//! Payment domain errors

use crate::status::PaymentStatus;
use thiserror::Error;

/// Errors raised by the payment aggregate
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PaymentError {
    /// Construction input violated an aggregate invariant
    #[error("validation error: {0}")]
    Validation(String),

    /// An illegal state change was attempted; the aggregate is unchanged
    #[error("invalid status transition: {from} -> {to}")]
    InvalidStatusTransition {
        from: PaymentStatus,
        to: PaymentStatus,
    },
}

impl PaymentError {
    pub fn validation(message: impl Into<String>) -> Self {
        PaymentError::Validation(message.into())
    }
}
