//! Repository port for payment persistence
//!
//! The port is consumed by the application service and implemented by the
//! storage adapter. Absence is always signaled as [`RepositoryError::NotFound`],
//! never as an empty success, so callers cannot mistake "not found" for
//! "found but empty".

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use core_kernel::{IdempotencyKey, PaymentId};

use crate::payment::Payment;
use crate::status::PaymentStatus;
use thiserror::Error;

/// Errors surfaced by repository implementations
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// No aggregate matched the lookup
    #[error("payment not found: {0}")]
    NotFound(String),

    /// Another stored aggregate already carries this idempotency token.
    /// Callers should treat this as an idempotent success, not a failure
    /// to retry.
    #[error("duplicate idempotency key: {0}")]
    DuplicateIdempotencyKey(IdempotencyKey),

    /// A persisted row failed domain re-validation on load
    #[error("corrupt persisted payment: {reason}")]
    CorruptData { reason: String },

    /// Any other persistence failure, propagated unchanged
    #[error("storage error: {0}")]
    Storage(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl RepositoryError {
    pub fn not_found(lookup: impl std::fmt::Display) -> Self {
        RepositoryError::NotFound(lookup.to_string())
    }

    pub fn corrupt(reason: impl Into<String>) -> Self {
        RepositoryError::CorruptData {
            reason: reason.into(),
        }
    }

    pub fn storage(source: impl std::error::Error + Send + Sync + 'static) -> Self {
        RepositoryError::Storage(Box::new(source))
    }

    /// Returns true if this error indicates the aggregate was not found
    pub fn is_not_found(&self) -> bool {
        matches!(self, RepositoryError::NotFound(_))
    }
}

/// Persistence port for payment aggregates
#[async_trait]
pub trait PaymentRepository: Send + Sync {
    /// Persists a brand-new aggregate
    ///
    /// Fails with [`RepositoryError::DuplicateIdempotencyKey`] when the
    /// storage uniqueness constraint rejects the token. The constraint, not
    /// a prior read, is the deduplication mechanism; concurrent saves of
    /// the same token race at the constraint and exactly one wins.
    async fn save(&self, payment: &Payment) -> Result<(), RepositoryError>;

    /// Returns the aggregate with the given id
    async fn find_by_id(&self, id: &PaymentId) -> Result<Payment, RepositoryError>;

    /// Returns the aggregate carrying the given idempotency token
    async fn find_by_idempotency_key(
        &self,
        key: &IdempotencyKey,
    ) -> Result<Payment, RepositoryError>;

    /// Persists a status change for an existing row
    ///
    /// `updated_at` is the caller-supplied transition time, so the stored
    /// row stays consistent with the aggregate that performed the
    /// transition. Fails with [`RepositoryError::NotFound`] when zero rows
    /// matched.
    async fn update_status(
        &self,
        id: &PaymentId,
        status: PaymentStatus,
        updated_at: DateTime<Utc>,
    ) -> Result<(), RepositoryError>;
}
