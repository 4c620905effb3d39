//! Application service for payment intake
//!
//! Orchestrates idempotency checks and status-update transitions over the
//! repository port. Status updates follow load-transition-save: the
//! aggregate's own state machine guards every persisted change, and a blind
//! status overwrite is deliberately not offered.

use std::sync::Arc;

use thiserror::Error;
use tracing::debug;

use core_kernel::{Amount, Clock, Iban, IdempotencyKey, PaymentId};

use crate::error::PaymentError;
use crate::payment::Payment;
use crate::ports::{PaymentRepository, RepositoryError};
use crate::status::PaymentStatus;

/// Errors surfaced by the application service
#[derive(Debug, Error)]
pub enum ServiceError {
    /// A payment with this idempotency token already exists. Carries the
    /// stored aggregate so callers can answer with the original outcome.
    #[error("payment already submitted under idempotency key {key}")]
    DuplicateSubmission {
        key: IdempotencyKey,
        existing: Payment,
    },

    #[error(transparent)]
    Domain(#[from] PaymentError),

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// Input for a new payment submission
///
/// The id is assigned by the submitting caller; timestamps come from the
/// service's clock.
#[derive(Debug, Clone)]
pub struct NewPayment {
    pub id: PaymentId,
    pub debtor_iban: Iban,
    pub debtor_name: String,
    pub creditor_iban: Iban,
    pub creditor_name: String,
    pub amount: Amount,
    pub idempotency_key: IdempotencyKey,
}

/// Orchestrates intake and status transitions
pub struct PaymentService {
    repository: Arc<dyn PaymentRepository>,
    clock: Arc<dyn Clock>,
}

impl PaymentService {
    pub fn new(repository: Arc<dyn PaymentRepository>, clock: Arc<dyn Clock>) -> Self {
        Self { repository, clock }
    }

    /// Checks whether a token has already been used
    ///
    /// Returns `Ok(())` when the token is fresh. An existing aggregate
    /// yields [`ServiceError::DuplicateSubmission`] carrying it. This is a
    /// fast-path courtesy check only; the authoritative guard is the
    /// storage uniqueness constraint hit by [`Self::submit`].
    pub async fn ensure_idempotency(&self, key: &IdempotencyKey) -> Result<(), ServiceError> {
        match self.repository.find_by_idempotency_key(key).await {
            Ok(existing) => Err(ServiceError::DuplicateSubmission {
                key: key.clone(),
                existing,
            }),
            Err(err) if err.is_not_found() => Ok(()),
            Err(err) => Err(err.into()),
        }
    }

    /// Constructs and persists a new payment
    ///
    /// A duplicate token surfacing from the storage constraint is resolved
    /// to [`ServiceError::DuplicateSubmission`] with the originally stored
    /// aggregate.
    pub async fn submit(&self, request: NewPayment) -> Result<Payment, ServiceError> {
        let now = self.clock.now();
        let payment = Payment::new(
            request.id,
            request.debtor_iban,
            request.debtor_name,
            request.creditor_iban,
            request.creditor_name,
            request.amount,
            request.idempotency_key,
            now,
            now,
        )?;

        match self.repository.save(&payment).await {
            Ok(()) => Ok(payment),
            Err(RepositoryError::DuplicateIdempotencyKey(key)) => {
                debug!(%key, "duplicate submission detected at storage constraint");
                let existing = self.repository.find_by_idempotency_key(&key).await?;
                Err(ServiceError::DuplicateSubmission { key, existing })
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Applies a status transition to a stored payment
    ///
    /// Loads the aggregate, runs the transition through its state machine,
    /// then persists the new status with the same timestamp the transition
    /// recorded.
    pub async fn process_status_update(
        &self,
        id: &PaymentId,
        new_status: PaymentStatus,
    ) -> Result<(), ServiceError> {
        let mut payment = self.repository.find_by_id(id).await?;
        let now = self.clock.now();

        match new_status {
            PaymentStatus::Processed => payment.mark_processed(now)?,
            PaymentStatus::Failed => payment.mark_failed(now)?,
            PaymentStatus::Pending => {
                return Err(PaymentError::InvalidStatusTransition {
                    from: payment.status(),
                    to: PaymentStatus::Pending,
                }
                .into());
            }
        }

        self.repository
            .update_status(id, payment.status(), payment.updated_at())
            .await?;
        Ok(())
    }
}
