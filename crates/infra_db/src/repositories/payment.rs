//! Payment repository implementation
//!
//! Implements the domain's repository port against SQLite. Each write is a
//! single atomically-committed statement; status updates commit
//! independently of the original insert. The UNIQUE constraint on the
//! idempotency key is the deduplication mechanism - concurrent saves of the
//! same token race at the constraint and exactly one wins.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::FromRow;
use tracing::debug;

use core_kernel::{Amount, Iban, IdempotencyKey, PaymentId};
use domain_payment::{Payment, PaymentRepository, PaymentStatus, RepositoryError};

use crate::error::DatabaseError;
use crate::pool::DatabasePool;

/// Repository for payment aggregates backed by SQLite
#[derive(Debug, Clone)]
pub struct SqlitePaymentRepository {
    pool: DatabasePool,
}

impl SqlitePaymentRepository {
    /// Creates a new repository over the given connection pool
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }

    async fn fetch_row(
        &self,
        query: &'static str,
        bind: &str,
    ) -> Result<Option<PaymentRow>, RepositoryError> {
        sqlx::query_as::<_, PaymentRow>(query)
            .bind(bind)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| RepositoryError::storage(DatabaseError::from(&e)))
    }
}

#[async_trait]
impl PaymentRepository for SqlitePaymentRepository {
    async fn save(&self, payment: &Payment) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            r#"
            INSERT INTO payments (
                id, debtor_iban, debtor_name, creditor_iban, creditor_name,
                amount_cents, idempotency_key, status, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            "#,
        )
        .bind(payment.id().as_uuid().to_string())
        .bind(payment.debtor_iban().as_str())
        .bind(payment.debtor_name())
        .bind(payment.creditor_iban().as_str())
        .bind(payment.creditor_name())
        .bind(payment.amount().cents())
        .bind(payment.idempotency_key().as_str())
        .bind(payment.status().as_str())
        .bind(payment.created_at())
        .bind(payment.updated_at())
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(()),
            Err(err) => {
                let db_err = DatabaseError::from(&err);
                match &db_err {
                    DatabaseError::DuplicateEntry(message)
                        if message.contains("idempotency_key") =>
                    {
                        debug!(key = %payment.idempotency_key(), "idempotency key already stored");
                        Err(RepositoryError::DuplicateIdempotencyKey(
                            payment.idempotency_key().clone(),
                        ))
                    }
                    _ => Err(RepositoryError::storage(db_err)),
                }
            }
        }
    }

    async fn find_by_id(&self, id: &PaymentId) -> Result<Payment, RepositoryError> {
        let row = self
            .fetch_row(
                r#"
                SELECT id, debtor_iban, debtor_name, creditor_iban, creditor_name,
                       amount_cents, idempotency_key, status, created_at, updated_at
                FROM payments
                WHERE id = ?1
                "#,
                &id.as_uuid().to_string(),
            )
            .await?
            .ok_or_else(|| RepositoryError::not_found(id))?;

        rehydrate(row)
    }

    async fn find_by_idempotency_key(
        &self,
        key: &IdempotencyKey,
    ) -> Result<Payment, RepositoryError> {
        let row = self
            .fetch_row(
                r#"
                SELECT id, debtor_iban, debtor_name, creditor_iban, creditor_name,
                       amount_cents, idempotency_key, status, created_at, updated_at
                FROM payments
                WHERE idempotency_key = ?1
                "#,
                key.as_str(),
            )
            .await?
            .ok_or_else(|| RepositoryError::not_found(key))?;

        rehydrate(row)
    }

    async fn update_status(
        &self,
        id: &PaymentId,
        status: PaymentStatus,
        updated_at: DateTime<Utc>,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query("UPDATE payments SET status = ?1, updated_at = ?2 WHERE id = ?3")
            .bind(status.as_str())
            .bind(updated_at)
            .bind(id.as_uuid().to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| RepositoryError::storage(DatabaseError::from(&e)))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::not_found(id));
        }

        Ok(())
    }
}

/// Database row representation of a payment
#[derive(Debug, Clone, FromRow)]
struct PaymentRow {
    id: String,
    debtor_iban: String,
    debtor_name: String,
    creditor_iban: String,
    creditor_name: String,
    amount_cents: i64,
    idempotency_key: String,
    status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Rebuilds the aggregate from a row, re-validating every value object
///
/// The aggregate is constructed in its default `Pending` status and the
/// persisted status is then replayed through the live state machine, so a
/// stored status unreachable from `Pending` fails the load instead of
/// producing an invariant-violating aggregate.
fn rehydrate(row: PaymentRow) -> Result<Payment, RepositoryError> {
    let id: PaymentId = row
        .id
        .parse()
        .map_err(|e| RepositoryError::corrupt(format!("payment id {:?}: {e}", row.id)))?;

    let debtor_iban = Iban::new(&row.debtor_iban)
        .map_err(|e| RepositoryError::corrupt(format!("debtor IBAN: {e}")))?;
    let creditor_iban = Iban::new(&row.creditor_iban)
        .map_err(|e| RepositoryError::corrupt(format!("creditor IBAN: {e}")))?;
    let amount = Amount::from_cents(row.amount_cents)
        .map_err(|e| RepositoryError::corrupt(format!("amount: {e}")))?;
    let idempotency_key = IdempotencyKey::new(&row.idempotency_key)
        .map_err(|e| RepositoryError::corrupt(format!("idempotency key: {e}")))?;
    let status: PaymentStatus = row
        .status
        .parse()
        .map_err(|e| RepositoryError::corrupt(format!("status: {e}")))?;

    let mut payment = Payment::new(
        id,
        debtor_iban,
        row.debtor_name,
        creditor_iban,
        row.creditor_name,
        amount,
        idempotency_key,
        row.created_at,
        row.updated_at,
    )
    .map_err(|e| RepositoryError::corrupt(e.to_string()))?;

    match status {
        PaymentStatus::Pending => {}
        PaymentStatus::Processed => payment
            .mark_processed(row.updated_at)
            .map_err(|e| RepositoryError::corrupt(e.to_string()))?,
        PaymentStatus::Failed => payment
            .mark_failed(row.updated_at)
            .map_err(|e| RepositoryError::corrupt(e.to_string()))?,
    }

    Ok(payment)
}
