//! The payment aggregate
//!
//! A [`Payment`] is created once in `Pending` status and is only ever
//! mutated through the two terminal-transition operations. All fields are
//! private; there is no way to observe or construct a payment that violates
//! the aggregate invariants.

use chrono::{DateTime, Utc};

use core_kernel::{Amount, Iban, IdempotencyKey, PaymentId};

use crate::error::PaymentError;
use crate::status::PaymentStatus;

const NAME_MIN_CHARS: usize = 3;
const NAME_MAX_CHARS: usize = 30;

/// A payment instruction accepted for processing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Payment {
    id: PaymentId,
    debtor_iban: Iban,
    debtor_name: String,
    creditor_iban: Iban,
    creditor_name: String,
    amount: Amount,
    idempotency_key: IdempotencyKey,
    status: PaymentStatus,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Payment {
    /// Creates a new payment in `Pending` status
    ///
    /// The id is assigned by the caller. Debtor and creditor names must be
    /// 3-30 characters and the amount must be non-zero; any violation
    /// fails with [`PaymentError::Validation`] and yields no instance.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: PaymentId,
        debtor_iban: Iban,
        debtor_name: impl Into<String>,
        creditor_iban: Iban,
        creditor_name: impl Into<String>,
        amount: Amount,
        idempotency_key: IdempotencyKey,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Result<Self, PaymentError> {
        let debtor_name = debtor_name.into();
        let creditor_name = creditor_name.into();

        validate_name("debtor name", &debtor_name)?;
        validate_name("creditor name", &creditor_name)?;

        if amount.is_zero() {
            return Err(PaymentError::validation("amount must be non-zero"));
        }

        Ok(Self {
            id,
            debtor_iban,
            debtor_name,
            creditor_iban,
            creditor_name,
            amount,
            idempotency_key,
            status: PaymentStatus::Pending,
            created_at,
            updated_at,
        })
    }

    /// Transitions the payment to `Processed`
    ///
    /// The update timestamp is caller-supplied so the aggregate stays
    /// consistent with the time recorded in storage.
    pub fn mark_processed(&mut self, updated_at: DateTime<Utc>) -> Result<(), PaymentError> {
        self.transition_to(PaymentStatus::Processed, updated_at)
    }

    /// Transitions the payment to `Failed`
    pub fn mark_failed(&mut self, updated_at: DateTime<Utc>) -> Result<(), PaymentError> {
        self.transition_to(PaymentStatus::Failed, updated_at)
    }

    fn transition_to(
        &mut self,
        next: PaymentStatus,
        updated_at: DateTime<Utc>,
    ) -> Result<(), PaymentError> {
        if !self.status.can_transition_to(next) {
            return Err(PaymentError::InvalidStatusTransition {
                from: self.status,
                to: next,
            });
        }

        self.status = next;
        self.updated_at = updated_at;
        Ok(())
    }

    pub fn id(&self) -> PaymentId {
        self.id
    }

    pub fn debtor_iban(&self) -> &Iban {
        &self.debtor_iban
    }

    pub fn debtor_name(&self) -> &str {
        &self.debtor_name
    }

    pub fn creditor_iban(&self) -> &Iban {
        &self.creditor_iban
    }

    pub fn creditor_name(&self) -> &str {
        &self.creditor_name
    }

    pub fn amount(&self) -> Amount {
        self.amount
    }

    pub fn idempotency_key(&self) -> &IdempotencyKey {
        &self.idempotency_key
    }

    pub fn status(&self) -> PaymentStatus {
        self.status
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }
}

fn validate_name(field: &str, value: &str) -> Result<(), PaymentError> {
    let chars = value.chars().count();
    if !(NAME_MIN_CHARS..=NAME_MAX_CHARS).contains(&chars) {
        return Err(PaymentError::validation(format!(
            "{field} must be {NAME_MIN_CHARS}-{NAME_MAX_CHARS} characters, got {chars}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn valid_payment() -> Payment {
        let now = Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap();
        Payment::new(
            PaymentId::new(),
            Iban::new("GB82WEST12345698765432").unwrap(),
            "John Doe",
            Iban::new("FR1420041010050500013M02606").unwrap(),
            "Jane Smith",
            Amount::from_cents(10050).unwrap(),
            IdempotencyKey::new("abc123XYZ0").unwrap(),
            now,
            now,
        )
        .unwrap()
    }

    #[test]
    fn test_new_payment_is_pending() {
        let payment = valid_payment();
        assert_eq!(payment.status(), PaymentStatus::Pending);
        assert_eq!(payment.debtor_name(), "John Doe");
        assert_eq!(payment.creditor_name(), "Jane Smith");
        assert_eq!(payment.amount().cents(), 10050);
    }

    #[test]
    fn test_short_debtor_name_rejected() {
        let now = Utc::now();
        let result = Payment::new(
            PaymentId::new(),
            Iban::new("GB82WEST12345698765432").unwrap(),
            "Jo",
            Iban::new("FR1420041010050500013M02606").unwrap(),
            "Jane Smith",
            Amount::from_cents(10050).unwrap(),
            IdempotencyKey::new("abc123XYZ0").unwrap(),
            now,
            now,
        );
        assert!(matches!(result, Err(PaymentError::Validation(_))));
    }

    #[test]
    fn test_overlong_creditor_name_rejected() {
        let now = Utc::now();
        let result = Payment::new(
            PaymentId::new(),
            Iban::new("GB82WEST12345698765432").unwrap(),
            "John Doe",
            Iban::new("FR1420041010050500013M02606").unwrap(),
            "X".repeat(31),
            Amount::from_cents(10050).unwrap(),
            IdempotencyKey::new("abc123XYZ0").unwrap(),
            now,
            now,
        );
        assert!(matches!(result, Err(PaymentError::Validation(_))));
    }

    #[test]
    fn test_zero_amount_rejected() {
        let now = Utc::now();
        let result = Payment::new(
            PaymentId::new(),
            Iban::new("GB82WEST12345698765432").unwrap(),
            "John Doe",
            Iban::new("FR1420041010050500013M02606").unwrap(),
            "Jane Smith",
            Amount::zero(),
            IdempotencyKey::new("abc123XYZ0").unwrap(),
            now,
            now,
        );
        assert!(matches!(result, Err(PaymentError::Validation(_))));
    }

    #[test]
    fn test_mark_processed_succeeds_exactly_once() {
        let mut payment = valid_payment();
        let later = payment.created_at() + chrono::Duration::hours(1);

        payment.mark_processed(later).unwrap();
        assert_eq!(payment.status(), PaymentStatus::Processed);
        assert_eq!(payment.updated_at(), later);

        let err = payment.mark_processed(later).unwrap_err();
        assert_eq!(
            err,
            PaymentError::InvalidStatusTransition {
                from: PaymentStatus::Processed,
                to: PaymentStatus::Processed,
            }
        );
    }

    #[test]
    fn test_mark_failed_succeeds_exactly_once() {
        let mut payment = valid_payment();
        let later = payment.created_at() + chrono::Duration::hours(1);

        payment.mark_failed(later).unwrap();
        assert_eq!(payment.status(), PaymentStatus::Failed);

        assert!(payment.mark_failed(later).is_err());
        assert!(payment.mark_processed(later).is_err());
    }

    #[test]
    fn test_failed_transition_leaves_aggregate_unchanged() {
        let mut payment = valid_payment();
        let first = payment.created_at() + chrono::Duration::hours(1);
        payment.mark_processed(first).unwrap();

        let second = first + chrono::Duration::hours(1);
        assert!(payment.mark_failed(second).is_err());
        assert_eq!(payment.status(), PaymentStatus::Processed);
        assert_eq!(payment.updated_at(), first);
    }
}
