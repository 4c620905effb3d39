//! Builders for test aggregates
//!
//! Builders produce valid instances by default; individual fields can be
//! overridden to probe specific invariants.

use chrono::{DateTime, TimeZone, Utc};
use uuid::Uuid;

use core_kernel::{Amount, Iban, IdempotencyKey, PaymentId};
use domain_payment::Payment;

/// Generates a fresh, unique 10-character idempotency key
pub fn fresh_idempotency_key() -> IdempotencyKey {
    let hex = Uuid::new_v4().simple().to_string();
    IdempotencyKey::new(&hex[..10]).expect("uuid hex prefix is alphanumeric")
}

/// Fluent builder for valid payment aggregates
#[derive(Debug, Clone)]
pub struct PaymentBuilder {
    id: PaymentId,
    debtor_iban: String,
    debtor_name: String,
    creditor_iban: String,
    creditor_name: String,
    amount_cents: i64,
    idempotency_key: IdempotencyKey,
    created_at: DateTime<Utc>,
}

impl PaymentBuilder {
    pub fn new() -> Self {
        Self {
            id: PaymentId::new(),
            debtor_iban: "GB82WEST12345698765432".to_string(),
            debtor_name: "John Doe".to_string(),
            creditor_iban: "FR1420041010050500013M02606".to_string(),
            creditor_name: "Jane Smith".to_string(),
            amount_cents: 10050,
            idempotency_key: fresh_idempotency_key(),
            created_at: Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap(),
        }
    }

    pub fn id(mut self, id: PaymentId) -> Self {
        self.id = id;
        self
    }

    pub fn debtor_name(mut self, name: impl Into<String>) -> Self {
        self.debtor_name = name.into();
        self
    }

    pub fn creditor_name(mut self, name: impl Into<String>) -> Self {
        self.creditor_name = name.into();
        self
    }

    pub fn amount_cents(mut self, cents: i64) -> Self {
        self.amount_cents = cents;
        self
    }

    pub fn idempotency_key(mut self, key: IdempotencyKey) -> Self {
        self.idempotency_key = key;
        self
    }

    pub fn created_at(mut self, at: DateTime<Utc>) -> Self {
        self.created_at = at;
        self
    }

    /// Builds the aggregate, panicking on invalid overrides
    pub fn build(self) -> Payment {
        Payment::new(
            self.id,
            Iban::new(&self.debtor_iban).expect("builder debtor IBAN is valid"),
            self.debtor_name,
            Iban::new(&self.creditor_iban).expect("builder creditor IBAN is valid"),
            self.creditor_name,
            Amount::from_cents(self.amount_cents).expect("builder amount is valid"),
            self.idempotency_key,
            self.created_at,
            self.created_at,
        )
        .expect("builder produced an invalid payment")
    }
}

impl Default for PaymentBuilder {
    fn default() -> Self {
        Self::new()
    }
}
