//! Core Kernel - Foundational types for the payment intake service
//!
//! This crate provides the building blocks used across the domain and
//! infrastructure layers:
//! - Self-validating value objects (IBAN, monetary amount, idempotency key)
//! - Strongly-typed payment identifier
//! - The clock port for injectable time

pub mod money;
pub mod iban;
pub mod idempotency;
pub mod identifiers;
pub mod clock;
pub mod error;

pub use money::{Amount, AmountError};
pub use iban::{Iban, IbanError};
pub use idempotency::{IdempotencyKey, IdempotencyKeyError};
pub use identifiers::PaymentId;
pub use clock::{Clock, SystemClock, FixedClock};
pub use error::CoreError;
