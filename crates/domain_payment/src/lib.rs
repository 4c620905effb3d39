//! Payment Domain - Intake aggregate and orchestration
//!
//! This crate owns the payment aggregate and its status state machine, the
//! repository port consumed by callers and implemented by the storage
//! adapter, and the application service that orchestrates idempotency
//! checks and status transitions.
//!
//! # Invariants
//!
//! - A payment is created `Pending` and only ever leaves that status via
//!   `mark_processed` or `mark_failed`; terminal statuses are immutable.
//! - Debtor and creditor names are 3-30 characters; the amount is never
//!   zero.
//! - Duplicate submissions are detected at the storage layer's uniqueness
//!   constraint, never by a read-then-write check.

pub mod payment;
pub mod status;
pub mod ports;
pub mod service;
pub mod error;

pub use payment::Payment;
pub use status::PaymentStatus;
pub use ports::{PaymentRepository, RepositoryError};
pub use service::{NewPayment, PaymentService, ServiceError};
pub use error::PaymentError;
