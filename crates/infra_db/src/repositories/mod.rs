//! Repository implementations for domain aggregates
//!
//! Each repository encapsulates the SQL statements for one aggregate and
//! maps between database rows and domain types. Rows are never trusted:
//! every persisted value object is re-validated on load, and the persisted
//! status is replayed through the aggregate's own state machine.

pub mod payment;

pub use payment::SqlitePaymentRepository;
