//! Infrastructure Database Layer
//!
//! This crate provides the persistence infrastructure for the payment
//! intake service against a single embedded SQLite store, using SQLx.
//!
//! # Architecture
//!
//! The crate follows the repository pattern: [`repositories::SqlitePaymentRepository`]
//! implements the domain's repository port, translating aggregate
//! operations into parameterized statements and mapping constraint
//! violations back to domain errors. [`migrate::Migrator`] evolves the
//! schema at startup, before the store is opened for traffic.
//!
//! # Idempotency
//!
//! Duplicate submissions are rejected by the UNIQUE constraint on the
//! idempotency key, so the check-and-insert is atomic under concurrent
//! callers; there is no read-then-write window.

pub mod pool;
pub mod error;
pub mod migrate;
pub mod repositories;

pub use pool::{DatabasePool, DatabaseConfig, create_pool, create_in_memory_pool, ping};
pub use error::DatabaseError;
pub use migrate::{Migration, MigrationSet, Migrator};
pub use repositories::SqlitePaymentRepository;
