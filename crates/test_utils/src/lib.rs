//! Test Utilities
//!
//! Shared helpers for the workspace's integration tests: an in-memory,
//! fully migrated SQLite database and valid-by-default aggregate builders.

pub mod database;
pub mod builders;

pub use database::in_memory_database;
pub use builders::{fresh_idempotency_key, PaymentBuilder};
