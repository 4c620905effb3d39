//! Database test utilities
//!
//! Provides an in-memory SQLite database with the full production schema
//! applied. The pool holds a single connection (each SQLite connection owns
//! its own `:memory:` database), so every handle observes the same state.

use std::sync::Arc;

use core_kernel::SystemClock;
use infra_db::{create_in_memory_pool, DatabasePool, MigrationSet, Migrator};

/// Creates an in-memory database with all embedded migrations applied
///
/// # Panics
///
/// Panics if the pool cannot be created or a migration fails; either is a
/// broken test environment, not a condition tests should handle.
pub async fn in_memory_database() -> DatabasePool {
    let pool = create_in_memory_pool()
        .await
        .expect("failed to create in-memory database pool");

    Migrator::new(pool.clone(), MigrationSet::embedded(), Arc::new(SystemClock))
        .run()
        .await
        .expect("failed to migrate in-memory database");

    pool
}
