//! Schema migration engine
//!
//! Migrations are versioned, one-time schema-change scripts applied exactly
//! once per database instance, strictly in ascending version order. The
//! available set is an immutable, injected collection so the engine can be
//! tested against arbitrary scripts; [`MigrationSet::embedded`] supplies
//! the production scripts compiled into the binary.
//!
//! Each application is one transaction: the script body runs, then a
//! tracking row is inserted. If either step fails the transaction rolls
//! back and the run halts before later versions are attempted, so no
//! partial schema state persists.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use core_kernel::Clock;

use crate::error::DatabaseError;
use crate::pool::DatabasePool;

/// A schema migration, identified by its version number
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Migration {
    /// Strictly increasing version parsed from the script name
    pub version: i64,
    /// Descriptive name, the script file name without version and suffix
    pub name: String,
    /// The script body, executed verbatim
    pub sql: String,
    /// When the migration was applied, if it has been
    pub applied_at: Option<DateTime<Utc>>,
}

/// An immutable, version-ordered collection of migration scripts
#[derive(Debug, Clone)]
pub struct MigrationSet {
    migrations: Vec<Migration>,
}

impl MigrationSet {
    /// Builds a set from `(file_name, body)` pairs
    ///
    /// File names must match `NNN_descriptive_name.sql` with a 3-digit
    /// zero-padded version. Malformed names and duplicate versions are
    /// fatal: they indicate a broken deployment, not a runtime condition.
    pub fn from_scripts(scripts: &[(&str, &str)]) -> Result<Self, DatabaseError> {
        let mut migrations = Vec::with_capacity(scripts.len());
        for (file_name, body) in scripts {
            let (version, name) = parse_script_name(file_name)?;
            migrations.push(Migration {
                version,
                name,
                sql: body.to_string(),
                applied_at: None,
            });
        }

        migrations.sort_by_key(|m| m.version);
        for pair in migrations.windows(2) {
            if pair[0].version == pair[1].version {
                return Err(DatabaseError::DuplicateMigrationVersion(pair[0].version));
            }
        }

        Ok(Self { migrations })
    }

    /// The production migration scripts compiled into the binary
    pub fn embedded() -> Self {
        Self::from_scripts(&[
            (
                "001_create_payments_table.sql",
                include_str!("../migrations/001_create_payments_table.sql"),
            ),
            (
                "002_create_payments_indexes.sql",
                include_str!("../migrations/002_create_payments_indexes.sql"),
            ),
        ])
        .expect("embedded migration scripts are well-formed")
    }

    /// Iterates migrations in ascending version order
    pub fn iter(&self) -> impl Iterator<Item = &Migration> {
        self.migrations.iter()
    }

    pub fn len(&self) -> usize {
        self.migrations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.migrations.is_empty()
    }
}

fn parse_script_name(file_name: &str) -> Result<(i64, String), DatabaseError> {
    let invalid = || DatabaseError::InvalidMigrationName(file_name.to_string());

    let stem = file_name.strip_suffix(".sql").ok_or_else(invalid)?;
    let (prefix, name) = stem.split_once('_').ok_or_else(invalid)?;

    if prefix.len() != 3 || !prefix.bytes().all(|b| b.is_ascii_digit()) || name.is_empty() {
        return Err(invalid());
    }

    // The length check above keeps the parse infallible
    let version: i64 = prefix.parse().map_err(|_| invalid())?;

    Ok((version, name.to_string()))
}

/// Applies pending migrations and reports migration status
pub struct Migrator {
    pool: DatabasePool,
    set: MigrationSet,
    clock: Arc<dyn Clock>,
}

impl Migrator {
    pub fn new(pool: DatabasePool, set: MigrationSet, clock: Arc<dyn Clock>) -> Self {
        Self { pool, set, clock }
    }

    /// Applies all pending migrations in ascending version order
    ///
    /// Running against an already-fully-migrated database is a no-op.
    /// Returns the number of migrations applied.
    pub async fn run(&self) -> Result<usize, DatabaseError> {
        self.ensure_tracking_table().await?;

        let applied = self.applied_versions().await?;
        let pending: Vec<&Migration> = self
            .set
            .iter()
            .filter(|m| !applied.contains_key(&m.version))
            .collect();

        if pending.is_empty() {
            debug!("schema is up to date");
            return Ok(0);
        }

        for migration in &pending {
            self.apply(migration).await?;
        }

        Ok(pending.len())
    }

    /// Merges the available and applied sets by version number
    ///
    /// Every known version appears exactly once, sorted ascending, with
    /// `applied_at` set for versions recorded in the tracking table.
    pub async fn status(&self) -> Result<Vec<Migration>, DatabaseError> {
        self.ensure_tracking_table().await?;

        let mut by_version: BTreeMap<i64, Migration> = self
            .set
            .iter()
            .map(|m| (m.version, m.clone()))
            .collect();

        for (version, (name, applied_at)) in self.applied_versions().await? {
            by_version
                .entry(version)
                .and_modify(|m| m.applied_at = Some(applied_at))
                .or_insert_with(|| Migration {
                    version,
                    name,
                    sql: String::new(),
                    applied_at: Some(applied_at),
                });
        }

        Ok(by_version.into_values().collect())
    }

    async fn ensure_tracking_table(&self) -> Result<(), DatabaseError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS schema_migrations (
                version INTEGER PRIMARY KEY,
                name TEXT NOT NULL,
                applied_at DATETIME NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| DatabaseError::from(&e))?;

        Ok(())
    }

    async fn applied_versions(
        &self,
    ) -> Result<BTreeMap<i64, (String, DateTime<Utc>)>, DatabaseError> {
        let rows: Vec<(i64, String, DateTime<Utc>)> = sqlx::query_as(
            "SELECT version, name, applied_at FROM schema_migrations ORDER BY version",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DatabaseError::from(&e))?;

        Ok(rows
            .into_iter()
            .map(|(version, name, applied_at)| (version, (name, applied_at)))
            .collect())
    }

    async fn apply(&self, migration: &Migration) -> Result<(), DatabaseError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DatabaseError::TransactionFailed(e.to_string()))?;

        sqlx::raw_sql(&migration.sql)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                DatabaseError::MigrationFailed(format!(
                    "{:03}_{}: {e}",
                    migration.version, migration.name
                ))
            })?;

        sqlx::query("INSERT INTO schema_migrations (version, name, applied_at) VALUES (?1, ?2, ?3)")
            .bind(migration.version)
            .bind(&migration.name)
            .bind(self.clock.now())
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                DatabaseError::MigrationFailed(format!(
                    "recording {:03}_{}: {e}",
                    migration.version, migration.name
                ))
            })?;

        tx.commit()
            .await
            .map_err(|e| DatabaseError::TransactionFailed(e.to_string()))?;

        info!(
            version = migration.version,
            name = %migration.name,
            "applied migration"
        );
        Ok(())
    }
}
