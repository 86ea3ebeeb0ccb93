//! Repository for the read-only usage corpus.

use diesel::prelude::*;
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use langman_core::Language;
use rand::seq::IndexedRandom;
use tracing::{debug, info, instrument};

use crate::db::{DbError, DbErrorKind, Usage, connect, schema};

const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations/usage");

/// Database repository for usage examples.
#[derive(Debug, Clone)]
pub struct UsageRepository {
    db_path: String,
}

impl UsageRepository {
    /// Creates a new repository for the database at the given path.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the path is empty.
    #[instrument(skip(db_path), fields(db_path = %db_path))]
    pub fn new(db_path: String) -> Result<Self, DbError> {
        if db_path.trim().is_empty() {
            return Err(DbError::new("Usage database path is empty"));
        }
        info!(path = %db_path, "Creating UsageRepository");
        Ok(Self { db_path })
    }

    /// Establishes a database connection.
    #[instrument(skip(self))]
    fn connection(&self) -> Result<SqliteConnection, DbError> {
        connect(&self.db_path)
    }

    /// Creates the usage schema if it does not exist yet.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a migration fails.
    #[instrument(skip(self))]
    pub fn run_migrations(&self) -> Result<(), DbError> {
        let mut conn = self.connection()?;
        let applied = conn
            .run_pending_migrations(MIGRATIONS)
            .map_err(|e| {
                DbError::with_kind(
                    DbErrorKind::Migration,
                    format!("Usage migrations failed: {}", e),
                )
            })?;
        info!(count = applied.len(), "Usage migrations applied");
        Ok(())
    }

    /// Counts corpus rows.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs.
    #[instrument(skip(self))]
    pub fn count(&self) -> Result<i64, DbError> {
        let mut conn = self.connection()?;
        let count: i64 = schema::usages::table.count().get_result(&mut conn)?;
        debug!(count, "Usages counted");
        Ok(count)
    }

    /// Inserts corpus rows in a single transaction, returning the number
    /// inserted.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if any row conflicts or a database error occurs.
    #[instrument(skip(self, usages), fields(count = usages.len()))]
    pub fn insert_usages(&self, usages: &[Usage]) -> Result<usize, DbError> {
        let mut conn = self.connection()?;
        let inserted = conn.immediate_transaction::<_, diesel::result::Error, _>(|conn| {
            diesel::insert_into(schema::usages::table)
                .values(usages)
                .execute(conn)
        })?;
        info!(inserted, "Usages inserted");
        Ok(inserted)
    }

    /// Gets a usage by id. Returns `None` if not found.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs.
    #[instrument(skip(self))]
    pub fn get_usage(&self, usage_id: i32) -> Result<Option<Usage>, DbError> {
        let mut conn = self.connection()?;
        let usage = schema::usages::table
            .find(usage_id)
            .select(Usage::as_select())
            .first(&mut conn)
            .optional()?;
        debug!(found = usage.is_some(), "Usage lookup");
        Ok(usage)
    }

    /// Picks a usage uniformly at random among those in `language`.
    /// Returns `None` if the corpus has no entry for it.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs.
    #[instrument(skip(self))]
    pub fn random_usage(&self, language: Language) -> Result<Option<Usage>, DbError> {
        let mut conn = self.connection()?;
        let ids: Vec<i32> = schema::usages::table
            .filter(schema::usages::language.eq(language.code()))
            .select(schema::usages::usage_id)
            .load(&mut conn)?;

        let Some(&usage_id) = ids.choose(&mut rand::rng()) else {
            debug!(%language, "No usages for language");
            return Ok(None);
        };

        debug!(usage_id, candidates = ids.len(), "Usage picked");
        let usage = schema::usages::table
            .find(usage_id)
            .select(Usage::as_select())
            .first(&mut conn)
            .optional()?;
        Ok(usage)
    }
}
