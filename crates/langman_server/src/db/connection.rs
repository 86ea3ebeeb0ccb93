//! SQLite connection setup shared by both repositories.

use diesel::connection::SimpleConnection;
use diesel::prelude::*;
use tracing::{debug, instrument};

use crate::db::{DbError, DbErrorKind};

/// How long a connection waits on a locked database before failing.
const BUSY_TIMEOUT_MS: u32 = 5000;

/// Opens a connection with a busy timeout and WAL journaling, so
/// concurrent request handlers queue on the write lock instead of failing.
///
/// # Errors
///
/// Returns [`DbError`] of kind [`DbErrorKind::Connection`] if the database
/// cannot be opened or configured.
#[instrument]
pub fn connect(db_path: &str) -> Result<SqliteConnection, DbError> {
    debug!("Establishing connection");
    let mut conn = SqliteConnection::establish(db_path).map_err(|e| {
        DbError::with_kind(
            DbErrorKind::Connection,
            format!("Failed to connect to '{}': {}", db_path, e),
        )
    })?;

    // busy_timeout must come first so the journal switch can wait too.
    conn.batch_execute(&format!(
        "PRAGMA busy_timeout = {}; PRAGMA journal_mode = WAL;",
        BUSY_TIMEOUT_MS
    ))
    .map_err(|e| {
        DbError::with_kind(
            DbErrorKind::Connection,
            format!("Failed to configure '{}': {}", db_path, e),
        )
    })?;

    Ok(conn)
}
