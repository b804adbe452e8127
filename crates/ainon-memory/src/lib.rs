//! SQLite persistence backends for the Ainon action recorder.
//!
//! Implements both capability traits over a shared connection:
//! - **TimelineStore**: per-wallet conversational memory (ordered, idempotent)
//! - **SemanticIndex**: knowledge documents with content search
//!
//! The process entry point opens the store once and injects the handles into
//! the recorder; this crate owns no global state.

pub mod migration;
pub mod semantic;
pub mod timeline;

pub use semantic::SemanticIndex;
pub use timeline::TimelineStore;

use ainon_types::error::BackendError;
use rusqlite::Connection;
use std::path::Path;
use std::sync::{Arc, Mutex};

/// Shared SQLite connection handle.
pub type SharedConnection = Arc<Mutex<Connection>>;

/// Open (or create) the database at `path`, run migrations, and return the
/// shared connection handle. Lifecycle is owned by the caller.
pub fn open_store(path: &Path) -> Result<SharedConnection, BackendError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| BackendError::Permanent(e.to_string()))?;
    }
    let conn = Connection::open(path).map_err(classify_sqlite)?;
    migration::run_migrations(&conn).map_err(classify_sqlite)?;
    Ok(Arc::new(Mutex::new(conn)))
}

/// Open an in-memory store. Used by tests and ephemeral runs.
pub fn open_in_memory() -> Result<SharedConnection, BackendError> {
    let conn = Connection::open_in_memory().map_err(classify_sqlite)?;
    migration::run_migrations(&conn).map_err(classify_sqlite)?;
    Ok(Arc::new(Mutex::new(conn)))
}

/// Map a driver error onto the transient/permanent taxonomy.
///
/// Busy/locked means another connection holds the database; that clears.
/// Everything else (constraint violations, schema mismatches, corruption)
/// will not get better on retry.
pub(crate) fn classify_sqlite(e: rusqlite::Error) -> BackendError {
    match &e {
        rusqlite::Error::SqliteFailure(err, _) => match err.code {
            rusqlite::ErrorCode::DatabaseBusy | rusqlite::ErrorCode::DatabaseLocked => {
                BackendError::Transient(e.to_string())
            }
            _ => BackendError::Permanent(e.to_string()),
        },
        _ => BackendError::Permanent(e.to_string()),
    }
}
