pub mod repository;
pub mod sqlite;

pub use sqlite::*;

use std::sync::{Arc, Mutex};

use rusqlite::Connection;
use thiserror::Error;

/// Shared handle to the SQLite connection. Locked per query; no lock is held
/// across await points.
pub type Db = Arc<Mutex<Connection>>;

#[derive(Error, Debug)]
pub enum DatabaseError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Entity not found: {entity_type} with id {id}")]
    NotFound { entity_type: String, id: String },

    #[error("Migration failed at version {version}: {reason}")]
    MigrationFailed { version: i64, reason: String },

    #[error("Constraint violated: {0}")]
    ConstraintViolation(String),

    #[error("Database lock poisoned")]
    LockPoisoned,
}

/// Wrap a connection in the shared handle type.
pub fn shared(conn: Connection) -> Db {
    Arc::new(Mutex::new(conn))
}

/// Run a closure against the shared connection.
pub fn with_conn<T>(
    db: &Db,
    f: impl FnOnce(&Connection) -> Result<T, DatabaseError>,
) -> Result<T, DatabaseError> {
    let conn = db.lock().map_err(|_| DatabaseError::LockPoisoned)?;
    f(&conn)
}
