//! SQLite open/configure/migrate for the marketplace catalogue.

use std::path::Path;

use rusqlite::Connection;

use super::DatabaseError;

/// Open (or create) the catalogue database and run migrations.
pub fn open_database(db_path: &Path) -> Result<Connection, DatabaseError> {
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| {
            DatabaseError::ConstraintViolation(format!("cannot create data directory: {e}"))
        })?;
    }
    let conn = Connection::open(db_path)?;
    configure_pragmas(&conn)?;
    run_migrations(&conn)?;
    Ok(conn)
}

/// Open an in-memory database (for testing).
pub fn open_memory_database() -> Result<Connection, DatabaseError> {
    let conn = Connection::open_in_memory()?;
    configure_pragmas(&conn)?;
    run_migrations(&conn)?;
    Ok(conn)
}

fn configure_pragmas(conn: &Connection) -> Result<(), DatabaseError> {
    conn.pragma_update(None, "journal_mode", "WAL")?;
    conn.pragma_update(None, "foreign_keys", "ON")?;
    Ok(())
}

/// Run all pending migrations.
fn run_migrations(conn: &Connection) -> Result<(), DatabaseError> {
    let current_version = get_current_version(conn);

    let migrations: Vec<(i64, &str)> = vec![(
        1,
        include_str!("../../resources/migrations/001_init.sql"),
    )];

    for (version, sql) in migrations {
        if version > current_version {
            tracing::info!("Running migration v{version}");
            conn.execute_batch(sql)
                .map_err(|e| DatabaseError::MigrationFailed {
                    version,
                    reason: e.to_string(),
                })?;
        }
    }

    Ok(())
}

/// Current schema version (0 if no schema exists yet).
fn get_current_version(conn: &Connection) -> i64 {
    conn.query_row("SELECT MAX(version) FROM schema_version", [], |row| {
        row.get::<_, i64>(0)
    })
    .unwrap_or(0)
}

/// Count tables in the database (for verification).
pub fn count_tables(conn: &Connection) -> Result<i64, DatabaseError> {
    let count = conn.query_row(
        "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name NOT LIKE 'sqlite_%'",
        [],
        |row| row.get::<_, i64>(0),
    )?;
    Ok(count)
}
