pub mod repository;
pub mod sqlite;

pub use repository::*;
pub use sqlite::*;

use std::path::Path;
use std::sync::Mutex;

use rusqlite::Connection;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DatabaseError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("{entity_type} not found: {id}")]
    NotFound { entity_type: String, id: String },

    #[error("Migration failed at version {version}: {reason}")]
    MigrationFailed { version: i64, reason: String },

    #[error("Invalid timestamp in {field}: {value}")]
    InvalidTimestamp { field: String, value: String },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Database connection lock poisoned")]
    LockPoisoned,

    #[error("Database is closed")]
    Closed,
}

impl DatabaseError {
    pub fn not_found(entity_type: &str, id: &str) -> Self {
        DatabaseError::NotFound {
            entity_type: entity_type.to_string(),
            id: id.to_string(),
        }
    }
}

/// Process-wide store handle.
///
/// Opened once at startup and shared through `CoreState`. Every operation
/// borrows the single connection for the duration of one closure; callers
/// must not hold it across an `.await`.
pub struct Database {
    conn: Mutex<Option<Connection>>,
}

impl Database {
    /// Open (or create) the database file and run migrations.
    pub fn open(path: &Path) -> Result<Self, DatabaseError> {
        Ok(Self::from_connection(open_database(path)?))
    }

    /// In-memory database (for testing and `DATABASE_PATH=:memory:`).
    pub fn open_in_memory() -> Result<Self, DatabaseError> {
        Ok(Self::from_connection(open_memory_database()?))
    }

    fn from_connection(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(Some(conn)),
        }
    }

    /// Run `f` against the shared connection.
    pub fn with_conn<T>(
        &self,
        f: impl FnOnce(&Connection) -> Result<T, DatabaseError>,
    ) -> Result<T, DatabaseError> {
        let guard = self.conn.lock().map_err(|_| DatabaseError::LockPoisoned)?;
        let conn = guard.as_ref().ok_or(DatabaseError::Closed)?;
        f(conn)
    }

    /// Close the connection. Later calls to `with_conn` fail with `Closed`.
    pub fn close(&self) -> Result<(), DatabaseError> {
        let mut guard = self.conn.lock().map_err(|_| DatabaseError::LockPoisoned)?;
        if let Some(conn) = guard.take() {
            conn.close().map_err(|(_, e)| DatabaseError::Sqlite(e))?;
            tracing::info!("Database connection closed");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn with_conn_runs_queries() {
        let db = Database::open_in_memory().unwrap();
        let one: i64 = db
            .with_conn(|conn| Ok(conn.query_row("SELECT 1", [], |row| row.get(0))?))
            .unwrap();
        assert_eq!(one, 1);
    }

    #[test]
    fn closed_database_rejects_work() {
        let db = Database::open_in_memory().unwrap();
        db.close().unwrap();
        let result = db.with_conn(|_| Ok(()));
        assert!(matches!(result, Err(DatabaseError::Closed)));
        // Second close is a no-op
        assert!(db.close().is_ok());
    }

    #[test]
    fn not_found_message_names_entity() {
        let err = DatabaseError::not_found("Patient", "abc");
        assert_eq!(err.to_string(), "Patient not found: abc");
    }
}
