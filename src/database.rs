use rusqlite::{Connection, OptionalExtension};
use std::path::PathBuf;
use thiserror::Error;

/// Slot holding the serialized task collection
pub const TASKS_SLOT: &str = "tasks";

#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("SQLite error: {0}")]
    SqliteError(#[from] rusqlite::Error),
    #[error("Failed to create database directory: {0}")]
    DirectoryError(String),
}

/// Key/value storage backed by a single SQLite table.
/// Each slot holds one complete text payload that is replaced as a whole.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Create a new database connection and initialize the schema
    pub fn new(path: &str) -> Result<Self, DatabaseError> {
        let db_path = PathBuf::from(path);

        // Create parent directory if it doesn't exist
        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| DatabaseError::DirectoryError(e.to_string()))?;
            }
        }

        let conn = Connection::open(&db_path)?;

        let db = Database { conn };
        db.initialize_schema()?;

        Ok(db)
    }

    /// Open a private in-memory database (used by tests and dry runs)
    pub fn open_in_memory() -> Result<Self, DatabaseError> {
        let db = Database {
            conn: Connection::open_in_memory()?,
        };
        db.initialize_schema()?;
        Ok(db)
    }

    fn initialize_schema(&self) -> Result<(), DatabaseError> {
        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS slots (
                key             TEXT PRIMARY KEY,
                value           TEXT NOT NULL,
                updated_at      TEXT NOT NULL
            )",
            [],
        )?;

        Ok(())
    }

    /// Read a slot's payload, `None` if the slot was never written
    pub fn read_slot(&self, key: &str) -> Result<Option<String>, DatabaseError> {
        let value = self
            .conn
            .query_row(
                "SELECT value FROM slots WHERE key = ?1",
                rusqlite::params![key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(value)
    }

    /// Replace a slot's payload. The write runs in its own transaction so
    /// readers never observe a partially written value.
    pub fn write_slot(&mut self, key: &str, value: &str) -> Result<(), DatabaseError> {
        let now = chrono::Utc::now().format("%Y-%m-%d %H:%M:%S").to_string();
        let tx = self.conn.transaction()?;
        tx.execute(
            "INSERT INTO slots (key, value, updated_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
            rusqlite::params![key, value, now],
        )?;
        tx.commit()?;
        Ok(())
    }

    /// Get a reference to the underlying connection
    pub fn conn(&self) -> &Connection {
        &self.conn
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_slot_reads_as_none() {
        let db = Database::open_in_memory().unwrap();
        assert_eq!(db.read_slot(TASKS_SLOT).unwrap(), None);
    }

    #[test]
    fn write_replaces_previous_payload() {
        let mut db = Database::open_in_memory().unwrap();
        db.write_slot(TASKS_SLOT, "[1]").unwrap();
        db.write_slot(TASKS_SLOT, "[2]").unwrap();

        assert_eq!(db.read_slot(TASKS_SLOT).unwrap().as_deref(), Some("[2]"));
        let rows: i64 = db
            .conn()
            .query_row("SELECT COUNT(*) FROM slots", [], |row| row.get(0))
            .unwrap();
        assert_eq!(rows, 1);
    }

    #[test]
    fn file_database_creates_parent_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("tasks.db");
        let mut db = Database::new(path.to_str().unwrap()).unwrap();
        db.write_slot(TASKS_SLOT, "[]").unwrap();
        drop(db);

        let reopened = Database::new(path.to_str().unwrap()).unwrap();
        assert_eq!(reopened.read_slot(TASKS_SLOT).unwrap().as_deref(), Some("[]"));
    }
}
