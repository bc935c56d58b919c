//! SQLite-backed download statistics.

use super::traits::StatsStore;
use crate::error::{DepotError, Result};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::debug;

const CREATE_TABLE_SQL: &str = r#"
    CREATE TABLE IF NOT EXISTS download_statistics (
        file_name VARCHAR(256) NOT NULL,
        file_hash VARCHAR(256) NOT NULL,
        download_count BIGINT DEFAULT 0,
        PRIMARY KEY (file_name, file_hash)
    )
"#;

const UPSERT_SQL: &str = r#"
    INSERT INTO download_statistics (file_name, file_hash, download_count)
    VALUES (?1, ?2, ?3)
    ON CONFLICT (file_name, file_hash)
    DO UPDATE SET download_count = download_statistics.download_count + ?3
"#;

/// SQLite statistics store.
///
/// Thread-safe via internal mutex on the connection. The schema is created by
/// [`StatsStore::create_schema`], normally during module initialisation.
#[derive(Clone)]
pub struct SqliteStatsStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStatsStore {
    /// Open (or create) a database file.
    pub fn open(db_path: impl AsRef<Path>) -> Result<Self> {
        let db_path = db_path.as_ref();

        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| DepotError::io_with_path(e, parent))?;
            }
        }

        let conn = Connection::open(db_path).map_err(|e| DepotError::Database {
            message: format!("Failed to open statistics database: {}", e),
            source: Some(e),
        })?;

        // WAL keeps concurrent readers off the writer's lock
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL;")
            .map_err(|e| DepotError::Database {
                message: format!("Failed to set pragmas: {}", e),
                source: Some(e),
            })?;

        debug!("Opened statistics database at {}", db_path.display());
        Ok(Self::from_connection(conn))
    }

    /// Open a private in-memory database.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Ok(Self::from_connection(conn))
    }

    fn from_connection(conn: Connection) -> Self {
        Self {
            conn: Arc::new(Mutex::new(conn)),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|e| DepotError::Database {
            message: format!("Failed to lock database: {}", e),
            source: None,
        })
    }
}

impl StatsStore for SqliteStatsStore {
    fn create_schema(&self) -> Result<()> {
        let conn = self.lock()?;
        conn.execute_batch(CREATE_TABLE_SQL)
            .map_err(|e| DepotError::Database {
                message: format!("Failed to create statistics schema: {}", e),
                source: Some(e),
            })
    }

    fn record_download(&self, file_name: &str, file_hash: &str) -> Result<()> {
        let conn = self.lock()?;
        conn.execute(UPSERT_SQL, params![file_name, file_hash, 1i64])?;
        Ok(())
    }

    fn download_count(&self, file_name: &str, file_hash: &str) -> Result<Option<i64>> {
        let conn = self.lock()?;
        let count = conn
            .query_row(
                "SELECT download_count FROM download_statistics
                 WHERE file_name = ?1 AND file_hash = ?2",
                params![file_name, file_hash],
                |row| row.get(0),
            )
            .optional()?;
        Ok(count)
    }
}

impl std::fmt::Debug for SqliteStatsStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteStatsStore").finish_non_exhaustive()
    }
}
