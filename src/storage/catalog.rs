//! Persisted index of saved voice messages.
//!
//! One append-only SQLite table maps a sender to the path of the stored
//! original audio. The schema is created lazily on first write and the
//! create is idempotent, so it is safe to run on every append.
//!
//! Each operation opens its own connection and runs on the blocking
//! pool; one inbound event is processed at a time, so there is no
//! connection pool to manage.

use std::path::{Path, PathBuf};

use rusqlite::{params, Connection, OpenFlags};
use thiserror::Error;

const TABLE: &str = "audio_messages";

// user_id holds the sender display name; the column name is kept for
// compatibility with existing databases.
const SCHEMA: &str = "CREATE TABLE IF NOT EXISTS audio_messages (user_id TEXT, audio_path TEXT)";

/// Errors from catalog operations
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("catalog task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// Append-only catalog of saved voice messages
#[derive(Debug, Clone)]
pub struct AudioCatalog {
    db_path: PathBuf,
}

impl AudioCatalog {
    /// Create a catalog backed by the given database file
    pub fn new(db_path: impl Into<PathBuf>) -> Self {
        Self {
            db_path: db_path.into(),
        }
    }

    /// Path of the backing database file
    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    /// Create the table if it does not exist. Safe to call repeatedly.
    pub async fn ensure_schema(&self) -> Result<(), CatalogError> {
        let db = self.db_path.clone();

        tokio::task::spawn_blocking(move || -> Result<(), CatalogError> {
            let conn = Connection::open(&db)?;
            conn.execute(SCHEMA, [])?;
            Ok(())
        })
        .await?
    }

    /// Append one row, creating the table first if needed.
    pub async fn append(&self, sender: &str, path: &str) -> Result<(), CatalogError> {
        let db = self.db_path.clone();
        let sender = sender.to_owned();
        let path = path.to_owned();

        tokio::task::spawn_blocking(move || -> Result<(), CatalogError> {
            let conn = Connection::open(&db)?;
            conn.execute(SCHEMA, [])?;
            conn.execute(
                "INSERT INTO audio_messages (user_id, audio_path) VALUES (?1, ?2)",
                params![sender, path],
            )?;
            Ok(())
        })
        .await?
    }

    /// All stored audio paths.
    ///
    /// The table is append-only, so the rowid scan order is insertion
    /// order.
    pub async fn all_paths(&self) -> Result<Vec<String>, CatalogError> {
        let db = self.db_path.clone();

        tokio::task::spawn_blocking(move || -> Result<Vec<String>, CatalogError> {
            let conn = Connection::open_with_flags(&db, OpenFlags::SQLITE_OPEN_READ_ONLY)?;
            let mut stmt = conn.prepare("SELECT audio_path FROM audio_messages")?;
            let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;
            Ok(rows.collect::<Result<Vec<_>, _>>()?)
        })
        .await?
    }

    /// Whether the catalog table exists. Never creates the database file.
    pub async fn exists(&self) -> Result<bool, CatalogError> {
        if !self.db_path.exists() {
            return Ok(false);
        }

        let db = self.db_path.clone();

        tokio::task::spawn_blocking(move || -> Result<bool, CatalogError> {
            let conn = Connection::open_with_flags(&db, OpenFlags::SQLITE_OPEN_READ_ONLY)?;
            let count: i64 = conn.query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?1",
                params![TABLE],
                |row| row.get(0),
            )?;
            Ok(count > 0)
        })
        .await?
    }
}
