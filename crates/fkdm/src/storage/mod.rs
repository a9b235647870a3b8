//! Slot storage for fkdm.
//!
//! The application persists exactly two JSON documents, the session and the
//! report list, each under its own named slot. [`SlotStore`] is the port
//! the rest of the crate talks to; [`SqliteStore`] keeps slots on disk and
//! [`MemoryStore`] keeps them in process memory.
//!
//! Both implementations enforce an optional byte quota. A write that would
//! push the total of stored keys and values past the quota is rejected and
//! the previous value of the slot stays in place.

mod memory;
pub mod migrations;
pub mod schema;

use std::path::{Path, PathBuf};

use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use tracing::{debug, info};

use crate::error::{Error, Result};

pub use memory::MemoryStore;

/// Named JSON slots.
///
/// Writes replace the whole slot. Implementations are single-threaded; a
/// caller that shares one store between components wraps it in an `Rc`.
pub trait SlotStore: std::fmt::Debug {
    /// Read a slot, `None` if it was never written or has been removed.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store cannot be read.
    fn read(&self, key: &str) -> Result<Option<String>>;

    /// Replace the contents of a slot.
    ///
    /// # Errors
    ///
    /// Returns [`Error::QuotaExceeded`] if the write would exceed the quota,
    /// or a storage error if the backing store rejects it.
    fn write(&self, key: &str, value: &str) -> Result<()>;

    /// Remove a slot. Removing an absent slot is not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store rejects the removal.
    fn remove(&self, key: &str) -> Result<()>;

    /// Total bytes held by all slots, keys included.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store cannot be read.
    fn used_bytes(&self) -> Result<u64>;

    /// The configured quota, `None` when unlimited.
    fn quota(&self) -> Option<u64>;
}

/// Check a prospective total against a quota.
pub(crate) fn check_quota(key: &str, needed: u64, quota: Option<u64>) -> Result<()> {
    match quota {
        Some(quota) if needed > quota => Err(Error::QuotaExceeded {
            key: key.to_string(),
            needed,
            quota,
        }),
        _ => Ok(()),
    }
}

/// Bytes a single slot occupies towards the quota.
pub(crate) fn slot_size(key: &str, value: &str) -> u64 {
    (key.len() + value.len()) as u64
}

/// `SQLite`-backed slot store.
#[derive(Debug)]
pub struct SqliteStore {
    /// Path to the database file.
    path: PathBuf,
    /// Database connection.
    conn: Connection,
    /// Byte quota, `None` when unlimited.
    quota: Option<u64>,
}

impl SqliteStore {
    /// Open or create a slot database at the given path.
    ///
    /// Creates the parent directories and database file if they don't exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or schema initialization fails.
    pub fn open(path: impl AsRef<Path>, quota: Option<u64>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|source| Error::DirectoryCreate {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
        }

        debug!("Opening slot database at {}", path.display());
        let conn = Connection::open(&path).map_err(|source| Error::DatabaseOpen {
            path: path.clone(),
            source,
        })?;

        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL;")?;
        migrations::initialize_schema(&conn)?;

        info!("Slot database opened at {}", path.display());
        Ok(Self { path, conn, quota })
    }

    /// Create an in-memory `SQLite` store, mostly for tests.
    ///
    /// # Errors
    ///
    /// Returns an error if the in-memory database cannot be created.
    pub fn open_in_memory(quota: Option<u64>) -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(|source| Error::DatabaseOpen {
            path: PathBuf::from(":memory:"),
            source,
        })?;

        migrations::initialize_schema(&conn)?;

        Ok(Self {
            path: PathBuf::from(":memory:"),
            conn,
            quota,
        })
    }

    /// Get the path to the database file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Bytes held by every slot other than `key`.
    fn used_bytes_excluding(&self, key: &str) -> Result<u64> {
        let used: i64 = self.conn.query_row(
            r"
            SELECT COALESCE(SUM(LENGTH(CAST(key AS BLOB)) + LENGTH(CAST(value AS BLOB))), 0)
            FROM slots WHERE key != ?1
            ",
            [key],
            |row| row.get(0),
        )?;
        Ok(u64::try_from(used).unwrap_or(0))
    }
}

impl SlotStore for SqliteStore {
    fn read(&self, key: &str) -> Result<Option<String>> {
        let value = self
            .conn
            .query_row("SELECT value FROM slots WHERE key = ?1", [key], |row| {
                row.get(0)
            })
            .optional()?;
        Ok(value)
    }

    fn write(&self, key: &str, value: &str) -> Result<()> {
        if self.quota.is_some() {
            let needed = self.used_bytes_excluding(key)? + slot_size(key, value);
            check_quota(key, needed, self.quota)?;
        }

        self.conn.execute(
            r"
            INSERT INTO slots (key, value, updated_at) VALUES (?1, ?2, ?3)
            ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at
            ",
            params![key, value, Utc::now().to_rfc3339()],
        )?;
        debug!("Wrote {} bytes to slot {}", value.len(), key);
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        let affected = self.conn.execute("DELETE FROM slots WHERE key = ?1", [key])?;
        debug!("Removed slot {} ({} rows)", key, affected);
        Ok(())
    }

    fn used_bytes(&self) -> Result<u64> {
        // No slot has an empty key, so this counts everything.
        self.used_bytes_excluding("")
    }

    fn quota(&self) -> Option<u64> {
        self.quota
    }
}
