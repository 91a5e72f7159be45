//! Key-value persistence medium contracts and implementations.
//!
//! # Responsibility
//! - Provide the opaque `key -> text` boundary the store serializes into.
//! - Keep SQL details inside the persistence boundary.
//!
//! # Invariants
//! - `write_entries` is all-or-nothing for the SQLite implementation.
//! - Readers never see a partially written key.
//! - Mediums know nothing about the shape of the values they hold.

use crate::db::DbError;
use rusqlite::{params, Connection, OptionalExtension};
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::{Arc, Mutex};

pub type MediumResult<T> = Result<T, MediumError>;

/// Failure reported by a persistence medium.
#[derive(Debug)]
pub enum MediumError {
    Db(DbError),
    /// Non-database medium failure (poisoned shared state, I/O).
    Unavailable(String),
}

impl Display for MediumError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::Unavailable(message) => write!(f, "persistence medium unavailable: {message}"),
        }
    }
}

impl Error for MediumError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::Unavailable(_) => None,
        }
    }
}

impl From<DbError> for MediumError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for MediumError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Opaque key-value storage the store mirrors its collections into.
pub trait KeyValueMedium: Send {
    /// Reads one value, `None` when the key was never written.
    fn read(&self, key: &str) -> MediumResult<Option<String>>;
    /// Writes every entry, replacing existing values.
    fn write_entries(&mut self, entries: &[(&str, String)]) -> MediumResult<()>;
    /// Removes every key.
    fn clear(&mut self) -> MediumResult<()>;
    /// Lists stored keys in ascending order.
    fn keys(&self) -> MediumResult<Vec<String>>;
}

/// SQLite-backed medium over the `kv_entries` table.
pub struct SqliteKeyValueMedium {
    conn: Connection,
}

impl SqliteKeyValueMedium {
    /// Wraps a connection returned by `open_db`/`open_db_in_memory`.
    pub fn new(conn: Connection) -> Self {
        Self { conn }
    }

    /// Gives the connection back, e.g. for inspection in tests.
    pub fn into_inner(self) -> Connection {
        self.conn
    }
}

impl KeyValueMedium for SqliteKeyValueMedium {
    fn read(&self, key: &str) -> MediumResult<Option<String>> {
        let value = self
            .conn
            .query_row(
                "SELECT value FROM kv_entries WHERE key = ?1;",
                [key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(value)
    }

    fn write_entries(&mut self, entries: &[(&str, String)]) -> MediumResult<()> {
        let tx = self.conn.transaction()?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO kv_entries (key, value, updated_at)
                 VALUES (?1, ?2, (strftime('%s', 'now') * 1000))
                 ON CONFLICT(key) DO UPDATE SET
                    value = excluded.value,
                    updated_at = excluded.updated_at;",
            )?;
            for (key, value) in entries {
                stmt.execute(params![key, value])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    fn clear(&mut self) -> MediumResult<()> {
        self.conn.execute("DELETE FROM kv_entries;", [])?;
        Ok(())
    }

    fn keys(&self) -> MediumResult<Vec<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT key FROM kv_entries ORDER BY key ASC;")?;
        let mut rows = stmt.query([])?;
        let mut keys = Vec::new();
        while let Some(row) = rows.next()? {
            keys.push(row.get(0)?);
        }
        Ok(keys)
    }
}

/// In-memory medium. Clones share the same entries, which models several
/// store instances pointed at one storage backend.
#[derive(Debug, Clone, Default)]
pub struct MemoryKeyValueMedium {
    entries: Arc<Mutex<BTreeMap<String, String>>>,
}

impl MemoryKeyValueMedium {
    pub fn new() -> Self {
        Self::default()
    }

    fn with_entries<T>(
        &self,
        f: impl FnOnce(&mut BTreeMap<String, String>) -> T,
    ) -> MediumResult<T> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|err| MediumError::Unavailable(format!("memory medium lock poisoned: {err}")))?;
        Ok(f(&mut entries))
    }
}

impl KeyValueMedium for MemoryKeyValueMedium {
    fn read(&self, key: &str) -> MediumResult<Option<String>> {
        self.with_entries(|entries| entries.get(key).cloned())
    }

    fn write_entries(&mut self, items: &[(&str, String)]) -> MediumResult<()> {
        self.with_entries(|entries| {
            for (key, value) in items {
                entries.insert((*key).to_string(), value.clone());
            }
        })
    }

    fn clear(&mut self) -> MediumResult<()> {
        self.with_entries(|entries| entries.clear())
    }

    fn keys(&self) -> MediumResult<Vec<String>> {
        self.with_entries(|entries| entries.keys().cloned().collect())
    }
}
