//! Slot repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Store opaque text values under named keys.
//! - Write several slots in a single transaction.
//!
//! # Invariants
//! - `put_slots` applies all rows or none.
//! - Values are stored verbatim; encoding is the caller's concern.

use crate::db::DbError;
use rusqlite::{params, Connection, OptionalExtension};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type RepoResult<T> = Result<T, RepoError>;

/// Slot persistence error.
#[derive(Debug)]
pub enum RepoError {
    Db(DbError),
    InvalidKey(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::InvalidKey(key) => write!(f, "invalid slot key: `{key}`"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::InvalidKey(_) => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Durable named-slot storage.
pub trait SlotRepository {
    /// Returns the raw value stored under `key`, if any.
    fn get_slot(&self, key: &str) -> RepoResult<Option<String>>;
    /// Inserts or replaces one slot.
    fn put_slot(&self, key: &str, value: &str) -> RepoResult<()>;
    /// Inserts or replaces several slots atomically, in the given order.
    fn put_slots(&self, entries: &[(&str, String)]) -> RepoResult<()>;
    /// Removes one slot. Missing keys are not an error.
    fn delete_slot(&self, key: &str) -> RepoResult<()>;
    /// Lists stored keys in ascending order.
    fn list_keys(&self) -> RepoResult<Vec<String>>;
}

/// SQLite-backed slot repository owning its connection.
pub struct SqliteSlotRepository {
    conn: Connection,
}

impl SqliteSlotRepository {
    /// Wraps a connection returned by `open_db` / `open_db_in_memory`.
    pub fn new(conn: Connection) -> Self {
        Self { conn }
    }
}

impl SlotRepository for SqliteSlotRepository {
    fn get_slot(&self, key: &str) -> RepoResult<Option<String>> {
        ensure_key(key)?;
        let value = self
            .conn
            .query_row("SELECT value FROM slots WHERE key = ?1;", [key], |row| {
                row.get::<_, String>(0)
            })
            .optional()?;
        Ok(value)
    }

    fn put_slot(&self, key: &str, value: &str) -> RepoResult<()> {
        ensure_key(key)?;
        upsert(&self.conn, key, value)
    }

    fn put_slots(&self, entries: &[(&str, String)]) -> RepoResult<()> {
        for (key, _) in entries {
            ensure_key(key)?;
        }

        let tx = self.conn.unchecked_transaction()?;
        for (key, value) in entries {
            upsert(&tx, key, value)?;
        }
        tx.commit()?;
        Ok(())
    }

    fn delete_slot(&self, key: &str) -> RepoResult<()> {
        ensure_key(key)?;
        self.conn
            .execute("DELETE FROM slots WHERE key = ?1;", [key])?;
        Ok(())
    }

    fn list_keys(&self) -> RepoResult<Vec<String>> {
        let mut stmt = self.conn.prepare("SELECT key FROM slots ORDER BY key ASC;")?;
        let keys = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(keys)
    }
}

fn upsert(conn: &Connection, key: &str, value: &str) -> RepoResult<()> {
    conn.execute(
        "INSERT INTO slots (key, value, updated_at)
         VALUES (?1, ?2, (strftime('%s', 'now') * 1000))
         ON CONFLICT(key) DO UPDATE SET
            value = excluded.value,
            updated_at = excluded.updated_at;",
        params![key, value],
    )?;
    Ok(())
}

fn ensure_key(key: &str) -> RepoResult<()> {
    if key.trim().is_empty() {
        return Err(RepoError::InvalidKey(key.to_string()));
    }
    Ok(())
}
