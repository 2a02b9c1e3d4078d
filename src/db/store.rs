//! Key-value local store backed by the embedded SQLite database. The
//! application keeps its whole dataset in a handful of named records that are
//! read and written wholesale, so the schema is a single two-column table
//! rather than one table per entity.

use std::fs;
use std::path::{Path, PathBuf};

use directories::BaseDirs;
use rusqlite::{params, Connection, OptionalExtension};
use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

/// Folder name used beneath the user's home directory for application data.
const DATA_DIR_NAME: &str = ".clinigest";
/// SQLite file name stored inside the application data directory.
const DB_FILE_NAME: &str = "clinigest.sqlite";

/// Failures raised by the store itself. Reads higher up are deliberately
/// downgraded to empty results, but writes surface these to the user.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("could not locate a home directory for application data")]
    NoHomeDir,
    #[error("local store unavailable: {0}")]
    Io(#[from] std::io::Error),
    #[error("local store unavailable: {0}")]
    Database(#[from] rusqlite::Error),
    #[error("stored value under `{key}` is not valid JSON")]
    Malformed {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Handle over the single named partition every record lives in. Values are
/// stored as JSON text so the same codec serves both persistence and the
/// backup file format.
pub struct Store {
    conn: Connection,
}

impl Store {
    /// Open the store at its default location, creating the data directory
    /// and the table on first run. Safe to call repeatedly; the schema
    /// statement is idempotent.
    pub fn open() -> Result<Self, StorageError> {
        Self::open_at(&default_db_path()?)
    }

    /// Open the store at an explicit path. Production code goes through
    /// [`Store::open`]; tests point this at a temporary directory.
    pub fn open_at(path: &Path) -> Result<Self, StorageError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;
        conn.execute(
            "CREATE TABLE IF NOT EXISTS store (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            )",
            [],
        )?;

        Ok(Self { conn })
    }

    /// Fetch and decode the value stored under `key`, or `None` if the key
    /// was never written. There is no query capability beyond this exact-key
    /// lookup.
    pub fn read<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, StorageError> {
        let raw: Option<String> = self
            .conn
            .query_row("SELECT value FROM store WHERE key = ?1", params![key], |row| {
                row.get(0)
            })
            .optional()?;

        match raw {
            Some(text) => {
                let value = serde_json::from_str(&text).map_err(|source| {
                    StorageError::Malformed {
                        key: key.to_string(),
                        source,
                    }
                })?;
                Ok(Some(value))
            }
            None => Ok(None),
        }
    }

    /// Overwrite the entire value stored under `key`. Last write wins; there
    /// are no partial updates and no transactions spanning multiple keys.
    pub fn write<T: Serialize>(&self, key: &str, value: &T) -> Result<(), StorageError> {
        let text = serde_json::to_string(value).map_err(|source| StorageError::Malformed {
            key: key.to_string(),
            source,
        })?;

        self.conn.execute(
            "INSERT INTO store (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            params![key, text],
        )?;
        Ok(())
    }
}

/// Resolve the absolute path to the SQLite database inside the user's home.
fn default_db_path() -> Result<PathBuf, StorageError> {
    let base_dirs = BaseDirs::new().ok_or(StorageError::NoHomeDir)?;
    Ok(base_dirs.home_dir().join(DATA_DIR_NAME).join(DB_FILE_NAME))
}

/// Resolve the directory used for the on-disk log file. Shares the data
/// directory with the database so everything the app writes lives in one
/// place.
pub fn data_dir() -> Result<PathBuf, StorageError> {
    let base_dirs = BaseDirs::new().ok_or(StorageError::NoHomeDir)?;
    Ok(base_dirs.home_dir().join(DATA_DIR_NAME))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_store() -> (tempfile::TempDir, Store) {
        let dir = tempfile::tempdir().expect("temp dir");
        let store = Store::open_at(&dir.path().join("store.sqlite")).expect("open store");
        (dir, store)
    }

    #[test]
    fn read_of_unwritten_key_is_absent() {
        let (_dir, store) = temp_store();
        let value: Option<Vec<String>> = store.read("missing").expect("read");
        assert_eq!(value, None);
    }

    #[test]
    fn write_then_read_round_trips() {
        let (_dir, store) = temp_store();
        let names = vec!["Adeslas".to_string(), "Sanitas".to_string()];
        store.write("insurers", &names).expect("write");

        let loaded: Option<Vec<String>> = store.read("insurers").expect("read");
        assert_eq!(loaded, Some(names));
    }

    #[test]
    fn write_fully_replaces_previous_value() {
        let (_dir, store) = temp_store();
        store
            .write("insurers", &vec!["Adeslas".to_string(), "DKV".to_string()])
            .expect("first write");
        store
            .write("insurers", &vec!["Mapfre".to_string()])
            .expect("second write");

        let loaded: Option<Vec<String>> = store.read("insurers").expect("read");
        assert_eq!(loaded, Some(vec!["Mapfre".to_string()]));
    }

    #[test]
    fn open_is_idempotent_across_connections() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("store.sqlite");

        {
            let store = Store::open_at(&path).expect("first open");
            store.write("marker", &42u32).expect("write");
        }

        let store = Store::open_at(&path).expect("second open");
        let loaded: Option<u32> = store.read("marker").expect("read");
        assert_eq!(loaded, Some(42));
    }
}
