use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use rusqlite::{params, OptionalExtension};

use crate::infra::sqlite::schema::{init_db, open_connection};
use crate::usecase::ports::identity::{IdentityStorage, StorageError};

/// Slot name of the GitHub account id.
const GITHUB_SLOT: &str = "github_user_id";

pub struct SqliteIdentityStorage {
    pub db_path: PathBuf,
}

impl SqliteIdentityStorage {
    pub fn open(db_path: impl Into<PathBuf>) -> Result<Self> {
        let db_path = db_path.into();
        init_db(&db_path)?;
        Ok(Self { db_path })
    }
}

pub fn load_user_id(db_path: &Path) -> Result<Option<String>> {
    let conn = open_connection(db_path)?;
    conn.query_row(
        "SELECT user_id FROM session_identity WHERE slot = ?1",
        params![GITHUB_SLOT],
        |row| row.get::<_, String>(0),
    )
    .optional()
    .context("failed to read session identity")
}

pub fn store_user_id(db_path: &Path, user_id: &str) -> Result<()> {
    let conn = open_connection(db_path)?;
    conn.execute(
        "INSERT INTO session_identity(slot, user_id) VALUES (?1, ?2)
         ON CONFLICT(slot) DO UPDATE SET user_id = excluded.user_id,
                                         updated_at = CURRENT_TIMESTAMP",
        params![GITHUB_SLOT, user_id],
    )
    .context("failed to store session identity")?;
    Ok(())
}

pub fn clear_user_id(db_path: &Path) -> Result<()> {
    let conn = open_connection(db_path)?;
    conn.execute(
        "DELETE FROM session_identity WHERE slot = ?1",
        params![GITHUB_SLOT],
    )
    .context("failed to clear session identity")?;
    Ok(())
}

impl IdentityStorage for SqliteIdentityStorage {
    fn load(&self) -> Result<Option<String>, StorageError> {
        load_user_id(&self.db_path).map_err(|err| StorageError::Message(err.to_string()))
    }

    fn save(&self, user_id: &str) -> Result<(), StorageError> {
        store_user_id(&self.db_path, user_id).map_err(|err| StorageError::Message(err.to_string()))
    }

    fn clear(&self) -> Result<(), StorageError> {
        clear_user_id(&self.db_path).map_err(|err| StorageError::Message(err.to_string()))
    }
}
