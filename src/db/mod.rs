//! SQLite database for settings, users, and tool selections.

mod migrations;
mod user_repository;
mod workflow_repository;

use crate::config::XdgDirs;
use rusqlite::Connection;
use std::path::PathBuf;
use thiserror::Error;

pub use user_repository::{SqliteUserStore, UserRepository};
pub use workflow_repository::{SelectedToolsRepository, SqliteWorkflowStore};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),
    #[error("Database lock poisoned")]
    LockPoisoned,
    #[error("Invalid timestamp: {0}")]
    InvalidTimestamp(i64),
}

/// Database connection wrapper.
pub struct Database {
    conn: Connection,
    path: PathBuf,
}

impl Database {
    /// Open the database at the default location.
    pub fn open() -> anyhow::Result<Self> {
        let path = Self::default_path()?;
        Self::open_at(path)
    }

    /// Open the database at a specific path.
    pub fn open_at(path: PathBuf) -> anyhow::Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(&path)?;

        // Holds user emails; keep it private to the owner.
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            if let Err(e) = std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o600))
            {
                tracing::warn!("Failed to set database file permissions: {}", e);
            }
        }

        conn.execute_batch("PRAGMA foreign_keys = ON;")?;

        Ok(Self { conn, path })
    }

    /// Get the default database path.
    pub fn default_path() -> anyhow::Result<PathBuf> {
        let dirs = XdgDirs::new();
        std::fs::create_dir_all(&dirs.data)?;
        Ok(dirs.database())
    }

    /// Run database migrations.
    pub fn migrate(&self) -> anyhow::Result<()> {
        migrations::run_migrations(&self.conn)
    }

    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }
}
