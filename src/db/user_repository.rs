//! SQLite-backed user records.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::OptionalExtension;

use super::{Database, StoreError};
use crate::auth::{AuthError, User, UserStore};

/// User persistence operations.
pub struct UserRepository<'a> {
    db: &'a Database,
}

impl<'a> UserRepository<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    pub fn find_by_subject_id(&self, subject_id: &str) -> Result<Option<User>, StoreError> {
        let row = self
            .db
            .conn()
            .query_row(
                "SELECT id, subject_id, name, email, created_at
                 FROM users
                 WHERE subject_id = ?",
                [subject_id],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, Option<String>>(2)?,
                        row.get::<_, String>(3)?,
                        row.get::<_, i64>(4)?,
                    ))
                },
            )
            .optional()?;

        let Some((id, subject_id, name, email, created_at)) = row else {
            return Ok(None);
        };
        Ok(Some(User {
            id,
            subject_id,
            name,
            email,
            created_at: timestamp(created_at)?,
        }))
    }

    /// Insert a user with a fresh id.
    pub fn create(&self, subject_id: &str, email: &str) -> Result<User, StoreError> {
        let now = Utc::now();
        let user = User {
            id: uuid::Uuid::new_v4().to_string(),
            subject_id: subject_id.to_string(),
            name: None,
            email: email.to_string(),
            created_at: timestamp(now.timestamp())?,
        };

        self.db.conn().execute(
            "INSERT INTO users (id, subject_id, name, email, created_at)
             VALUES (?, ?, ?, ?, ?)",
            rusqlite::params![
                user.id,
                user.subject_id,
                user.name,
                user.email,
                user.created_at.timestamp()
            ],
        )?;

        Ok(user)
    }

    pub fn count(&self) -> Result<i64, StoreError> {
        Ok(self
            .db
            .conn()
            .query_row("SELECT COUNT(*) FROM users", [], |row| row.get(0))?)
    }
}

/// Whole-second precision, matching the stored column.
fn timestamp(secs: i64) -> Result<DateTime<Utc>, StoreError> {
    DateTime::from_timestamp(secs, 0).ok_or(StoreError::InvalidTimestamp(secs))
}

/// [`UserStore`] over a shared database handle.
pub struct SqliteUserStore {
    db: Arc<Mutex<Database>>,
}

impl SqliteUserStore {
    pub fn new(db: Arc<Mutex<Database>>) -> Self {
        Self { db }
    }

    fn with_repo<T>(
        &self,
        f: impl FnOnce(&UserRepository<'_>) -> Result<T, StoreError>,
    ) -> Result<T, AuthError> {
        let db = self
            .db
            .lock()
            .map_err(|_| AuthError::Store(StoreError::LockPoisoned.to_string()))?;
        f(&UserRepository::new(&db)).map_err(|e| AuthError::Store(e.to_string()))
    }
}

#[async_trait]
impl UserStore for SqliteUserStore {
    async fn find_by_subject_id(&self, subject_id: &str) -> Result<Option<User>, AuthError> {
        self.with_repo(|repo| repo.find_by_subject_id(subject_id))
    }

    async fn create_user(&self, subject_id: &str, email: &str) -> Result<User, AuthError> {
        self.with_repo(|repo| repo.create(subject_id, email))
    }
}
