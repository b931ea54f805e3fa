//! Local user records.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::AuthError;

/// A locally provisioned user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    /// Session provider subject this user was created for
    pub subject_id: String,
    pub name: Option<String>,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

/// Persistence for local users.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_subject_id(&self, subject_id: &str) -> Result<Option<User>, AuthError>;

    async fn create_user(&self, subject_id: &str, email: &str) -> Result<User, AuthError>;
}
