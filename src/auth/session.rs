//! Session lookup.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::AuthError;

/// Identity established by the session provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Provider subject (`sub` claim)
    pub subject_id: String,
    pub email: String,
    pub email_verified: bool,
}

/// Source of the current request's session.
#[async_trait]
pub trait SessionProvider: Send + Sync {
    /// `Ok(None)` means nobody is logged in.
    async fn current_session(&self) -> Result<Option<Session>, AuthError>;
}

/// Reads the session from environment variables.
///
/// - `OAR_SESSION_SUBJECT`: subject id; unset means no session
/// - `OAR_SESSION_EMAIL`: email address (defaults to empty)
/// - `OAR_SESSION_EMAIL_VERIFIED`: `true`/`1`/`yes` when verified
#[derive(Debug, Default, Clone, Copy)]
pub struct EnvSessionProvider;

pub const SUBJECT_VAR: &str = "OAR_SESSION_SUBJECT";
pub const EMAIL_VAR: &str = "OAR_SESSION_EMAIL";
pub const EMAIL_VERIFIED_VAR: &str = "OAR_SESSION_EMAIL_VERIFIED";

impl EnvSessionProvider {
    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Option<Session> {
        let subject_id = lookup(SUBJECT_VAR).filter(|s| !s.trim().is_empty())?;
        let email = lookup(EMAIL_VAR).unwrap_or_default();
        let email_verified = lookup(EMAIL_VERIFIED_VAR)
            .map(|v| matches!(v.to_lowercase().as_str(), "true" | "1" | "yes"))
            .unwrap_or(false);
        Some(Session {
            subject_id,
            email,
            email_verified,
        })
    }
}

#[async_trait]
impl SessionProvider for EnvSessionProvider {
    async fn current_session(&self) -> Result<Option<Session>, AuthError> {
        Ok(Self::from_lookup(|key| std::env::var(key).ok()))
    }
}
