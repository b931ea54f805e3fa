//! Authentication glue.
//!
//! Resolves the current user from the session provider, lazily provisioning
//! a local user record on first access. With auth disabled every request runs
//! as a fixed guest user and no collaborator is consulted.

mod session;
mod users;

use chrono::{DateTime, Utc};
use thiserror::Error;

pub use session::{EnvSessionProvider, Session, SessionProvider};
pub use users::{User, UserStore};

/// Where unauthenticated requests are sent.
pub const LOGIN_PATH: &str = "/auth/login";

pub const GUEST_SUBJECT_ID: &str = "guest_user";
pub const GUEST_EMAIL: &str = "guest@rowboatlabs.com";
pub const GUEST_NAME: &str = "Guest";

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Login required, redirect to {redirect}")]
    LoginRequired { redirect: String },
    #[error("Session provider error: {0}")]
    Provider(String),
    #[error("User store error: {0}")]
    Store(String),
}

/// Whether authentication is enforced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AuthMode {
    /// Everyone is the guest user
    #[default]
    Guest,
    Enforced,
}

impl AuthMode {
    pub fn from_flag(use_auth: bool) -> Self {
        if use_auth {
            AuthMode::Enforced
        } else {
            AuthMode::Guest
        }
    }
}

/// Session used when auth is disabled.
pub fn guest_session() -> Session {
    Session {
        subject_id: GUEST_SUBJECT_ID.to_string(),
        email: GUEST_EMAIL.to_string(),
        email_verified: true,
    }
}

/// Sentinel user returned when auth is disabled.
pub fn guest_user() -> User {
    User {
        id: GUEST_SUBJECT_ID.to_string(),
        subject_id: GUEST_SUBJECT_ID.to_string(),
        name: Some(GUEST_NAME.to_string()),
        email: GUEST_EMAIL.to_string(),
        created_at: DateTime::<Utc>::default(),
    }
}

/// Resolve the authenticated user, creating a local record on first access.
///
/// Without a session this fails with [`AuthError::LoginRequired`]; the caller
/// performs the redirect.
pub async fn require_auth(
    mode: AuthMode,
    sessions: &dyn SessionProvider,
    users: &dyn UserStore,
) -> Result<User, AuthError> {
    if mode == AuthMode::Guest {
        return Ok(guest_user());
    }

    let Some(session) = sessions.current_session().await? else {
        return Err(AuthError::LoginRequired {
            redirect: LOGIN_PATH.to_string(),
        });
    };

    if let Some(user) = users.find_by_subject_id(&session.subject_id).await? {
        return Ok(user);
    }

    let user = users
        .create_user(&session.subject_id, &session.email)
        .await?;
    tracing::info!(
        "Created new user id {} for session id {}",
        user.id,
        session.subject_id
    );
    Ok(user)
}

/// Look up the local user for a session subject.
pub async fn user_from_session_id(
    mode: AuthMode,
    users: &dyn UserStore,
    subject_id: &str,
) -> Result<Option<User>, AuthError> {
    if mode == AuthMode::Guest {
        return Ok(Some(guest_user()));
    }
    users.find_by_subject_id(subject_id).await
}
