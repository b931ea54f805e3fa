//! Settings management via SQLite.

use crate::db::Database;
use crate::transcript::ViewConfig;
use thiserror::Error;

pub const SHOW_DEBUG_MESSAGES: &str = "show_debug_messages";
pub const SHOW_JSON_MODE: &str = "show_json_mode";
pub const ALLOW_FIX: &str = "allow_fix";
pub const USE_AUTH: &str = "use_auth";

/// Keys with typed accessors, for listing and validation.
pub const KNOWN_KEYS: [&str; 4] = [SHOW_DEBUG_MESSAGES, SHOW_JSON_MODE, ALLOW_FIX, USE_AUTH];

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),
    #[error("Setting not found: {0}")]
    NotFound(String),
    #[error("Invalid boolean for {key}: {value}")]
    InvalidBool { key: String, value: String },
}

/// Settings manager backed by SQLite.
pub struct Settings<'a> {
    db: &'a Database,
}

impl<'a> Settings<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    /// Get a setting value.
    pub fn get(&self, key: &str) -> Result<Option<String>, SettingsError> {
        let result: Result<String, _> = self.db.conn().query_row(
            "SELECT value FROM settings WHERE key = ?",
            [key],
            |row| row.get(0),
        );

        match result {
            Ok(value) => Ok(Some(value)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(SettingsError::Database(e)),
        }
    }

    /// Get a setting value or fail with [`SettingsError::NotFound`].
    pub fn require(&self, key: &str) -> Result<String, SettingsError> {
        self.get(key)?
            .ok_or_else(|| SettingsError::NotFound(key.to_string()))
    }

    /// Get a boolean setting, falling back to `default` when unset.
    pub fn get_bool_or(&self, key: &str, default: bool) -> Result<bool, SettingsError> {
        Ok(self.get(key)?.map(|v| parse_bool(&v)).unwrap_or(default))
    }

    /// Set a setting value.
    pub fn set(&self, key: &str, value: &str) -> Result<(), SettingsError> {
        self.db.conn().execute(
            "INSERT INTO settings (key, value, updated_at) VALUES (?, ?, unixepoch())
             ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
            [key, value],
        )?;
        Ok(())
    }

    /// Set a boolean setting, rejecting anything that doesn't read as one.
    pub fn set_bool_str(&self, key: &str, value: &str) -> Result<(), SettingsError> {
        let normalized = match value.to_lowercase().as_str() {
            "true" | "1" | "yes" | "on" => "true",
            "false" | "0" | "no" | "off" => "false",
            _ => {
                return Err(SettingsError::InvalidBool {
                    key: key.to_string(),
                    value: value.to_string(),
                })
            }
        };
        self.set(key, normalized)
    }

    pub fn set_bool(&self, key: &str, value: bool) -> Result<(), SettingsError> {
        self.set(key, if value { "true" } else { "false" })
    }

    /// Delete a setting.
    pub fn delete(&self, key: &str) -> Result<(), SettingsError> {
        self.db
            .conn()
            .execute("DELETE FROM settings WHERE key = ?", [key])?;
        Ok(())
    }

    /// List all settings.
    pub fn list(&self) -> Result<Vec<(String, String)>, SettingsError> {
        let mut stmt = self
            .db
            .conn()
            .prepare("SELECT key, value FROM settings ORDER BY key")?;
        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;

        let mut settings = Vec::new();
        for row in rows {
            settings.push(row?);
        }
        Ok(settings)
    }

    // Typed accessors

    /// Stored view flags. Debug messages are shown unless turned off.
    pub fn view_config(&self) -> Result<ViewConfig, SettingsError> {
        Ok(ViewConfig {
            show_debug_messages: self.get_bool_or(SHOW_DEBUG_MESSAGES, true)?,
            show_json_mode: self.get_bool_or(SHOW_JSON_MODE, false)?,
            allow_fix: self.get_bool_or(ALLOW_FIX, false)?,
            ..ViewConfig::default()
        })
    }

    /// Persist the view flags. The system-message flag is per render and
    /// not stored.
    pub fn set_view_config(&self, config: &ViewConfig) -> Result<(), SettingsError> {
        self.set_bool(SHOW_DEBUG_MESSAGES, config.show_debug_messages)?;
        self.set_bool(SHOW_JSON_MODE, config.show_json_mode)?;
        self.set_bool(ALLOW_FIX, config.allow_fix)
    }

    /// Whether authentication is enforced. Off means guest mode.
    ///
    /// A settings lookup failure is an error, never guest mode.
    pub fn use_auth(&self) -> Result<bool, SettingsError> {
        self.get_bool_or(USE_AUTH, false)
    }
}

fn parse_bool(value: &str) -> bool {
    matches!(value.to_lowercase().as_str(), "true" | "1" | "yes" | "on")
}
