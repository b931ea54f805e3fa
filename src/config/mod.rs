//! Configuration management.

mod settings;
mod xdg;

pub use settings::{
    Settings, SettingsError, ALLOW_FIX, KNOWN_KEYS, SHOW_DEBUG_MESSAGES, SHOW_JSON_MODE, USE_AUTH,
};
pub use xdg::XdgDirs;
