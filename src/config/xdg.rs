//! XDG Base Directory support.

use std::path::PathBuf;

const APP_DIR: &str = "oarlock";

/// XDG directory paths for oarlock.
pub struct XdgDirs {
    /// Config directory (~/.config/oarlock or XDG_CONFIG_HOME/oarlock)
    pub config: PathBuf,
    /// Data directory (~/.local/share/oarlock or XDG_DATA_HOME/oarlock)
    pub data: PathBuf,
    /// Cache directory (~/.cache/oarlock or XDG_CACHE_HOME/oarlock)
    pub cache: PathBuf,
    /// State directory (~/.local/state/oarlock or XDG_STATE_HOME/oarlock)
    pub state: PathBuf,
}

impl XdgDirs {
    /// Get XDG directories, respecting environment variables.
    pub fn new() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok(), dirs::home_dir())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>, home: Option<PathBuf>) -> Self {
        let home = home.unwrap_or_else(|| PathBuf::from("."));
        let resolve = |var: &str, fallback: &str| {
            lookup(var)
                .filter(|v| !v.is_empty())
                .map(PathBuf::from)
                .unwrap_or_else(|| home.join(fallback))
                .join(APP_DIR)
        };

        Self {
            config: resolve("XDG_CONFIG_HOME", ".config"),
            data: resolve("XDG_DATA_HOME", ".local/share"),
            cache: resolve("XDG_CACHE_HOME", ".cache"),
            state: resolve("XDG_STATE_HOME", ".local/state"),
        }
    }

    /// Ensure all directories exist.
    pub fn ensure_dirs(&self) -> std::io::Result<()> {
        for dir in [&self.config, &self.data, &self.cache, &self.state] {
            std::fs::create_dir_all(dir)?;
        }
        Ok(())
    }

    /// Default database file.
    pub fn database(&self) -> PathBuf {
        self.data.join("oarlock.db")
    }
}

impl Default for XdgDirs {
    fn default() -> Self {
        Self::new()
    }
}
