//! Database migrations.

use rusqlite::Connection;

const SETTINGS: &str = "
CREATE TABLE IF NOT EXISTS settings (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL,
    updated_at INTEGER DEFAULT (unixepoch())
);";

const USERS: &str = "
CREATE TABLE IF NOT EXISTS users (
    id TEXT PRIMARY KEY,
    subject_id TEXT NOT NULL UNIQUE,
    name TEXT,
    email TEXT NOT NULL,
    created_at INTEGER NOT NULL DEFAULT (unixepoch())
);";

const SELECTED_TOOLS: &str = "
CREATE TABLE IF NOT EXISTS selected_tools (
    project_id TEXT NOT NULL,
    slug TEXT NOT NULL,
    name TEXT NOT NULL,
    description TEXT NOT NULL DEFAULT '',
    position INTEGER NOT NULL,
    PRIMARY KEY (project_id, slug)
);
CREATE INDEX IF NOT EXISTS idx_selected_tools_project ON selected_tools(project_id, position);";

const SELECTED_TOOLS_TOOLKIT: &str = "
ALTER TABLE selected_tools ADD COLUMN toolkit TEXT NOT NULL DEFAULT '';
CREATE INDEX IF NOT EXISTS idx_selected_tools_toolkit ON selected_tools(project_id, toolkit);";

/// Run all migrations.
pub fn run_migrations(conn: &Connection) -> anyhow::Result<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS migrations (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL UNIQUE,
            applied_at INTEGER DEFAULT (unixepoch())
        );",
    )?;

    let migrations = [
        ("001_settings", SETTINGS),
        ("002_users", USERS),
        ("003_selected_tools", SELECTED_TOOLS),
        ("004_selected_tools_toolkit", SELECTED_TOOLS_TOOLKIT),
    ];

    for (name, sql) in migrations {
        let applied: bool = conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM migrations WHERE name = ?)",
            [name],
            |row| row.get(0),
        )?;

        if !applied {
            tracing::info!("Running migration: {}", name);
            conn.execute_batch(sql)?;
            conn.execute("INSERT INTO migrations (name) VALUES (?)", [name])?;
        }
    }

    Ok(())
}
