//! SQLite-backed tool selections, one ordered list per project.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use super::{Database, StoreError};
use crate::toolkit::{Tool, WorkflowError, WorkflowStore};

/// Selected-tool persistence operations.
pub struct SelectedToolsRepository<'a> {
    db: &'a Database,
}

impl<'a> SelectedToolsRepository<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    pub fn list(&self, project_id: &str) -> Result<Vec<Tool>, StoreError> {
        let mut stmt = self.db.conn().prepare(
            "SELECT slug, name, description
             FROM selected_tools
             WHERE project_id = ?
             ORDER BY position",
        )?;

        let rows = stmt.query_map([project_id], |row| {
            Ok(Tool {
                slug: row.get(0)?,
                name: row.get(1)?,
                description: row.get(2)?,
            })
        })?;

        Ok(rows.collect::<Result<_, _>>()?)
    }

    /// Merge one page of `toolkit`'s listing into the project's selection.
    ///
    /// Slugs in `shown` that are not in `selected` are deleted. Selected
    /// tools are inserted at the end, or refreshed in place if already
    /// stored. Rows for tools outside `shown` are untouched.
    pub fn merge(
        &self,
        project_id: &str,
        toolkit: &str,
        shown: &[Tool],
        selected: &[Tool],
    ) -> Result<(), StoreError> {
        self.transaction(|conn| {
            for tool in shown {
                if !selected.iter().any(|s| s.slug == tool.slug) {
                    conn.execute(
                        "DELETE FROM selected_tools WHERE project_id = ? AND slug = ?",
                        [project_id, tool.slug.as_str()],
                    )?;
                }
            }
            for tool in selected {
                conn.execute(
                    "INSERT INTO selected_tools (project_id, slug, name, description, toolkit, position)
                     VALUES (?1, ?2, ?3, ?4, ?5,
                             (SELECT COALESCE(MAX(position) + 1, 0) FROM selected_tools WHERE project_id = ?1))
                     ON CONFLICT(project_id, slug) DO UPDATE SET
                         name = excluded.name,
                         description = excluded.description,
                         toolkit = excluded.toolkit",
                    rusqlite::params![project_id, tool.slug, tool.name, tool.description, toolkit],
                )?;
            }
            Ok(())
        })
    }

    /// Delete every tool the project selected from `toolkit`.
    pub fn remove_toolkit(&self, project_id: &str, toolkit: &str) -> Result<Vec<String>, StoreError> {
        self.transaction(|conn| {
            let slugs = {
                let mut stmt = conn.prepare(
                    "SELECT slug FROM selected_tools
                     WHERE project_id = ? AND toolkit = ?
                     ORDER BY position",
                )?;
                let rows = stmt.query_map([project_id, toolkit], |row| row.get(0))?;
                rows.collect::<Result<Vec<String>, _>>()?
            };
            conn.execute(
                "DELETE FROM selected_tools WHERE project_id = ? AND toolkit = ?",
                [project_id, toolkit],
            )?;
            Ok(slugs)
        })
    }

    fn transaction<T>(
        &self,
        f: impl FnOnce(&rusqlite::Connection) -> Result<T, rusqlite::Error>,
    ) -> Result<T, StoreError> {
        let conn = self.db.conn();
        conn.execute_batch("BEGIN")?;

        match f(conn) {
            Ok(value) => {
                conn.execute_batch("COMMIT")?;
                Ok(value)
            }
            Err(e) => {
                let _ = conn.execute_batch("ROLLBACK");
                Err(StoreError::Database(e))
            }
        }
    }
}

/// [`WorkflowStore`] over a shared database handle.
pub struct SqliteWorkflowStore {
    db: Arc<Mutex<Database>>,
}

impl SqliteWorkflowStore {
    pub fn new(db: Arc<Mutex<Database>>) -> Self {
        Self { db }
    }

    fn with_repo<T>(
        &self,
        f: impl FnOnce(&SelectedToolsRepository<'_>) -> Result<T, StoreError>,
    ) -> Result<T, WorkflowError> {
        let db = self
            .db
            .lock()
            .map_err(|_| WorkflowError::Unavailable(StoreError::LockPoisoned.to_string()))?;
        f(&SelectedToolsRepository::new(&db)).map_err(|e| match e {
            StoreError::Database(e) => WorkflowError::Database(e),
            other => WorkflowError::Unavailable(other.to_string()),
        })
    }
}

#[async_trait]
impl WorkflowStore for SqliteWorkflowStore {
    async fn selected_tools(&self, project_id: &str) -> Result<Vec<Tool>, WorkflowError> {
        self.with_repo(|repo| repo.list(project_id))
    }

    async fn update_selected_tools(
        &self,
        project_id: &str,
        toolkit_slug: &str,
        shown: &[Tool],
        selected: &[Tool],
    ) -> Result<(), WorkflowError> {
        self.with_repo(|repo| repo.merge(project_id, toolkit_slug, shown, selected))
    }

    async fn remove_toolkit_tools(
        &self,
        project_id: &str,
        toolkit_slug: &str,
    ) -> Result<Vec<String>, WorkflowError> {
        self.with_repo(|repo| repo.remove_toolkit(project_id, toolkit_slug))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn setup_test_db() -> (TempDir, Database) {
        let temp_dir = TempDir::new().unwrap();
        let db = Database::open_at(temp_dir.path().join("test.db")).unwrap();
        db.migrate().unwrap();
        (temp_dir, db)
    }

    fn tool(slug: &str) -> Tool {
        Tool {
            slug: slug.to_string(),
            name: slug.to_lowercase(),
            description: format!("{} tool", slug),
        }
    }

    #[test]
    fn test_empty_project() {
        let (_temp, db) = setup_test_db();
        assert!(SelectedToolsRepository::new(&db).list("p").unwrap().is_empty());
    }

    #[test]
    fn test_merge_appends_in_order() {
        let (_temp, db) = setup_test_db();
        let repo = SelectedToolsRepository::new(&db);

        repo.merge("p", "gh", &[tool("A"), tool("B")], &[tool("B"), tool("A")])
            .unwrap();
        assert_eq!(repo.list("p").unwrap(), vec![tool("B"), tool("A")]);

        // Deselecting drops only that tool
        repo.merge("p", "gh", &[tool("A"), tool("B")], &[tool("A")])
            .unwrap();
        assert_eq!(repo.list("p").unwrap(), vec![tool("A")]);
    }

    #[test]
    fn test_merge_keeps_other_pages() {
        let (_temp, db) = setup_test_db();
        let repo = SelectedToolsRepository::new(&db);

        repo.merge("p", "gh", &[tool("A"), tool("B")], &[tool("A")])
            .unwrap();
        repo.merge("p", "gh", &[tool("C")], &[tool("C")]).unwrap();
        assert_eq!(repo.list("p").unwrap(), vec![tool("A"), tool("C")]);

        // Re-saving page one leaves page two alone
        repo.merge("p", "gh", &[tool("A"), tool("B")], &[tool("B")])
            .unwrap();
        assert_eq!(repo.list("p").unwrap(), vec![tool("C"), tool("B")]);
    }

    #[test]
    fn test_merge_refreshes_in_place() {
        let (_temp, db) = setup_test_db();
        let repo = SelectedToolsRepository::new(&db);
        repo.merge("p", "gh", &[tool("A"), tool("B")], &[tool("A"), tool("B")])
            .unwrap();

        let renamed = Tool {
            name: "renamed".into(),
            ..tool("A")
        };
        repo.merge("p", "gh", &[renamed.clone()], &[renamed.clone()])
            .unwrap();
        assert_eq!(repo.list("p").unwrap(), vec![renamed, tool("B")]);
    }

    #[test]
    fn test_remove_toolkit() {
        let (_temp, db) = setup_test_db();
        let repo = SelectedToolsRepository::new(&db);
        repo.merge("p", "gh", &[tool("A"), tool("B")], &[tool("A"), tool("B")])
            .unwrap();
        repo.merge("p", "slack", &[tool("S")], &[tool("S")]).unwrap();

        assert_eq!(repo.remove_toolkit("p", "gh").unwrap(), vec!["A", "B"]);
        assert_eq!(repo.list("p").unwrap(), vec![tool("S")]);
        assert!(repo.remove_toolkit("p", "gh").unwrap().is_empty());
    }

    #[test]
    fn test_projects_are_isolated() {
        let (_temp, db) = setup_test_db();
        let repo = SelectedToolsRepository::new(&db);
        repo.merge("p1", "gh", &[tool("A")], &[tool("A")]).unwrap();
        repo.merge("p2", "gh", &[tool("A")], &[tool("A")]).unwrap();
        repo.merge("p1", "gh", &[tool("A")], &[]).unwrap();

        assert!(repo.list("p1").unwrap().is_empty());
        assert_eq!(repo.list("p2").unwrap(), vec![tool("A")]);
        assert_eq!(repo.remove_toolkit("p2", "gh").unwrap(), vec!["A"]);
    }

    #[tokio::test]
    async fn test_store_round_trip() {
        let (_temp, db) = setup_test_db();
        let store = SqliteWorkflowStore::new(Arc::new(Mutex::new(db)));

        store
            .update_selected_tools("proj", "gh", &[tool("X"), tool("Y")], &[tool("X"), tool("Y")])
            .await
            .unwrap();
        let tools = store.selected_tools("proj").await.unwrap();
        assert_eq!(tools.len(), 2);
        assert_eq!(tools[0].slug, "X");

        let removed = store.remove_toolkit_tools("proj", "gh").await.unwrap();
        assert_eq!(removed, vec!["X", "Y"]);
        assert!(store.selected_tools("proj").await.unwrap().is_empty());
    }
}
