//! State machine for browsing and selecting one toolkit's tools.
//!
//! Collaborator failures never escape the listing path: they are logged and
//! leave the panel with an empty page. Responses to superseded page requests
//! are dropped, so the last request issued always wins.

use std::collections::BTreeSet;

use super::catalog::{
    AccountStatus, CatalogError, ProjectConfig, Tool, ToolCatalog, ToolPage, Toolkit,
    WorkflowError, WorkflowStore,
};
use super::pagination::CursorHistory;

/// An issued page request. Only the most recent one may update the panel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    pub token: u64,
    pub toolkit: String,
    pub cursor: Option<String>,
    pub reset_history: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    Applied,
    /// The listing failed; the page is now empty
    Failed,
    /// A newer request was issued; this response was ignored
    Stale,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisconnectOutcome {
    Disconnected,
    NoAccount,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseOutcome {
    Closed,
    NeedsConfirmation,
}

pub struct ToolsPanel {
    project_id: String,
    toolkit: Toolkit,
    tools: Vec<Tool>,
    loading: bool,
    pagination: CursorHistory,
    selected: BTreeSet<String>,
    has_changes: bool,
    show_auth_modal: bool,
    processing_auth: bool,
    latest_token: u64,
    open: bool,
}

impl ToolsPanel {
    pub fn new(project_id: impl Into<String>, toolkit: Toolkit) -> Self {
        Self {
            project_id: project_id.into(),
            toolkit,
            tools: Vec::new(),
            loading: false,
            pagination: CursorHistory::new(),
            selected: BTreeSet::new(),
            has_changes: false,
            show_auth_modal: false,
            processing_auth: false,
            latest_token: 0,
            open: false,
        }
    }

    pub fn project_id(&self) -> &str {
        &self.project_id
    }

    pub fn toolkit(&self) -> &Toolkit {
        &self.toolkit
    }

    pub fn tools(&self) -> &[Tool] {
        &self.tools
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn has_changes(&self) -> bool {
        self.has_changes
    }

    pub fn show_auth_modal(&self) -> bool {
        self.show_auth_modal
    }

    pub fn is_processing_auth(&self) -> bool {
        self.processing_auth
    }

    pub fn is_selected(&self, slug: &str) -> bool {
        self.selected.contains(slug)
    }

    pub fn selected(&self) -> impl Iterator<Item = &str> {
        self.selected.iter().map(String::as_str)
    }

    /// 1-based page number.
    pub fn page_number(&self) -> usize {
        self.pagination.depth() + 1
    }

    pub fn can_go_forward(&self) -> bool {
        self.pagination.has_next() && !self.loading
    }

    pub fn can_go_back(&self) -> bool {
        self.pagination.has_previous() && !self.loading
    }

    /// Connected when the toolkit needs no auth or its account is active.
    pub fn is_connected(&self, config: &ProjectConfig) -> bool {
        self.toolkit.no_auth
            || config
                .account(&self.toolkit.slug)
                .is_some_and(|a| a.status == AccountStatus::Active)
    }

    // ========================================================================
    // Loading
    // ========================================================================

    /// Issue a page request, superseding any in flight.
    pub fn begin_load(&mut self, cursor: Option<String>, reset_history: bool) -> PageRequest {
        self.latest_token += 1;
        self.loading = true;
        tracing::debug!(
            "Loading {} page (token {}, cursor {:?})",
            self.toolkit.slug,
            self.latest_token,
            cursor
        );
        PageRequest {
            token: self.latest_token,
            toolkit: self.toolkit.slug.clone(),
            cursor,
            reset_history,
        }
    }

    /// Apply a listing response if it answers the latest request.
    pub fn finish_load(
        &mut self,
        request: &PageRequest,
        result: Result<ToolPage, CatalogError>,
    ) -> LoadOutcome {
        if request.token != self.latest_token {
            tracing::warn!(
                "Dropping stale {} page (token {}, latest {})",
                request.toolkit,
                request.token,
                self.latest_token
            );
            return LoadOutcome::Stale;
        }

        self.loading = false;
        match result {
            Ok(page) => {
                if request.reset_history {
                    self.pagination.reset();
                }
                self.tools = page.items;
                self.pagination.set_next(page.next_cursor);
                LoadOutcome::Applied
            }
            Err(e) => {
                tracing::error!("Error loading tools for {}: {}", request.toolkit, e);
                self.tools.clear();
                LoadOutcome::Failed
            }
        }
    }

    async fn fetch(
        &mut self,
        catalog: &dyn ToolCatalog,
        cursor: Option<String>,
        reset_history: bool,
    ) -> LoadOutcome {
        let request = self.begin_load(cursor, reset_history);
        let result = catalog
            .list_tools(&request.toolkit, request.cursor.as_deref())
            .await;
        self.finish_load(&request, result)
    }

    /// Open the panel: restore the saved selection, then load the first page.
    pub async fn open(
        &mut self,
        catalog: &dyn ToolCatalog,
        workflow: &dyn WorkflowStore,
    ) -> LoadOutcome {
        self.open = true;
        self.load_selection(workflow).await;
        self.fetch(catalog, None, true).await
    }

    async fn load_selection(&mut self, workflow: &dyn WorkflowStore) {
        match workflow.selected_tools(&self.project_id).await {
            Ok(tools) => {
                if !tools.is_empty() {
                    self.selected = tools.into_iter().map(|t| t.slug).collect();
                    self.has_changes = false;
                }
            }
            Err(e) => {
                tracing::error!("Error loading selected tools for {}: {}", self.project_id, e);
            }
        }
    }

    /// Load the following page. `None` when there is no next page or a
    /// load is already running.
    pub async fn next_page(&mut self, catalog: &dyn ToolCatalog) -> Option<LoadOutcome> {
        if !self.can_go_forward() {
            return None;
        }
        let cursor = self.pagination.advance()?;
        Some(self.fetch(catalog, Some(cursor), false).await)
    }

    /// Reload the page before the current one.
    pub async fn previous_page(&mut self, catalog: &dyn ToolCatalog) -> Option<LoadOutcome> {
        if !self.can_go_back() {
            return None;
        }
        let cursor = self.pagination.back()?;
        Some(self.fetch(catalog, cursor, false).await)
    }

    // ========================================================================
    // Selection
    // ========================================================================

    pub fn set_selected(&mut self, slug: &str, selected: bool) {
        if selected {
            self.selected.insert(slug.to_string());
        } else {
            self.selected.remove(slug);
        }
        self.has_changes = true;
    }

    pub fn toggle_selected(&mut self, slug: &str) -> bool {
        let selected = !self.is_selected(slug);
        self.set_selected(slug, selected);
        selected
    }

    /// Persist the selection for the tools on the current page.
    ///
    /// Selections saved from other pages stay stored. Returns how many of
    /// the page's tools are selected.
    pub async fn save(&mut self, workflow: &dyn WorkflowStore) -> Result<usize, WorkflowError> {
        let tools: Vec<Tool> = self
            .tools
            .iter()
            .filter(|t| self.selected.contains(&t.slug))
            .cloned()
            .collect();

        let result = workflow
            .update_selected_tools(&self.project_id, &self.toolkit.slug, &self.tools, &tools)
            .await;
        match result {
            Ok(()) => {
                self.has_changes = false;
                Ok(tools.len())
            }
            Err(e) => {
                tracing::error!("Error saving tools for {}: {}", self.project_id, e);
                Err(e)
            }
        }
    }

    // ========================================================================
    // Account connection
    // ========================================================================

    pub fn connect(&mut self) {
        self.show_auth_modal = true;
    }

    /// The auth flow finished; callers should refresh the project config.
    pub fn auth_complete(&mut self) {
        self.show_auth_modal = false;
    }

    /// Delete this toolkit's connected account, if any, and drop the
    /// toolkit's tools from the project's selection.
    pub async fn disconnect(
        &mut self,
        catalog: &dyn ToolCatalog,
        workflow: &dyn WorkflowStore,
        config: &ProjectConfig,
    ) -> Result<DisconnectOutcome, CatalogError> {
        self.processing_auth = true;
        let result = match config.account(&self.toolkit.slug) {
            None => Ok(DisconnectOutcome::NoAccount),
            Some(account) => catalog
                .delete_connected_account(&self.project_id, &self.toolkit.slug, &account.id)
                .await
                .map(|()| DisconnectOutcome::Disconnected),
        };
        if result.as_ref().is_ok_and(|o| *o == DisconnectOutcome::Disconnected) {
            self.remove_toolkit_tools(workflow).await;
        }
        self.processing_auth = false;

        if let Err(e) = &result {
            tracing::error!("Disconnect failed for {}: {}", self.toolkit.slug, e);
        }
        result
    }

    async fn remove_toolkit_tools(&mut self, workflow: &dyn WorkflowStore) {
        for tool in &self.tools {
            self.selected.remove(&tool.slug);
        }
        match workflow
            .remove_toolkit_tools(&self.project_id, &self.toolkit.slug)
            .await
        {
            Ok(slugs) => {
                tracing::info!("Removed {} {} tools from {}", slugs.len(), self.toolkit.slug, self.project_id);
                for slug in &slugs {
                    self.selected.remove(slug);
                }
            }
            Err(e) => {
                tracing::error!("Error removing {} tools for {}: {}", self.toolkit.slug, self.project_id, e);
            }
        }
    }

    // ========================================================================
    // Closing
    // ========================================================================

    pub fn request_close(&mut self) -> CloseOutcome {
        if self.has_changes {
            return CloseOutcome::NeedsConfirmation;
        }
        self.close();
        CloseOutcome::Closed
    }

    /// Answer a close confirmation. Declining keeps all state.
    pub fn confirm_close(&mut self, discard_changes: bool) -> bool {
        if discard_changes {
            self.close();
        }
        discard_changes
    }

    fn close(&mut self) {
        self.tools.clear();
        self.selected.clear();
        self.has_changes = false;
        self.pagination.reset();
        self.loading = false;
        self.show_auth_modal = false;
        self.open = false;
        // anything still in flight belongs to the closed session
        self.latest_token += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::toolkit::catalog::{CatalogFile, CatalogToolkit, ConnectedAccount, StaticCatalog};
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Mutex;

    fn tool(n: usize) -> Tool {
        Tool {
            slug: format!("TOOL_{}", n),
            name: format!("Tool {}", n),
            description: String::new(),
        }
    }

    fn github() -> Toolkit {
        Toolkit {
            slug: "github".into(),
            name: "GitHub".into(),
            logo: None,
            no_auth: false,
        }
    }

    fn catalog(count: usize, page_size: usize) -> StaticCatalog {
        StaticCatalog::new(
            CatalogFile {
                toolkits: vec![CatalogToolkit {
                    toolkit: github(),
                    tools: (1..=count).map(tool).collect(),
                }],
                connected_accounts: HashMap::from([(
                    "github".to_string(),
                    ConnectedAccount {
                        id: "acc_1".into(),
                        status: AccountStatus::Active,
                    },
                )]),
            },
            page_size,
        )
    }

    #[derive(Default)]
    struct MemoryWorkflow {
        tools: Mutex<Vec<Tool>>,
        toolkits: Mutex<HashMap<String, String>>,
        fail: AtomicBool,
    }

    impl MemoryWorkflow {
        fn check(&self) -> Result<(), WorkflowError> {
            if self.fail.load(Ordering::SeqCst) {
                return Err(WorkflowError::Unavailable("down".into()));
            }
            Ok(())
        }

        fn stored(&self) -> Vec<Tool> {
            self.tools.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl WorkflowStore for MemoryWorkflow {
        async fn selected_tools(&self, _project_id: &str) -> Result<Vec<Tool>, WorkflowError> {
            self.check()?;
            Ok(self.stored())
        }

        async fn update_selected_tools(
            &self,
            _project_id: &str,
            toolkit_slug: &str,
            shown: &[Tool],
            selected: &[Tool],
        ) -> Result<(), WorkflowError> {
            self.check()?;
            let mut tools = self.tools.lock().unwrap();
            tools.retain(|t| selected.contains(t) || !shown.iter().any(|s| s.slug == t.slug));
            for tool in selected {
                match tools.iter_mut().find(|t| t.slug == tool.slug) {
                    Some(existing) => *existing = tool.clone(),
                    None => tools.push(tool.clone()),
                }
                self.toolkits
                    .lock()
                    .unwrap()
                    .insert(tool.slug.clone(), toolkit_slug.to_string());
            }
            Ok(())
        }

        async fn remove_toolkit_tools(
            &self,
            _project_id: &str,
            toolkit_slug: &str,
        ) -> Result<Vec<String>, WorkflowError> {
            self.check()?;
            let toolkits = self.toolkits.lock().unwrap();
            let mut removed = Vec::new();
            self.tools.lock().unwrap().retain(|t| {
                let matches = toolkits.get(&t.slug).is_some_and(|k| k == toolkit_slug);
                if matches {
                    removed.push(t.slug.clone());
                }
                !matches
            });
            Ok(removed)
        }
    }

    struct BrokenCatalog;

    #[async_trait]
    impl ToolCatalog for BrokenCatalog {
        async fn list_tools(&self, _: &str, _: Option<&str>) -> Result<ToolPage, CatalogError> {
            Err(CatalogError::Unavailable("timeout".into()))
        }

        async fn delete_connected_account(&self, _: &str, _: &str, _: &str) -> Result<(), CatalogError> {
            Err(CatalogError::Unavailable("timeout".into()))
        }
    }

    // ========================================================================
    // Pagination
    // ========================================================================

    #[tokio::test]
    async fn test_three_tools_page_size_two() {
        let catalog = catalog(3, 2);
        let workflow = MemoryWorkflow::default();
        let mut panel = ToolsPanel::new("proj", github());

        assert_eq!(panel.open(&catalog, &workflow).await, LoadOutcome::Applied);
        assert_eq!(panel.tools(), &[tool(1), tool(2)]);
        assert!(panel.can_go_forward());
        assert!(!panel.can_go_back());

        assert_eq!(panel.next_page(&catalog).await, Some(LoadOutcome::Applied));
        assert_eq!(panel.tools(), &[tool(3)]);
        assert!(!panel.can_go_forward());
        assert!(panel.can_go_back());
        assert_eq!(panel.page_number(), 2);

        assert_eq!(panel.previous_page(&catalog).await, Some(LoadOutcome::Applied));
        assert_eq!(panel.tools(), &[tool(1), tool(2)]);
        assert_eq!(panel.page_number(), 1);
        assert!(panel.can_go_forward());

        // the back step replayed the held cursor rather than reopening
        let requests = catalog.requests();
        assert_eq!(requests.len(), 3);
        assert_eq!(requests[2].1, None);
    }

    #[tokio::test]
    async fn test_next_page_on_last_page_is_noop() {
        let catalog = catalog(2, 2);
        let mut panel = ToolsPanel::new("proj", github());
        panel.open(&catalog, &MemoryWorkflow::default()).await;

        assert_eq!(panel.next_page(&catalog).await, None);
        assert_eq!(panel.previous_page(&catalog).await, None);
        assert_eq!(catalog.requests().len(), 1);
    }

    #[tokio::test]
    async fn test_reopen_resets_history() {
        let catalog = catalog(5, 2);
        let workflow = MemoryWorkflow::default();
        let mut panel = ToolsPanel::new("proj", github());
        panel.open(&catalog, &workflow).await;
        panel.next_page(&catalog).await;
        assert_eq!(panel.page_number(), 2);

        panel.open(&catalog, &workflow).await;
        assert_eq!(panel.page_number(), 1);
        assert!(!panel.can_go_back());
    }

    #[tokio::test]
    async fn test_listing_failure_leaves_empty_page() {
        let mut panel = ToolsPanel::new("proj", github());
        let outcome = panel.open(&BrokenCatalog, &MemoryWorkflow::default()).await;
        assert_eq!(outcome, LoadOutcome::Failed);
        assert!(panel.tools().is_empty());
        assert!(!panel.is_loading());
    }

    #[test]
    fn test_stale_response_dropped() {
        let mut panel = ToolsPanel::new("proj", github());
        let first = panel.begin_load(None, true);
        let second = panel.begin_load(Some("c".into()), false);

        let newer = ToolPage {
            items: vec![tool(9)],
            next_cursor: None,
        };
        assert_eq!(panel.finish_load(&second, Ok(newer)), LoadOutcome::Applied);

        let older = ToolPage {
            items: vec![tool(1)],
            next_cursor: Some("x".into()),
        };
        assert_eq!(panel.finish_load(&first, Ok(older)), LoadOutcome::Stale);
        assert_eq!(panel.tools(), &[tool(9)]);
        assert!(!panel.can_go_forward());
    }

    #[test]
    fn test_stale_response_does_not_clear_loading() {
        let mut panel = ToolsPanel::new("proj", github());
        let first = panel.begin_load(None, true);
        let _second = panel.begin_load(None, true);
        panel.finish_load(&first, Ok(ToolPage::default()));
        assert!(panel.is_loading());
        assert!(!panel.can_go_forward());
    }

    // ========================================================================
    // Selection and saving
    // ========================================================================

    #[tokio::test]
    async fn test_open_restores_selection() {
        let catalog = catalog(3, 2);
        let workflow = MemoryWorkflow::default();
        *workflow.tools.lock().unwrap() = vec![tool(2)];

        let mut panel = ToolsPanel::new("proj", github());
        panel.open(&catalog, &workflow).await;
        assert!(panel.is_selected("TOOL_2"));
        assert!(!panel.is_selected("TOOL_1"));
        assert!(!panel.has_changes());
    }

    #[tokio::test]
    async fn test_selection_load_failure_is_logged() {
        let catalog = catalog(3, 2);
        let workflow = MemoryWorkflow::default();
        workflow.fail.store(true, Ordering::SeqCst);

        let mut panel = ToolsPanel::new("proj", github());
        assert_eq!(panel.open(&catalog, &workflow).await, LoadOutcome::Applied);
        assert_eq!(panel.selected().count(), 0);
    }

    #[tokio::test]
    async fn test_save_sends_selected_tools_on_page() {
        let catalog = catalog(3, 2);
        let workflow = MemoryWorkflow::default();
        let mut panel = ToolsPanel::new("proj", github());
        panel.open(&catalog, &workflow).await;

        panel.set_selected("TOOL_1", true);
        // not on the current page
        panel.set_selected("TOOL_3", true);
        assert!(panel.has_changes());

        assert_eq!(panel.save(&workflow).await.unwrap(), 1);
        assert!(!panel.has_changes());
        assert_eq!(workflow.stored(), vec![tool(1)]);
    }

    #[tokio::test]
    async fn test_save_on_each_page_keeps_both() {
        let catalog = catalog(3, 2);
        let workflow = MemoryWorkflow::default();
        let mut panel = ToolsPanel::new("proj", github());
        panel.open(&catalog, &workflow).await;

        panel.set_selected("TOOL_1", true);
        panel.save(&workflow).await.unwrap();

        panel.next_page(&catalog).await;
        panel.set_selected("TOOL_3", true);
        panel.save(&workflow).await.unwrap();
        assert_eq!(workflow.stored(), vec![tool(1), tool(3)]);

        // Unselecting on page one only touches page one
        panel.previous_page(&catalog).await;
        panel.set_selected("TOOL_1", false);
        panel.save(&workflow).await.unwrap();
        assert_eq!(workflow.stored(), vec![tool(3)]);

        let mut reopened = ToolsPanel::new("proj", github());
        reopened.open(&catalog, &workflow).await;
        assert!(reopened.is_selected("TOOL_3"));
        assert!(!reopened.is_selected("TOOL_1"));
    }

    #[tokio::test]
    async fn test_failed_save_keeps_changes() {
        let catalog = catalog(3, 2);
        let workflow = MemoryWorkflow::default();
        let mut panel = ToolsPanel::new("proj", github());
        panel.open(&catalog, &workflow).await;
        panel.toggle_selected("TOOL_1");

        workflow.fail.store(true, Ordering::SeqCst);
        assert!(panel.save(&workflow).await.is_err());
        assert!(panel.has_changes());
    }

    #[test]
    fn test_toggle_selected() {
        let mut panel = ToolsPanel::new("proj", github());
        assert!(panel.toggle_selected("A"));
        assert!(!panel.toggle_selected("A"));
        assert!(panel.has_changes());
    }

    // ========================================================================
    // Connection
    // ========================================================================

    #[test]
    fn test_is_connected() {
        let panel = ToolsPanel::new("proj", github());
        let mut config = ProjectConfig::default();
        assert!(!panel.is_connected(&config));

        config.connected_accounts.insert(
            "github".into(),
            ConnectedAccount {
                id: "a".into(),
                status: AccountStatus::Initiated,
            },
        );
        assert!(!panel.is_connected(&config));

        config.connected_accounts.get_mut("github").unwrap().status = AccountStatus::Active;
        assert!(panel.is_connected(&config));

        let mut open_kit = github();
        open_kit.no_auth = true;
        assert!(ToolsPanel::new("proj", open_kit).is_connected(&ProjectConfig::default()));
    }

    #[test]
    fn test_connect_modal() {
        let mut panel = ToolsPanel::new("proj", github());
        panel.connect();
        assert!(panel.show_auth_modal());
        panel.auth_complete();
        assert!(!panel.show_auth_modal());
    }

    #[tokio::test]
    async fn test_connect_then_auth_complete_is_connected() {
        let catalog = catalog(1, 2);
        let workflow = MemoryWorkflow::default();
        let mut panel = ToolsPanel::new("proj", github());
        let config = catalog.project_config();
        panel.disconnect(&catalog, &workflow, &config).await.unwrap();
        assert!(!panel.is_connected(&catalog.project_config()));

        panel.connect();
        catalog.connect_account("github").unwrap();
        panel.auth_complete();
        assert!(!panel.show_auth_modal());
        assert!(panel.is_connected(&catalog.project_config()));
    }

    #[tokio::test]
    async fn test_disconnect() {
        let catalog = catalog(1, 2);
        let mut panel = ToolsPanel::new("proj", github());

        let workflow = MemoryWorkflow::default();

        let config = catalog.project_config();
        assert_eq!(
            panel.disconnect(&catalog, &workflow, &config).await.unwrap(),
            DisconnectOutcome::Disconnected
        );
        assert!(!panel.is_processing_auth());

        let config = catalog.project_config();
        assert_eq!(
            panel.disconnect(&catalog, &workflow, &config).await.unwrap(),
            DisconnectOutcome::NoAccount
        );
    }

    #[tokio::test]
    async fn test_disconnect_removes_toolkit_tools() {
        let catalog = catalog(3, 2);
        let workflow = MemoryWorkflow::default();
        workflow
            .update_selected_tools("proj", "slack", &[tool(9)], &[tool(9)])
            .await
            .unwrap();

        let mut panel = ToolsPanel::new("proj", github());
        panel.open(&catalog, &workflow).await;
        panel.set_selected("TOOL_1", true);
        panel.save(&workflow).await.unwrap();
        panel.next_page(&catalog).await;
        panel.set_selected("TOOL_3", true);
        panel.save(&workflow).await.unwrap();

        let config = catalog.project_config();
        assert_eq!(
            panel.disconnect(&catalog, &workflow, &config).await.unwrap(),
            DisconnectOutcome::Disconnected
        );
        assert_eq!(workflow.stored(), vec![tool(9)]);
        assert!(!panel.is_selected("TOOL_1"));
        assert!(!panel.is_selected("TOOL_3"));
        assert!(panel.is_selected("TOOL_9"));
    }

    #[tokio::test]
    async fn test_disconnect_failure_clears_processing() {
        let mut panel = ToolsPanel::new("proj", github());
        let workflow = MemoryWorkflow::default();
        *workflow.tools.lock().unwrap() = vec![tool(1)];
        let config = catalog(1, 2).project_config();
        assert!(panel
            .disconnect(&BrokenCatalog, &workflow, &config)
            .await
            .is_err());
        assert!(!panel.is_processing_auth());
        // the account is still there, so are its tools
        assert_eq!(workflow.stored(), vec![tool(1)]);
    }

    // ========================================================================
    // Closing
    // ========================================================================

    #[tokio::test]
    async fn test_close_without_changes() {
        let catalog = catalog(3, 2);
        let mut panel = ToolsPanel::new("proj", github());
        panel.open(&catalog, &MemoryWorkflow::default()).await;

        assert_eq!(panel.request_close(), CloseOutcome::Closed);
        assert!(!panel.is_open());
        assert!(panel.tools().is_empty());
    }

    #[tokio::test]
    async fn test_close_with_changes_needs_confirmation() {
        let catalog = catalog(3, 2);
        let mut panel = ToolsPanel::new("proj", github());
        panel.open(&catalog, &MemoryWorkflow::default()).await;
        panel.set_selected("TOOL_1", true);

        assert_eq!(panel.request_close(), CloseOutcome::NeedsConfirmation);
        assert!(!panel.confirm_close(false));
        assert!(panel.is_open());
        assert!(panel.is_selected("TOOL_1"));

        assert!(panel.confirm_close(true));
        assert!(!panel.is_open());
        assert!(!panel.has_changes());
        assert_eq!(panel.selected().count(), 0);
    }

    #[test]
    fn test_close_drops_in_flight_response() {
        let mut panel = ToolsPanel::new("proj", github());
        let request = panel.begin_load(None, true);
        panel.request_close();
        let page = ToolPage {
            items: vec![tool(1)],
            next_cursor: None,
        };
        assert_eq!(panel.finish_load(&request, Ok(page)), LoadOutcome::Stale);
        assert!(panel.tools().is_empty());
    }
}
