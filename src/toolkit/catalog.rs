//! Tool catalog and workflow collaborators.
//!
//! The catalog lists a toolkit's tools page by page and manages connected
//! accounts. The workflow store persists which tools a project has selected.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Mutex;

use async_trait::async_trait;
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Unknown toolkit: {0}")]
    UnknownToolkit(String),
    #[error("Invalid cursor: {0}")]
    InvalidCursor(String),
    #[error("Connected account not found: {0}")]
    AccountNotFound(String),
    #[error("Catalog unavailable: {0}")]
    Unavailable(String),
    #[error("Failed to read catalog file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse catalog file: {0}")]
    Parse(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("Workflow store unavailable: {0}")]
    Unavailable(String),
}

/// A third-party integration exposing a set of tools.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Toolkit {
    pub slug: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo: Option<String>,
    /// Usable without connecting an account
    #[serde(default)]
    pub no_auth: bool,
}

/// A single tool offered by a toolkit.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Tool {
    pub slug: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
}

/// One page of a tool listing.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ToolPage {
    pub items: Vec<Tool>,
    /// Opaque token for the following page; `None` on the last page
    #[serde(default)]
    pub next_cursor: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AccountStatus {
    Active,
    Initiated,
    Failed,
    Expired,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectedAccount {
    pub id: String,
    pub status: AccountStatus,
}

/// Project-level connection state, keyed by toolkit slug.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectConfig {
    #[serde(default)]
    pub connected_accounts: HashMap<String, ConnectedAccount>,
}

impl ProjectConfig {
    pub fn account(&self, toolkit_slug: &str) -> Option<&ConnectedAccount> {
        self.connected_accounts.get(toolkit_slug)
    }
}

/// Remote tool listing and account management.
#[async_trait]
pub trait ToolCatalog: Send + Sync {
    async fn list_tools(
        &self,
        toolkit_slug: &str,
        cursor: Option<&str>,
    ) -> Result<ToolPage, CatalogError>;

    async fn delete_connected_account(
        &self,
        project_id: &str,
        toolkit_slug: &str,
        account_id: &str,
    ) -> Result<(), CatalogError>;
}

/// Persistence for a project's selected tools.
#[async_trait]
pub trait WorkflowStore: Send + Sync {
    async fn selected_tools(&self, project_id: &str) -> Result<Vec<Tool>, WorkflowError>;

    /// Merge one page of a toolkit's listing into the stored selection.
    ///
    /// Tools in `shown` but not in `selected` are removed; tools in
    /// `selected` are added or refreshed. Stored tools that were not on the
    /// page are left alone.
    async fn update_selected_tools(
        &self,
        project_id: &str,
        toolkit_slug: &str,
        shown: &[Tool],
        selected: &[Tool],
    ) -> Result<(), WorkflowError>;

    /// Drop every stored tool that came from `toolkit_slug`, returning the
    /// removed slugs.
    async fn remove_toolkit_tools(
        &self,
        project_id: &str,
        toolkit_slug: &str,
    ) -> Result<Vec<String>, WorkflowError>;
}

/// Toolkit entry in a catalog file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogToolkit {
    #[serde(flatten)]
    pub toolkit: Toolkit,
    #[serde(default)]
    pub tools: Vec<Tool>,
}

/// On-disk catalog format.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogFile {
    #[serde(default)]
    pub toolkits: Vec<CatalogToolkit>,
    #[serde(default)]
    pub connected_accounts: HashMap<String, ConnectedAccount>,
}

pub const DEFAULT_PAGE_SIZE: usize = 20;

/// In-memory catalog with fixed-size pages.
pub struct StaticCatalog {
    toolkits: Vec<CatalogToolkit>,
    config: Mutex<ProjectConfig>,
    page_size: usize,
    requests: Mutex<Vec<(String, Option<String>)>>,
}

impl StaticCatalog {
    pub fn new(file: CatalogFile, page_size: usize) -> Self {
        Self {
            toolkits: file.toolkits,
            config: Mutex::new(ProjectConfig {
                connected_accounts: file.connected_accounts,
            }),
            page_size: page_size.max(1),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn load(path: &Path, page_size: usize) -> Result<Self, CatalogError> {
        let content = std::fs::read_to_string(path)?;
        let file: CatalogFile = serde_json::from_str(&content)?;
        Ok(Self::new(file, page_size))
    }

    pub fn toolkit(&self, slug: &str) -> Option<&Toolkit> {
        self.toolkits
            .iter()
            .find(|t| t.toolkit.slug == slug)
            .map(|t| &t.toolkit)
    }

    pub fn toolkits(&self) -> impl Iterator<Item = &Toolkit> {
        self.toolkits.iter().map(|t| &t.toolkit)
    }

    /// Snapshot of the connection state.
    pub fn project_config(&self) -> ProjectConfig {
        self.config
            .lock()
            .map(|c| c.clone())
            .unwrap_or_default()
    }

    /// Record a finished account connection for `toolkit_slug`.
    pub fn connect_account(&self, toolkit_slug: &str) -> Result<ConnectedAccount, CatalogError> {
        if self.toolkit(toolkit_slug).is_none() {
            return Err(CatalogError::UnknownToolkit(toolkit_slug.to_string()));
        }
        let account = ConnectedAccount {
            id: format!("ca_{}", uuid::Uuid::new_v4().simple()),
            status: AccountStatus::Active,
        };
        let mut config = self
            .config
            .lock()
            .map_err(|e| CatalogError::Unavailable(e.to_string()))?;
        config
            .connected_accounts
            .insert(toolkit_slug.to_string(), account.clone());
        Ok(account)
    }

    /// Every listing request received, in order.
    pub fn requests(&self) -> Vec<(String, Option<String>)> {
        self.requests
            .lock()
            .map(|r| r.clone())
            .unwrap_or_default()
    }
}

/// Cursors are opaque to callers; internally they carry an offset.
fn encode_cursor(offset: usize) -> String {
    URL_SAFE_NO_PAD.encode(format!("offset:{}", offset))
}

fn decode_cursor(cursor: &str) -> Result<usize, CatalogError> {
    let invalid = || CatalogError::InvalidCursor(cursor.to_string());
    let bytes = URL_SAFE_NO_PAD.decode(cursor).map_err(|_| invalid())?;
    let text = String::from_utf8(bytes).map_err(|_| invalid())?;
    text.strip_prefix("offset:")
        .and_then(|n| n.parse().ok())
        .ok_or_else(invalid)
}

#[async_trait]
impl ToolCatalog for StaticCatalog {
    async fn list_tools(
        &self,
        toolkit_slug: &str,
        cursor: Option<&str>,
    ) -> Result<ToolPage, CatalogError> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push((toolkit_slug.to_string(), cursor.map(str::to_string)));
        }

        let entry = self
            .toolkits
            .iter()
            .find(|t| t.toolkit.slug == toolkit_slug)
            .ok_or_else(|| CatalogError::UnknownToolkit(toolkit_slug.to_string()))?;

        let offset = match cursor {
            None | Some("") => 0,
            Some(c) => decode_cursor(c)?,
        };
        let len = entry.tools.len();
        if offset > len {
            return Err(CatalogError::InvalidCursor(cursor.unwrap_or_default().to_string()));
        }
        let end = offset.saturating_add(self.page_size).min(len);
        let items = entry.tools[offset..end].to_vec();
        let next_cursor = (end < entry.tools.len()).then(|| encode_cursor(end));

        Ok(ToolPage { items, next_cursor })
    }

    async fn delete_connected_account(
        &self,
        _project_id: &str,
        toolkit_slug: &str,
        account_id: &str,
    ) -> Result<(), CatalogError> {
        let mut config = self
            .config
            .lock()
            .map_err(|e| CatalogError::Unavailable(e.to_string()))?;
        match config.connected_accounts.get(toolkit_slug) {
            Some(account) if account.id == account_id => {
                config.connected_accounts.remove(toolkit_slug);
                Ok(())
            }
            _ => Err(CatalogError::AccountNotFound(account_id.to_string())),
        }
    }
}
