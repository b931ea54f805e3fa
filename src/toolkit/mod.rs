//! Toolkit browsing: paged tool listings, selection, and account connection.

mod catalog;
mod pagination;
mod panel;

pub use catalog::{
    AccountStatus, CatalogError, CatalogFile, CatalogToolkit, ConnectedAccount, ProjectConfig,
    StaticCatalog, Tool, ToolCatalog, ToolPage, Toolkit, WorkflowError, WorkflowStore,
    DEFAULT_PAGE_SIZE,
};
pub use pagination::CursorHistory;
pub use panel::{CloseOutcome, DisconnectOutcome, LoadOutcome, PageRequest, ToolsPanel};
