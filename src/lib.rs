//! Oarlock Library
//!
//! View logic for a multi-agent chat playground: turning a conversation
//! transcript into an ordered, renderable view, and browsing toolkits to
//! pick the tools a project's agents may call.
//!
//! ## Main Components
//!
//! - [`transcript`] - Content classification, message dispatch, disclosure
//!   state, and transcript rendering
//! - [`toolkit`] - Paged tool listings, selection, and account connection
//! - [`auth`] - Session lookup and lazy user provisioning
//! - [`config`] - Settings and XDG directories
//! - [`db`] - SQLite persistence
//!
//! ## Quick Start
//!
//! ```ignore
//! use oarlock::{TranscriptDocument, TranscriptSession, TerminalRenderer, ViewConfig};
//!
//! let doc = TranscriptDocument::load(path)?;
//! let mut session = TranscriptSession::new(ViewConfig::default());
//! let view = session.render(&doc.input(false));
//! TerminalRenderer::new().render(&mut std::io::stdout(), &view)?;
//! ```

pub mod auth;
pub mod config;
pub mod db;
pub mod toolkit;
pub mod transcript;

pub use auth::{require_auth, AuthError, AuthMode, Session, SessionProvider, User, UserStore};
pub use config::{Settings, SettingsError, XdgDirs};
pub use db::{Database, SqliteUserStore, SqliteWorkflowStore, StoreError};
pub use toolkit::{
    CatalogError, StaticCatalog, Tool, ToolCatalog, Toolkit, ToolsPanel, WorkflowError,
    WorkflowStore,
};
pub use transcript::{
    classify, dispatch, render_transcript, DisclosureStore, Message, RenderInput, RenderKind,
    TerminalRenderer, TranscriptDocument, TranscriptSession, TranscriptView, ViewConfig,
};
