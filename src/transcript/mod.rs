//! Transcript view logic.
//!
//! - [`content`]: classify payloads as JSON or plain text
//! - [`document`]: load saved transcripts
//! - [`dispatch`]: decide how each message renders
//! - [`disclosure`]: expand/collapse state for tool-call panels
//! - [`render`]: build the ordered view model
//! - [`session`]: own per-view state across renders
//! - [`terminal`]: draw the view model with crossterm

pub mod content;
pub mod disclosure;
pub mod dispatch;
mod document;
mod message;
pub mod render;
mod session;
pub mod terminal;

pub use content::{classify, pretty_json, ClassifiedContent, PanelContent, PanelFormat, PanelKind};
pub use disclosure::{DisclosureState, DisclosureStore, JsonViewState, PanelLayout};
pub use document::{DocumentError, TranscriptDocument};
pub use dispatch::{dispatch, first_assistant_index, RenderKind, ToolCallKind};
pub use message::{
    AssistantMessage, FunctionCall, Message, ResponseType, ToolCall, ToolResult, ToolResults,
    Workflow, WorkflowTool, TRANSFER_PREFIX,
};
pub use render::{
    render_transcript, FixRequest, RenderInput, RenderedEntry, ToolCallCard, ToolCallEntry,
    TranscriptView, ViewConfig,
};
pub use session::TranscriptSession;
pub use terminal::{RenderStyle, TerminalRenderer};
