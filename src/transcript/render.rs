//! Transcript rendering.
//!
//! Turns an ordered transcript into an ordered list of renderable entries.
//! This is the view model; [`super::terminal`] draws it.

use chrono::{DateTime, Utc};

use super::content::{classify, pretty_json, ClassifiedContent, PanelContent, PanelKind};
use super::disclosure::{DisclosureState, DisclosureStore, JsonViewState, PanelLayout};
use super::dispatch::{
    classify_tool_call, dispatch_transcript, handoff_target, Dispatched, RenderKind, ToolCallKind,
};
use super::message::{AssistantMessage, Message, ToolCall, ToolResults, Workflow};

/// Label used when a message has no agent name.
pub const DEFAULT_SENDER: &str = "Assistant";

/// Per-session view configuration.
///
/// Passed explicitly into the renderer; nothing reads display flags from
/// ambient state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewConfig {
    /// Show internal messages and tool calls
    pub show_debug_messages: bool,
    /// Open internal JSON responses in raw JSON mode
    pub show_json_mode: bool,
    /// Show the editable system message instead of the transcript
    pub show_system_message: bool,
    /// A correction handler is attached
    pub allow_fix: bool,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            show_debug_messages: true,
            show_json_mode: false,
            show_system_message: false,
            allow_fix: false,
        }
    }
}

/// Everything the renderer reads for one pass.
#[derive(Debug, Clone, Copy)]
pub struct RenderInput<'a> {
    pub messages: &'a [Message],
    pub results: &'a ToolResults,
    pub workflow: &'a Workflow,
    pub system_message: Option<&'a str>,
    /// An assistant response is being generated
    pub streaming: bool,
}

/// Payload sent to the correction handler when an entry is flagged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixRequest {
    pub text: String,
}

/// An assistant text bubble.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssistantEntry {
    pub index: usize,
    pub sender: String,
    pub content: String,
    pub latency_secs: i64,
    pub fix: Option<FixRequest>,
}

/// An internal (debug-only) assistant bubble.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InternalEntry {
    pub index: usize,
    pub sender: String,
    pub classified: ClassifiedContent,
    /// Present only when the content is JSON with a `response` key
    pub json_view: Option<JsonViewState>,
    pub formatted_json: String,
    pub latency_secs: i64,
    pub fix: Option<FixRequest>,
}

impl InternalEntry {
    /// Text to show for the current JSON view state.
    pub fn visible_text(&self) -> &str {
        match self.json_view {
            Some(view) if view.json_mode => &self.formatted_json,
            _ => &self.classified.display_text,
        }
    }
}

/// An agent hand-off inside a tool-call group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandoffEntry {
    pub tool_call_id: String,
    pub from: String,
    pub to: String,
    pub latency_secs: i64,
}

/// A generic tool call with expandable params and result panels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolCallCard {
    pub id: String,
    pub name: String,
    /// Header label; omitted when the message names no agent
    pub sender: Option<String>,
    /// Description of the matching workflow tool, if declared
    pub description: Option<String>,
    pub params: PanelContent,
    pub result: Option<PanelContent>,
    pub disclosure: DisclosureState,
    pub fix: Option<FixRequest>,
}

impl ToolCallCard {
    /// No result yet; drawn with a loading indicator
    pub fn is_pending(&self) -> bool {
        self.result.is_none()
    }

    pub fn layout(&self) -> PanelLayout {
        self.disclosure.layout()
    }

    pub fn params_visible(&self) -> bool {
        self.disclosure.params_expanded
    }

    /// The result panel is only drawn once a result exists.
    pub fn result_visible(&self) -> bool {
        self.disclosure.results_expanded && self.result.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolCallEntry {
    Handoff(HandoffEntry),
    Card(ToolCallCard),
}

/// A renderable transcript entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderedEntry {
    User {
        index: usize,
        content: String,
    },
    Assistant(AssistantEntry),
    Internal(InternalEntry),
    ToolCalls {
        index: usize,
        calls: Vec<ToolCallEntry>,
    },
    /// Trailing placeholder while the assistant is composing
    Composing,
}

impl RenderedEntry {
    /// Transcript position this entry came from.
    pub fn index(&self) -> Option<usize> {
        match self {
            RenderedEntry::User { index, .. } | RenderedEntry::ToolCalls { index, .. } => {
                Some(*index)
            }
            RenderedEntry::Assistant(entry) => Some(entry.index),
            RenderedEntry::Internal(entry) => Some(entry.index),
            RenderedEntry::Composing => None,
        }
    }

    pub fn fix(&self) -> Option<&FixRequest> {
        match self {
            RenderedEntry::Assistant(entry) => entry.fix.as_ref(),
            RenderedEntry::Internal(entry) => entry.fix.as_ref(),
            _ => None,
        }
    }
}

/// What the transcript pane shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TranscriptView {
    /// Editable system message; replaces the transcript entirely
    SystemMessage { content: String },
    Entries(Vec<RenderedEntry>),
}

impl TranscriptView {
    pub fn entries(&self) -> &[RenderedEntry] {
        match self {
            TranscriptView::Entries(entries) => entries,
            TranscriptView::SystemMessage { .. } => &[],
        }
    }
}

/// Render the transcript pane.
pub fn render_transcript(
    input: &RenderInput<'_>,
    config: &ViewConfig,
    store: &DisclosureStore,
) -> TranscriptView {
    if config.show_system_message {
        return TranscriptView::SystemMessage {
            content: input.system_message.unwrap_or_default().to_string(),
        };
    }

    let mut entries = Vec::with_capacity(input.messages.len() + 1);
    let mut last_user_at: Option<DateTime<Utc>> = None;

    for dispatched in dispatch_transcript(input.messages, config) {
        let message = &input.messages[dispatched.index];
        if let Message::User { created_at, .. } = message {
            last_user_at = *created_at;
        }
        if let Some(entry) = render_entry(input, config, store, message, dispatched, last_user_at)
        {
            entries.push(entry);
        }
    }

    if input.streaming {
        entries.push(RenderedEntry::Composing);
    }

    tracing::debug!(
        messages = input.messages.len(),
        entries = entries.len(),
        "Rendered transcript"
    );

    TranscriptView::Entries(entries)
}

fn render_entry(
    input: &RenderInput<'_>,
    config: &ViewConfig,
    store: &DisclosureStore,
    message: &Message,
    dispatched: Dispatched,
    last_user_at: Option<DateTime<Utc>>,
) -> Option<RenderedEntry> {
    let index = dispatched.index;
    let first = dispatched.is_first_assistant;

    let assistant = match message {
        Message::User { content, .. } => {
            return Some(RenderedEntry::User {
                index,
                content: content.clone(),
            });
        }
        Message::Assistant(assistant) => assistant,
    };
    let latency_secs = latency_secs(last_user_at, assistant.created_at);

    match dispatched.kind {
        RenderKind::Suppressed => None,
        RenderKind::User => None,
        RenderKind::ToolCallGroup => {
            let sender = assistant.agent_name.clone().unwrap_or_default();
            let calls = assistant
                .tool_calls
                .iter()
                .enumerate()
                .filter_map(|(i, call)| {
                    render_tool_call(
                        input,
                        config,
                        store,
                        call,
                        &sender,
                        first && i == 0,
                        latency_secs,
                    )
                })
                .collect();
            Some(RenderedEntry::ToolCalls { index, calls })
        }
        RenderKind::Internal => {
            let raw = assistant.content_or_empty();
            let classified = classify(raw);
            let json_view = (classified.is_structured && classified.has_response_key)
                .then(|| store.json_view(index, config.show_json_mode));
            Some(RenderedEntry::Internal(InternalEntry {
                index,
                sender: sender_label(assistant),
                formatted_json: pretty_json(raw),
                classified,
                json_view,
                latency_secs,
                fix: fix_request(config, first, raw),
            }))
        }
        RenderKind::Assistant => {
            let content = assistant.content_or_empty().to_string();
            Some(RenderedEntry::Assistant(AssistantEntry {
                index,
                sender: sender_label(assistant),
                fix: fix_request(config, first, &content),
                content,
                latency_secs,
            }))
        }
    }
}

fn render_tool_call(
    input: &RenderInput<'_>,
    config: &ViewConfig,
    store: &DisclosureStore,
    call: &ToolCall,
    sender: &str,
    is_first_assistant: bool,
    latency_secs: i64,
) -> Option<ToolCallEntry> {
    let result = input.results.get(&call.id);

    match classify_tool_call(call) {
        ToolCallKind::Handoff => {
            let to = handoff_target(result)?;
            Some(ToolCallEntry::Handoff(HandoffEntry {
                tool_call_id: call.id.clone(),
                from: sender.to_string(),
                to,
                latency_secs,
            }))
        }
        ToolCallKind::Generic => {
            let sender = (!sender.is_empty()).then(|| sender.to_string());
            // The fix button lives in the sender header
            let fix = sender
                .as_ref()
                .and_then(|_| fix_request(config, is_first_assistant, &tool_call_fix_text(call)));
            Some(ToolCallEntry::Card(ToolCallCard {
                id: call.id.clone(),
                name: call.name().to_string(),
                sender,
                description: input
                    .workflow
                    .find_tool(call.name())
                    .map(|tool| tool.description.clone())
                    .filter(|d| !d.is_empty()),
                params: PanelContent::new(PanelKind::Params, call.arguments()),
                result: result.map(|r| PanelContent::new(PanelKind::Result, &r.content)),
                disclosure: store.state(&call.id),
                fix,
            }))
        }
    }
}

/// Payload sent when a tool call is flagged.
pub fn tool_call_fix_text(call: &ToolCall) -> String {
    format!("Tool call: {}", call.name())
}

fn fix_request(config: &ViewConfig, is_first_assistant: bool, text: &str) -> Option<FixRequest> {
    (config.allow_fix && config.show_debug_messages && !is_first_assistant).then(|| FixRequest {
        text: text.to_string(),
    })
}

fn sender_label(assistant: &AssistantMessage) -> String {
    match assistant.agent_name.as_deref() {
        Some(name) if !name.is_empty() => name.to_string(),
        _ => DEFAULT_SENDER.to_string(),
    }
}

fn latency_secs(user_at: Option<DateTime<Utc>>, assistant_at: Option<DateTime<Utc>>) -> i64 {
    match (user_at, assistant_at) {
        (Some(user), Some(assistant)) => (assistant - user).num_seconds().max(0),
        _ => 0,
    }
}
