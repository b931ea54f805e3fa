//! Message kind dispatch.
//!
//! Decides, for each transcript position, which kind of entry to render and
//! whether the view configuration suppresses it.

use serde::Deserialize;

use super::message::{Message, ToolCall, ToolResult};
use super::render::ViewConfig;

/// Render instruction for one transcript position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderKind {
    User,
    Assistant,
    Internal,
    ToolCallGroup,
    /// Hidden by the current view configuration
    Suppressed,
}

impl RenderKind {
    pub fn is_visible(self) -> bool {
        self != RenderKind::Suppressed
    }
}

/// Choose how to render `message`.
///
/// Tool calls take precedence over content; internal content is only
/// shown in debug mode.
pub fn dispatch(message: &Message, config: &ViewConfig) -> RenderKind {
    let Some(assistant) = message.as_assistant() else {
        return RenderKind::User;
    };

    if assistant.has_tool_calls() {
        return if config.show_debug_messages {
            RenderKind::ToolCallGroup
        } else {
            RenderKind::Suppressed
        };
    }

    if assistant.has_content() && assistant.is_internal() {
        return if config.show_debug_messages {
            RenderKind::Internal
        } else {
            RenderKind::Suppressed
        };
    }

    RenderKind::Assistant
}

/// Index of the earliest assistant-role message, whatever its sub-kind.
pub fn first_assistant_index(messages: &[Message]) -> Option<usize> {
    messages.iter().position(Message::is_assistant)
}

/// Dispatch decision for a transcript position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dispatched {
    pub index: usize,
    pub kind: RenderKind,
    pub is_first_assistant: bool,
}

/// Dispatch every position of the transcript, in order.
///
/// Suppressed positions are kept so callers can see what was hidden.
pub fn dispatch_transcript(messages: &[Message], config: &ViewConfig) -> Vec<Dispatched> {
    let first_assistant = first_assistant_index(messages);
    messages
        .iter()
        .enumerate()
        .map(|(index, message)| Dispatched {
            index,
            kind: dispatch(message, config),
            is_first_assistant: first_assistant == Some(index),
        })
        .collect()
}

/// True when the message hands the conversation to another agent.
pub fn is_agent_transition(message: &Message) -> bool {
    message
        .as_assistant()
        .is_some_and(|a| a.tool_calls.iter().any(ToolCall::is_transfer))
}

/// True for assistant messages that are not agent transitions.
pub fn is_plain_assistant(message: &Message) -> bool {
    message.is_assistant() && !is_agent_transition(message)
}

/// Per-call classification inside a tool-call group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolCallKind {
    Handoff,
    Generic,
}

pub fn classify_tool_call(call: &ToolCall) -> ToolCallKind {
    if call.is_transfer() {
        ToolCallKind::Handoff
    } else {
        ToolCallKind::Generic
    }
}

#[derive(Deserialize)]
struct TransferResult {
    assistant: String,
}

/// Target agent named in a transfer result.
///
/// Returns `None` while the result is pending or if the payload doesn't
/// decode; the hand-off entry then renders nothing.
pub fn handoff_target(result: Option<&ToolResult>) -> Option<String> {
    let result = result?;
    match serde_json::from_str::<TransferResult>(&result.content) {
        Ok(parsed) => Some(parsed.assistant),
        Err(e) => {
            tracing::debug!(
                tool_call_id = %result.tool_call_id,
                "Transfer result did not decode: {}",
                e
            );
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transcript::message::AssistantMessage;

    fn debug_on() -> ViewConfig {
        ViewConfig::default()
    }

    fn debug_off() -> ViewConfig {
        ViewConfig {
            show_debug_messages: false,
            ..Default::default()
        }
    }

    #[test]
    fn test_user_always_user() {
        let msg = Message::user("hi");
        assert_eq!(dispatch(&msg, &debug_on()), RenderKind::User);
        assert_eq!(dispatch(&msg, &debug_off()), RenderKind::User);
    }

    #[test]
    fn test_tool_calls_gated_by_debug() {
        let msg = Message::tool_calls("a", vec![ToolCall::new("1", "lookup", "{}")]);
        assert_eq!(dispatch(&msg, &debug_on()), RenderKind::ToolCallGroup);
        assert_eq!(dispatch(&msg, &debug_off()), RenderKind::Suppressed);
    }

    #[test]
    fn test_tool_calls_win_over_content() {
        let msg = Message::Assistant(AssistantMessage {
            content: Some("thinking".into()),
            tool_calls: vec![ToolCall::new("1", "lookup", "{}")],
            ..Default::default()
        });
        assert_eq!(dispatch(&msg, &debug_on()), RenderKind::ToolCallGroup);
    }

    #[test]
    fn test_internal_gated_by_debug() {
        let msg = Message::internal("a", "x");
        assert_eq!(dispatch(&msg, &debug_on()), RenderKind::Internal);
        assert_eq!(dispatch(&msg, &debug_off()), RenderKind::Suppressed);
    }

    #[test]
    fn test_internal_without_content_is_plain_assistant() {
        let msg = Message::internal("a", "");
        assert_eq!(dispatch(&msg, &debug_off()), RenderKind::Assistant);
    }

    #[test]
    fn test_plain_assistant_visible_without_debug() {
        let msg = Message::assistant("a", "hello");
        assert_eq!(dispatch(&msg, &debug_off()), RenderKind::Assistant);

        let untyped = Message::Assistant(AssistantMessage {
            content: Some("hello".into()),
            ..Default::default()
        });
        assert_eq!(dispatch(&untyped, &debug_off()), RenderKind::Assistant);
    }

    #[test]
    fn test_first_assistant_index() {
        let messages = vec![
            Message::user("a"),
            Message::user("b"),
            Message::internal("x", "c"),
            Message::assistant("x", "d"),
        ];
        assert_eq!(first_assistant_index(&messages), Some(2));
        assert_eq!(first_assistant_index(&[Message::user("only")]), None);
        assert_eq!(first_assistant_index(&[]), None);
    }

    #[test]
    fn test_dispatch_transcript_flags_one_first_assistant() {
        let messages = vec![
            Message::user("a"),
            Message::tool_calls("x", vec![ToolCall::new("1", "lookup", "{}")]),
            Message::assistant("x", "b"),
        ];
        let dispatched = dispatch_transcript(&messages, &debug_off());
        assert_eq!(dispatched.len(), 3);
        assert_eq!(dispatched[1].kind, RenderKind::Suppressed);
        let firsts: Vec<usize> = dispatched
            .iter()
            .filter(|d| d.is_first_assistant)
            .map(|d| d.index)
            .collect();
        assert_eq!(firsts, vec![1]);
    }

    #[test]
    fn test_agent_transition_detection() {
        let transfer = Message::tool_calls(
            "a",
            vec![
                ToolCall::new("1", "lookup", "{}"),
                ToolCall::new("2", "transfer_to_billing", "{}"),
            ],
        );
        let plain_calls = Message::tool_calls("a", vec![ToolCall::new("1", "lookup", "{}")]);

        assert!(is_agent_transition(&transfer));
        assert!(!is_plain_assistant(&transfer));
        assert!(!is_agent_transition(&plain_calls));
        assert!(is_plain_assistant(&plain_calls));
        assert!(!is_plain_assistant(&Message::user("x")));
    }

    #[test]
    fn test_classify_tool_call() {
        assert_eq!(
            classify_tool_call(&ToolCall::new("1", "transfer_to_x", "")),
            ToolCallKind::Handoff
        );
        assert_eq!(
            classify_tool_call(&ToolCall::new("1", "search", "")),
            ToolCallKind::Generic
        );
    }

    #[test]
    fn test_handoff_target() {
        let result = ToolResult::new("1", r#"{"assistant":"Billing Agent"}"#);
        assert_eq!(handoff_target(Some(&result)).as_deref(), Some("Billing Agent"));
    }

    #[test]
    fn test_handoff_target_pending_or_garbage() {
        assert_eq!(handoff_target(None), None);
        let garbage = ToolResult::new("1", "transferred!");
        assert_eq!(handoff_target(Some(&garbage)), None);
        let wrong_shape = ToolResult::new("1", r#"{"agent":"x"}"#);
        assert_eq!(handoff_target(Some(&wrong_shape)), None);
    }
}
