//! Transcript message types.
//!
//! Defines the messages, tool calls, and tool results that make up a
//! conversation as it is received from the agent runtime.

use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Prefix reserved for tool calls that hand the conversation to another agent.
pub const TRANSFER_PREFIX: &str = "transfer_to_";

/// How an assistant response should be shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseType {
    #[default]
    Normal,
    /// Agent-to-agent chatter, only visible in debug mode
    Internal,
}

/// The function half of a tool call.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FunctionCall {
    pub name: String,
    /// Serialized arguments, usually JSON
    #[serde(default)]
    pub arguments: String,
}

/// A request from an assistant turn to invoke a named function.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ToolCall {
    pub id: String,
    pub function: FunctionCall,
}

impl ToolCall {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        arguments: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            function: FunctionCall {
                name: name.into(),
                arguments: arguments.into(),
            },
        }
    }

    pub fn name(&self) -> &str {
        &self.function.name
    }

    pub fn arguments(&self) -> &str {
        &self.function.arguments
    }

    /// Returns true if this call transfers control to another agent
    pub fn is_transfer(&self) -> bool {
        self.function.name.starts_with(TRANSFER_PREFIX)
    }
}

/// Output of a tool call, keyed by the call's id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolResult {
    pub tool_call_id: String,
    pub content: String,
}

impl ToolResult {
    pub fn new(tool_call_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            tool_call_id: tool_call_id.into(),
            content: content.into(),
        }
    }
}

/// Tool results indexed by tool-call id.
pub type ToolResults = HashMap<String, ToolResult>;

/// An assistant turn: either text content or a batch of tool calls.
#[derive(Debug, Clone, PartialEq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssistantMessage {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_type: Option<ResponseType>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tool_calls: Vec<ToolCall>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl AssistantMessage {
    pub fn has_tool_calls(&self) -> bool {
        !self.tool_calls.is_empty()
    }

    pub fn has_content(&self) -> bool {
        self.content.as_deref().is_some_and(|c| !c.is_empty())
    }

    pub fn is_internal(&self) -> bool {
        self.response_type == Some(ResponseType::Internal)
    }

    pub fn content_or_empty(&self) -> &str {
        self.content.as_deref().unwrap_or("")
    }
}

/// A single transcript entry.
#[derive(Debug, Clone, PartialEq, Hash, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "lowercase")]
pub enum Message {
    #[serde(rename_all = "camelCase")]
    User {
        content: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        created_at: Option<DateTime<Utc>>,
    },
    Assistant(AssistantMessage),
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self::User {
            content: content.into(),
            created_at: None,
        }
    }

    /// Plain assistant text from the named agent
    pub fn assistant(agent_name: impl Into<String>, content: impl Into<String>) -> Self {
        Self::Assistant(AssistantMessage {
            content: Some(content.into()),
            response_type: Some(ResponseType::Normal),
            agent_name: Some(agent_name.into()),
            ..Default::default()
        })
    }

    /// Internal assistant text, visible only in debug mode
    pub fn internal(agent_name: impl Into<String>, content: impl Into<String>) -> Self {
        Self::Assistant(AssistantMessage {
            content: Some(content.into()),
            response_type: Some(ResponseType::Internal),
            agent_name: Some(agent_name.into()),
            ..Default::default()
        })
    }

    pub fn tool_calls(agent_name: impl Into<String>, calls: Vec<ToolCall>) -> Self {
        Self::Assistant(AssistantMessage {
            tool_calls: calls,
            agent_name: Some(agent_name.into()),
            ..Default::default()
        })
    }

    /// Attach a creation timestamp.
    pub fn at(mut self, timestamp: DateTime<Utc>) -> Self {
        match &mut self {
            Self::User { created_at, .. } => *created_at = Some(timestamp),
            Self::Assistant(msg) => msg.created_at = Some(timestamp),
        }
        self
    }

    pub fn is_user(&self) -> bool {
        matches!(self, Self::User { .. })
    }

    pub fn is_assistant(&self) -> bool {
        matches!(self, Self::Assistant(_))
    }

    pub fn as_assistant(&self) -> Option<&AssistantMessage> {
        match self {
            Self::Assistant(msg) => Some(msg),
            Self::User { .. } => None,
        }
    }

    /// Content hash identifying this message across renders.
    pub fn fingerprint(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.hash(&mut hasher);
        hasher.finish()
    }

    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        match self {
            Self::User { created_at, .. } => *created_at,
            Self::Assistant(msg) => msg.created_at,
        }
    }
}

/// A tool declared by the workflow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowTool {
    pub name: String,
    #[serde(default)]
    pub description: String,
}

/// Read-only view of the workflow's declared tools.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Workflow {
    #[serde(default)]
    pub tools: Vec<WorkflowTool>,
}

impl Workflow {
    /// Find the declared tool matching a call name. A miss is not an error.
    pub fn find_tool(&self, name: &str) -> Option<&WorkflowTool> {
        self.tools.iter().find(|t| t.name == name)
    }
}
