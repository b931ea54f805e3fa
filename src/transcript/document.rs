//! Saved transcripts.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::message::{Message, ToolResults, Workflow};
use super::render::RenderInput;

#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("Failed to read transcript: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse transcript: {0}")]
    Parse(#[from] serde_json::Error),
}

/// A conversation snapshot: messages, their tool results, and the workflow
/// that produced them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranscriptDocument {
    #[serde(default)]
    pub messages: Vec<Message>,
    #[serde(default)]
    pub tool_results: ToolResults,
    #[serde(default)]
    pub workflow: Workflow,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_message: Option<String>,
}

impl TranscriptDocument {
    pub fn load(path: &Path) -> Result<Self, DocumentError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    pub fn from_json(json: &str) -> Result<Self, DocumentError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Borrow the document as renderer input.
    pub fn input(&self, streaming: bool) -> RenderInput<'_> {
        RenderInput {
            messages: &self.messages,
            results: &self.tool_results,
            workflow: &self.workflow,
            system_message: self.system_message.as_deref(),
            streaming,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const HANDOFF: &str = r#"{
        "messages": [
            {"role": "user", "content": "refund please"},
            {"role": "assistant", "agentName": "Triage", "toolCalls": [
                {"id": "c1", "function": {"name": "transfer_to_billing", "arguments": "{}"}}
            ]}
        ],
        "toolResults": {
            "c1": {"toolCallId": "c1", "content": "{\"assistant\":\"Billing Agent\"}"}
        },
        "workflow": {"tools": [{"name": "lookup", "description": "Find an order"}]}
    }"#;

    #[test]
    fn test_parse_document() {
        let doc = TranscriptDocument::from_json(HANDOFF).unwrap();
        assert_eq!(doc.messages.len(), 2);
        assert!(doc.tool_results.contains_key("c1"));
        assert!(doc.workflow.find_tool("lookup").is_some());
        assert!(doc.system_message.is_none());
    }

    #[test]
    fn test_empty_document() {
        let doc = TranscriptDocument::from_json("{}").unwrap();
        assert_eq!(doc, TranscriptDocument::default());
    }

    #[test]
    fn test_load_from_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("t.json");
        std::fs::write(&path, HANDOFF).unwrap();

        let doc = TranscriptDocument::load(&path).unwrap();
        let input = doc.input(true);
        assert_eq!(input.messages.len(), 2);
        assert!(input.streaming);
    }

    #[test]
    fn test_load_errors() {
        let tmp = TempDir::new().unwrap();
        assert!(matches!(
            TranscriptDocument::load(&tmp.path().join("missing.json")),
            Err(DocumentError::Io(_))
        ));
        assert!(matches!(
            TranscriptDocument::from_json("[1,2"),
            Err(DocumentError::Parse(_))
        ));
    }
}
