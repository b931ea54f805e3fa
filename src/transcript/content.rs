//! Content classification for message and tool payloads.
//!
//! Payloads are opaque text. A payload is treated as structured only when it
//! decodes as JSON; anything else falls back to plain text without error.

use serde_json::Value;

/// Field whose value is shown as the human-readable part of a JSON response.
pub const RESPONSE_KEY: &str = "response";

/// Result of classifying a text payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifiedContent {
    /// Text parsed as a JSON value (object, array, or scalar)
    pub is_structured: bool,
    /// Parsed as a JSON object carrying a `response` field
    pub has_response_key: bool,
    /// What to show in the bubble
    pub display_text: String,
}

/// Classify raw content.
///
/// Deterministic and side-effect free: the same input always yields the same
/// classification.
pub fn classify(text: &str) -> ClassifiedContent {
    let Ok(value) = serde_json::from_str::<Value>(text) else {
        return ClassifiedContent {
            is_structured: false,
            has_response_key: false,
            display_text: text.to_string(),
        };
    };

    let response = value.as_object().and_then(|obj| obj.get(RESPONSE_KEY));
    let display_text = response
        .and_then(response_text)
        .unwrap_or_else(|| text.to_string());

    ClassifiedContent {
        is_structured: true,
        has_response_key: response.is_some(),
        display_text,
    }
}

/// Textual form of a `response` value. Falsy values (null, `""`, `false`,
/// zero) yield `None` so the caller falls back to the raw payload.
fn response_text(value: &Value) -> Option<String> {
    match value {
        Value::Null | Value::Bool(false) => None,
        Value::String(s) if s.is_empty() => None,
        Value::Number(n) if n.as_f64() == Some(0.0) => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

/// Pretty-print JSON with two-space indentation, or return the text unchanged.
pub fn pretty_json(text: &str) -> String {
    serde_json::from_str::<Value>(text)
        .ok()
        .and_then(|value| serde_json::to_string_pretty(&value).ok())
        .unwrap_or_else(|| text.to_string())
}

/// Which sub-panel of a tool call a payload belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelKind {
    Params,
    Result,
}

impl PanelKind {
    pub fn label(self) -> &'static str {
        match self {
            PanelKind::Params => "Params",
            PanelKind::Result => "Result",
        }
    }
}

/// How an expandable panel body is presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelFormat {
    Markdown,
    Preformatted,
}

/// Formatted body of a params or result panel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PanelContent {
    pub kind: PanelKind,
    pub format: PanelFormat,
    pub body: String,
}

impl PanelContent {
    /// Result payloads that don't look like a JSON object are shown as
    /// markdown; everything else is pretty-printed when it parses.
    pub fn new(kind: PanelKind, raw: &str) -> Self {
        if kind == PanelKind::Result && !raw.starts_with('{') {
            return Self {
                kind,
                format: PanelFormat::Markdown,
                body: raw.to_string(),
            };
        }
        Self {
            kind,
            format: PanelFormat::Preformatted,
            body: pretty_json(raw),
        }
    }
}
