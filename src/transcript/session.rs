//! A mounted transcript view.
//!
//! Owns the disclosure records and view configuration for the lifetime of
//! one rendering session. All mutation happens through `&mut self`, so the
//! session is the single owner of its state.

use std::collections::HashSet;

use super::disclosure::{DisclosureState, DisclosureStore, JsonViewState};
use super::message::Message;
use super::render::{render_transcript, RenderInput, TranscriptView, ViewConfig};

#[derive(Debug, Clone, Default)]
pub struct TranscriptSession {
    config: ViewConfig,
    store: DisclosureStore,
    /// Set once the user edits the system message view
    system_message: Option<String>,
}

impl TranscriptSession {
    pub fn new(config: ViewConfig) -> Self {
        Self {
            config,
            ..Default::default()
        }
    }

    pub fn config(&self) -> &ViewConfig {
        &self.config
    }

    /// Replace the view configuration. Disclosure state is kept.
    pub fn set_config(&mut self, config: ViewConfig) {
        self.config = config;
    }

    pub fn store(&self) -> &DisclosureStore {
        &self.store
    }

    /// The edited system message, if any.
    pub fn system_message(&self) -> Option<&str> {
        self.system_message.as_deref()
    }

    /// Edit from the system message view.
    pub fn set_system_message(&mut self, content: impl Into<String>) {
        self.system_message = Some(content.into());
    }

    /// Render, first dropping state for entries that left the transcript.
    ///
    /// An edited system message takes precedence over `input.system_message`.
    pub fn render(&mut self, input: &RenderInput<'_>) -> TranscriptView {
        self.prune(input.messages);
        let input = RenderInput {
            system_message: self.system_message.as_deref().or(input.system_message),
            ..*input
        };
        render_transcript(&input, &self.config, &self.store)
    }

    fn prune(&mut self, messages: &[Message]) {
        let live: HashSet<&str> = messages
            .iter()
            .filter_map(Message::as_assistant)
            .flat_map(|a| a.tool_calls.iter().map(|c| c.id.as_str()))
            .collect();
        let fingerprints: Vec<u64> = messages.iter().map(Message::fingerprint).collect();
        self.store.retain(&live, &fingerprints);
    }

    pub fn toggle_params(&mut self, tool_call_id: &str) -> DisclosureState {
        self.store.toggle_params(tool_call_id)
    }

    pub fn toggle_results(&mut self, tool_call_id: &str) -> DisclosureState {
        self.store.toggle_results(tool_call_id)
    }

    pub fn toggle_wrap(&mut self, tool_call_id: &str) -> bool {
        self.store.toggle_wrap(tool_call_id)
    }

    pub fn toggle_json_mode(&mut self, index: usize) -> JsonViewState {
        self.store
            .toggle_json_mode(index, self.config.show_json_mode)
    }

    pub fn toggle_json_wrap(&mut self, index: usize) -> bool {
        self.store
            .toggle_json_wrap(index, self.config.show_json_mode)
    }

    /// Tear down: all disclosure state is discarded.
    pub fn unmount(&mut self) {
        self.store.clear();
    }
}
