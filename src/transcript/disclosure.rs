//! Expand/collapse state for tool-call panels.
//!
//! Each rendered tool call owns a small disclosure record. Records live in an
//! arena keyed by tool-call id, owned by the rendering session and dropped
//! with it.

use std::collections::{HashMap, HashSet};

/// Layout of a tool-call card, derived from its disclosure flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelLayout {
    /// Both panels closed: single stretched header line
    Compressed,
    /// At least one panel open
    Expanded,
}

/// Disclosure flags for one rendered tool call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisclosureState {
    pub params_expanded: bool,
    pub results_expanded: bool,
    /// Shared by whichever panels are open
    pub wrap_text: bool,
}

impl Default for DisclosureState {
    fn default() -> Self {
        Self {
            params_expanded: false,
            results_expanded: false,
            wrap_text: true,
        }
    }
}

impl DisclosureState {
    pub fn layout(&self) -> PanelLayout {
        if self.params_expanded || self.results_expanded {
            PanelLayout::Expanded
        } else {
            PanelLayout::Compressed
        }
    }

    /// The wrap toggle only shows once something is open.
    pub fn wrap_toggle_visible(&self) -> bool {
        self.layout() == PanelLayout::Expanded
    }

    pub fn toggle_params(&mut self) {
        self.params_expanded = !self.params_expanded;
    }

    pub fn toggle_results(&mut self) {
        self.results_expanded = !self.results_expanded;
    }

    /// Flip wrapping. Returns false (and does nothing) while no panel is open.
    pub fn toggle_wrap(&mut self) -> bool {
        if !self.wrap_toggle_visible() {
            return false;
        }
        self.wrap_text = !self.wrap_text;
        true
    }
}

/// Raw-JSON view state for an internal message that carries a `response` key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JsonViewState {
    pub json_mode: bool,
    pub wrap_text: bool,
}

impl JsonViewState {
    pub fn new(json_mode: bool) -> Self {
        Self {
            json_mode,
            wrap_text: true,
        }
    }

    pub fn toggle_json_mode(&mut self) {
        self.json_mode = !self.json_mode;
    }

    /// Wrapping is only offered while the raw JSON is on screen.
    pub fn toggle_wrap(&mut self) -> bool {
        if !self.json_mode {
            return false;
        }
        self.wrap_text = !self.wrap_text;
        true
    }
}

/// Disclosure records for one rendering session.
#[derive(Debug, Clone, Default)]
pub struct DisclosureStore {
    panels: HashMap<String, DisclosureState>,
    json_views: HashMap<usize, JsonViewState>,
    /// Message fingerprints from the last prune, by index
    seen: Vec<u64>,
}

impl DisclosureStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current state for a tool call; untouched calls read as the default.
    pub fn state(&self, tool_call_id: &str) -> DisclosureState {
        self.panels.get(tool_call_id).copied().unwrap_or_default()
    }

    fn entry(&mut self, tool_call_id: &str) -> &mut DisclosureState {
        self.panels.entry(tool_call_id.to_string()).or_default()
    }

    pub fn toggle_params(&mut self, tool_call_id: &str) -> DisclosureState {
        let state = self.entry(tool_call_id);
        state.toggle_params();
        *state
    }

    pub fn toggle_results(&mut self, tool_call_id: &str) -> DisclosureState {
        let state = self.entry(tool_call_id);
        state.toggle_results();
        *state
    }

    /// Returns whether the toggle applied.
    pub fn toggle_wrap(&mut self, tool_call_id: &str) -> bool {
        // Don't allocate a record just to refuse the toggle
        if !self.state(tool_call_id).wrap_toggle_visible() {
            return false;
        }
        self.entry(tool_call_id).toggle_wrap()
    }

    /// JSON view for the internal message at `index`.
    pub fn json_view(&self, index: usize, default_json_mode: bool) -> JsonViewState {
        self.json_views
            .get(&index)
            .copied()
            .unwrap_or_else(|| JsonViewState::new(default_json_mode))
    }

    pub fn toggle_json_mode(&mut self, index: usize, default_json_mode: bool) -> JsonViewState {
        let view = self
            .json_views
            .entry(index)
            .or_insert_with(|| JsonViewState::new(default_json_mode));
        view.toggle_json_mode();
        *view
    }

    pub fn toggle_json_wrap(&mut self, index: usize, default_json_mode: bool) -> bool {
        self.json_views
            .entry(index)
            .or_insert_with(|| JsonViewState::new(default_json_mode))
            .toggle_wrap()
    }

    /// Drop records for tool calls and messages no longer in the transcript.
    ///
    /// `fingerprints` holds one [`Message::fingerprint`] per message. A JSON
    /// view is kept only while the same message still sits at its index.
    ///
    /// [`Message::fingerprint`]: super::message::Message::fingerprint
    pub fn retain(&mut self, live_tool_calls: &HashSet<&str>, fingerprints: &[u64]) {
        self.panels
            .retain(|id, _| live_tool_calls.contains(id.as_str()));
        let seen = &self.seen;
        self.json_views.retain(|index, _| match fingerprints.get(*index) {
            Some(current) => seen.get(*index).map_or(true, |old| old == current),
            None => false,
        });
        self.seen = fingerprints.to_vec();
    }

    pub fn clear(&mut self) {
        self.panels.clear();
        self.json_views.clear();
        self.seen.clear();
    }

    pub fn len(&self) -> usize {
        self.panels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.panels.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_state() {
        let state = DisclosureState::default();
        assert!(!state.params_expanded);
        assert!(!state.results_expanded);
        assert!(state.wrap_text);
        assert_eq!(state.layout(), PanelLayout::Compressed);
        assert!(!state.wrap_toggle_visible());
    }

    #[test]
    fn test_toggles_are_independent() {
        let mut store = DisclosureStore::new();

        let state = store.toggle_params("a");
        assert!(state.params_expanded);
        assert!(!state.results_expanded);

        let state = store.toggle_results("a");
        assert!(state.params_expanded, "results toggle must not touch params");
        assert!(state.results_expanded);

        let state = store.toggle_params("a");
        assert!(!state.params_expanded);
        assert!(state.results_expanded, "params toggle must not touch results");
    }

    #[test]
    fn test_layout_derived_from_flags() {
        let mut store = DisclosureStore::new();
        store.toggle_results("a");
        assert_eq!(store.state("a").layout(), PanelLayout::Expanded);
        store.toggle_results("a");
        assert_eq!(store.state("a").layout(), PanelLayout::Compressed);
    }

    #[test]
    fn test_instances_are_independent() {
        let mut store = DisclosureStore::new();
        store.toggle_params("a");
        assert!(store.state("a").params_expanded);
        assert_eq!(store.state("b"), DisclosureState::default());
    }

    #[test]
    fn test_wrap_requires_open_panel() {
        let mut store = DisclosureStore::new();
        assert!(!store.toggle_wrap("a"));
        assert!(store.state("a").wrap_text);
        assert!(store.is_empty());

        store.toggle_params("a");
        assert!(store.toggle_wrap("a"));
        assert!(!store.state("a").wrap_text);

        // Wrap setting survives collapsing and re-expanding
        store.toggle_params("a");
        store.toggle_results("a");
        assert!(!store.state("a").wrap_text);
    }

    #[test]
    fn test_retain_drops_removed_calls() {
        let mut store = DisclosureStore::new();
        store.toggle_params("keep");
        store.toggle_params("gone");
        store.toggle_json_mode(0, false);
        store.toggle_json_mode(5, false);

        let live: HashSet<&str> = ["keep"].into_iter().collect();
        store.retain(&live, &[10, 11, 12]);

        assert_eq!(store.len(), 1);
        assert!(store.state("keep").params_expanded);
        assert_eq!(store.state("gone"), DisclosureState::default());
        assert!(store.json_view(0, false).json_mode);
        assert!(!store.json_view(5, false).json_mode);
    }

    #[test]
    fn test_json_view_does_not_shift_onto_other_message() {
        let live = HashSet::new();
        let mut store = DisclosureStore::new();
        store.retain(&live, &[10, 11, 12]);
        store.toggle_json_mode(2, false);

        // Unchanged transcript keeps the view
        store.retain(&live, &[10, 11, 12]);
        assert!(store.json_view(2, false).json_mode);

        // Message 11 removed: index 1 now holds message 12, index 2 nothing
        store.retain(&live, &[10, 12]);
        assert!(!store.json_view(1, false).json_mode);
        assert!(!store.json_view(2, false).json_mode);

        store.toggle_json_mode(0, false);
        // A different message now at index 0
        store.retain(&live, &[99, 12]);
        assert!(!store.json_view(0, false).json_mode);
    }

    #[test]
    fn test_clear() {
        let mut store = DisclosureStore::new();
        store.toggle_params("a");
        store.toggle_json_mode(0, false);
        store.clear();
        assert!(store.is_empty());
        assert!(!store.json_view(0, false).json_mode);
    }

    #[test]
    fn test_json_view_defaults_and_toggles() {
        let mut store = DisclosureStore::new();
        assert!(!store.json_view(1, false).json_mode);
        assert!(store.json_view(1, true).json_mode);

        assert!(!store.toggle_json_wrap(1, false), "wrap needs json mode");
        let view = store.toggle_json_mode(1, false);
        assert!(view.json_mode);
        assert!(store.toggle_json_wrap(1, false));
        assert!(!store.json_view(1, false).wrap_text);
    }
}
