//! Cursor bookkeeping for forward/back paging.

/// Tracks the cursor of the page on screen, the stack of cursors that
/// produced earlier pages, and the cursor for the next page.
///
/// The first page is fetched with no cursor, so history entries are
/// `Option<String>`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CursorHistory {
    current: Option<String>,
    history: Vec<Option<String>>,
    next: Option<String>,
}

impl CursorHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget everything; the next load starts from the first page.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn current(&self) -> Option<&str> {
        self.current.as_deref()
    }

    pub fn next_cursor(&self) -> Option<&str> {
        self.next.as_deref()
    }

    pub fn depth(&self) -> usize {
        self.history.len()
    }

    pub fn has_next(&self) -> bool {
        self.next.is_some()
    }

    pub fn has_previous(&self) -> bool {
        !self.history.is_empty()
    }

    /// Record the next cursor reported by a completed load.
    pub fn set_next(&mut self, next: Option<String>) {
        self.next = next;
    }

    /// Move forward. Returns the cursor to fetch, or `None` on the last page.
    pub fn advance(&mut self) -> Option<String> {
        let next = self.next.take()?;
        let previous = self.current.replace(next.clone());
        self.history.push(previous);
        Some(next)
    }

    /// Move back. The outer `None` means there is nothing to go back to;
    /// `Some(None)` means the first page.
    pub fn back(&mut self) -> Option<Option<String>> {
        let previous = self.history.pop()?;
        self.current = previous.clone();
        Some(previous)
    }
}
