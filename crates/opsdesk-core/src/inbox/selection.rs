//! Bulk selection state machine.
//!
//! A transient UI-state layer over the list projection. Selection is scoped
//! to what is currently visible, never to the whole store set.

use std::collections::HashSet;

use crate::domain::ConversationStatus;

/// Whether the list is in bulk-selection mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SelectionMode {
    /// Normal browsing; no checkboxes shown.
    #[default]
    Normal,
    /// Accumulating a set of ids for a bulk action.
    Selecting,
}

/// A bulk action that can be applied to the selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BulkAction {
    Resolve,
    Reopen,
}

/// Accumulates conversation ids for bulk status transitions.
///
/// Leaving `Selecting` - via cancel or completion of a bulk action - always
/// clears the accumulated set.
#[derive(Debug, Clone, Default)]
pub struct BulkSelection {
    mode: SelectionMode,
    selected: HashSet<String>,
}

impl BulkSelection {
    /// Create a selection in `Normal` mode.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current mode.
    #[must_use]
    pub const fn mode(&self) -> SelectionMode {
        self.mode
    }

    /// The accumulated ids.
    #[must_use]
    pub const fn selected(&self) -> &HashSet<String> {
        &self.selected
    }

    /// Enter selection mode with an empty set.
    pub fn begin(&mut self) {
        self.mode = SelectionMode::Selecting;
        self.selected.clear();
    }

    /// Leave selection mode, discarding the set.
    pub fn cancel(&mut self) {
        self.mode = SelectionMode::Normal;
        self.selected.clear();
    }

    /// Leave selection mode after a bulk action completed.
    pub fn complete(&mut self) {
        self.cancel();
    }

    /// Toggle one id. Ignored outside `Selecting`.
    pub fn toggle(&mut self, id: &str) {
        if self.mode != SelectionMode::Selecting {
            return;
        }
        if !self.selected.remove(id) {
            self.selected.insert(id.to_string());
        }
    }

    /// Select every currently visible id, or clear when the selection
    /// already equals the visible set. Ignored outside `Selecting`.
    pub fn toggle_select_all<'a, I>(&mut self, visible: I)
    where
        I: IntoIterator<Item = &'a str>,
    {
        if self.mode != SelectionMode::Selecting {
            return;
        }
        let visible: HashSet<String> = visible.into_iter().map(str::to_string).collect();
        if self.selected == visible {
            self.selected.clear();
        } else {
            self.selected = visible;
        }
    }

    /// Whether bulk action buttons should be enabled.
    #[must_use]
    pub fn actions_enabled(&self) -> bool {
        self.mode == SelectionMode::Selecting && !self.selected.is_empty()
    }

    /// Whether the given action should be offered under the active status
    /// tab. Viewing only resolved conversations hides resolve; viewing only
    /// open ones hides reopen. A usability rule, not a correctness one.
    #[must_use]
    pub fn offers(action: BulkAction, status_filter: Option<ConversationStatus>) -> bool {
        match action {
            BulkAction::Resolve => status_filter != Some(ConversationStatus::Resolved),
            BulkAction::Reopen => status_filter != Some(ConversationStatus::Open),
        }
    }
}
