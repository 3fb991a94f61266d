//! Ordered collection of open tabs

use super::{TabId, TabRecord};

/// The open tabs, in display order, plus the selected tab pointer.
///
/// The collection only stores and orders records; lifecycle hooks, counts and
/// notifications are the engine's business.
#[derive(Debug)]
pub struct TabCollection {
    /// All open tabs, in order
    tabs: Vec<TabRecord>,
    /// Currently selected tab ID
    active_tab_id: Option<TabId>,
    /// Counter for generating unique tab IDs
    next_tab_id: TabId,
    /// Whether any tab has ever been opened
    opened_any: bool,
}

impl TabCollection {
    /// Create a new empty collection
    pub fn new() -> Self {
        Self {
            tabs: Vec::new(),
            active_tab_id: None,
            next_tab_id: 1,
            opened_any: false,
        }
    }

    /// Reserve the next tab ID. IDs are never reused, even if the open fails.
    pub(crate) fn allocate_id(&mut self) -> TabId {
        let id = self.next_tab_id;
        self.next_tab_id += 1;
        id
    }

    /// Highest ID handed out so far (0 if none)
    pub fn last_allocated_id(&self) -> TabId {
        self.next_tab_id - 1
    }

    /// Whether the next successfully opened tab is the first one ever
    pub(crate) fn next_is_first(&self) -> bool {
        !self.opened_any
    }

    /// Append a tab at the end
    pub(crate) fn push(&mut self, tab: TabRecord) {
        self.opened_any = true;
        log::debug!(
            "Inserted tab {} at index {} (total: {})",
            tab.id(),
            self.tabs.len(),
            self.tabs.len() + 1
        );
        self.tabs.push(tab);
    }

    /// Remove a tab, returning its former index and the record.
    ///
    /// The selected pointer is cleared if it named the removed tab; choosing a
    /// replacement is left to the caller.
    pub(crate) fn remove(&mut self, id: TabId) -> Option<(usize, TabRecord)> {
        let idx = self.index_of(id)?;
        let tab = self.tabs.remove(idx);
        if self.active_tab_id == Some(id) {
            self.active_tab_id = None;
        }
        Some((idx, tab))
    }

    /// The tab that should take over after removing the tab at `removed_idx`:
    /// the following tab if there is one, else the preceding one
    pub fn successor_of_removed(&self, removed_idx: usize) -> Option<TabId> {
        if self.tabs.is_empty() {
            return None;
        }
        let new_idx = removed_idx.min(self.tabs.len() - 1);
        Some(self.tabs[new_idx].id())
    }

    pub(crate) fn set_active(&mut self, id: Option<TabId>) {
        self.active_tab_id = id;
    }

    /// Get a reference to the selected tab
    pub fn active_tab(&self) -> Option<&TabRecord> {
        self.active_tab_id.and_then(|id| self.get(id))
    }

    /// Get the selected tab ID
    pub fn active_tab_id(&self) -> Option<TabId> {
        self.active_tab_id
    }

    /// Get index of the selected tab (0-based)
    pub fn active_tab_index(&self) -> Option<usize> {
        self.active_tab_id.and_then(|id| self.index_of(id))
    }

    pub fn index_of(&self, id: TabId) -> Option<usize> {
        self.tabs.iter().position(|t| t.id() == id)
    }

    pub fn contains(&self, id: TabId) -> bool {
        self.index_of(id).is_some()
    }

    /// Get a tab by ID
    pub fn get(&self, id: TabId) -> Option<&TabRecord> {
        self.tabs.iter().find(|t| t.id() == id)
    }

    /// Get a mutable reference to a tab by ID
    pub fn get_mut(&mut self, id: TabId) -> Option<&mut TabRecord> {
        self.tabs.iter_mut().find(|t| t.id() == id)
    }

    /// Get the tab at a 0-based position
    pub fn at(&self, index: usize) -> Option<&TabRecord> {
        self.tabs.get(index)
    }

    /// The tab after `id`, wrapping around
    pub fn next_id(&self, id: TabId) -> Option<TabId> {
        let current_idx = self.index_of(id)?;
        let next_idx = (current_idx + 1) % self.tabs.len();
        Some(self.tabs[next_idx].id())
    }

    /// The tab before `id`, wrapping around
    pub fn prev_id(&self, id: TabId) -> Option<TabId> {
        let current_idx = self.index_of(id)?;
        let prev_idx = if current_idx == 0 {
            self.tabs.len() - 1
        } else {
            current_idx - 1
        };
        Some(self.tabs[prev_idx].id())
    }

    /// First open tab of a mode
    pub fn first_of_mode(&self, mode: &str) -> Option<&TabRecord> {
        self.tabs.iter().find(|t| t.mode() == mode)
    }

    /// All open tabs of a mode, in order
    pub fn tabs_of_mode<'a>(&'a self, mode: &'a str) -> impl Iterator<Item = &'a TabRecord> {
        self.tabs.iter().filter(move |t| t.mode() == mode)
    }

    /// Move a tab to a specific index
    /// Returns true if the tab was actually moved, false if not found or already at target
    pub(crate) fn move_tab_to_index(&mut self, id: TabId, target_index: usize) -> bool {
        let current_idx = match self.index_of(id) {
            Some(idx) => idx,
            None => return false,
        };

        let clamped_target = target_index.min(self.tabs.len().saturating_sub(1));
        if clamped_target == current_idx {
            return false;
        }

        let tab = self.tabs.remove(current_idx);
        self.tabs.insert(clamped_target, tab);
        log::debug!(
            "Moved tab {} from index {} to {}",
            id,
            current_idx,
            clamped_target
        );
        true
    }

    /// Get the number of tabs
    pub fn tab_count(&self) -> usize {
        self.tabs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tabs.is_empty()
    }

    /// Get all tabs as a slice
    pub fn tabs(&self) -> &[TabRecord] {
        &self.tabs
    }

    /// IDs of all tabs, in order
    pub fn ids(&self) -> Vec<TabId> {
        self.tabs.iter().map(|t| t.id()).collect()
    }
}

impl Default for TabCollection {
    fn default() -> Self {
        Self::new()
    }
}
