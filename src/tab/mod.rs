//! Tab records and the ordered collection of open tabs.
//!
//! This module provides the core tab infrastructure including:
//! - `TabRecord`: One open tab, created from a mode and owning its surface
//! - `TabCollection`: The ordered set of open tabs and the selected tab
//! - `TabId`: Unique identifier for each tab, never reused in a process

mod collection;

pub use collection::TabCollection;

use crate::panel::{Surface, SurfaceId};
use std::any::Any;
use std::collections::HashMap;
use std::fmt;

/// Unique identifier for a tab. Also serves as the tab's handle: it is only
/// valid while the tab is open.
pub type TabId = u64;

/// Selection state of an open tab.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TabState {
    /// The selected tab
    Active,
    /// Open but not selected
    Inactive,
}

/// One open tab.
///
/// Provider hooks receive the record and are expected to fill in the title
/// and flags; identity, mode and surface are owned by the engine.
pub struct TabRecord {
    id: TabId,
    mode: String,
    type_name: String,
    surface: Surface,
    state: TabState,
    is_first: bool,
    /// Display title
    pub title: String,
    /// Content is loading
    pub busy: bool,
    /// The provider is working on something slower than a load
    pub thinking: bool,
    /// Whether the user may close this tab
    pub can_close: bool,
    /// Provider-private runtime data; never persisted
    extensions: HashMap<String, Box<dyn Any>>,
}

impl TabRecord {
    pub(crate) fn new(
        id: TabId,
        mode: &str,
        type_name: &str,
        surface: Surface,
        is_first: bool,
    ) -> Self {
        Self {
            id,
            mode: mode.to_string(),
            type_name: type_name.to_string(),
            surface,
            state: TabState::Inactive,
            is_first,
            title: String::new(),
            busy: false,
            thinking: false,
            can_close: true,
            extensions: HashMap::new(),
        }
    }

    pub fn id(&self) -> TabId {
        self.id
    }

    /// Name of the mode this tab was opened from
    pub fn mode(&self) -> &str {
        &self.mode
    }

    /// Name of the tab type that owns the mode
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn state(&self) -> TabState {
        self.state
    }

    pub fn is_active(&self) -> bool {
        self.state == TabState::Active
    }

    /// True only for the first tab ever opened by the engine
    pub fn is_first(&self) -> bool {
        self.is_first
    }

    pub fn surface(&self) -> &Surface {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut Surface {
        &mut self.surface
    }

    pub fn surface_id(&self) -> SurfaceId {
        self.surface.id()
    }

    pub(crate) fn set_state(&mut self, state: TabState) {
        self.state = state;
    }

    pub(crate) fn into_surface(self) -> Surface {
        self.surface
    }

    /// Store provider-private data under `key`, replacing any previous value
    pub fn insert_extension<T: 'static>(&mut self, key: impl Into<String>, value: T) {
        self.extensions.insert(key.into(), Box::new(value));
    }

    pub fn extension<T: 'static>(&self, key: &str) -> Option<&T> {
        self.extensions.get(key).and_then(|v| v.downcast_ref::<T>())
    }

    pub fn extension_mut<T: 'static>(&mut self, key: &str) -> Option<&mut T> {
        self.extensions.get_mut(key).and_then(|v| v.downcast_mut::<T>())
    }

    pub fn remove_extension(&mut self, key: &str) -> bool {
        self.extensions.remove(key).is_some()
    }
}

impl fmt::Debug for TabRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TabRecord")
            .field("id", &self.id)
            .field("mode", &self.mode)
            .field("state", &self.state)
            .field("title", &self.title)
            .field("surface", &self.surface.id())
            .field("busy", &self.busy)
            .field("thinking", &self.thinking)
            .field("can_close", &self.can_close)
            .field("is_first", &self.is_first)
            .field("extensions", &self.extensions.keys().collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
impl TabRecord {
    /// Minimal record on a shared panel, for collection tests
    pub(crate) fn new_stub(id: TabId, mode: &str) -> Self {
        Self::new(
            id,
            mode,
            "stub",
            Surface::Shared {
                panel_id: "stub".to_string(),
            },
            id == 1,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extensions_are_typed() {
        let mut tab = TabRecord::new_stub(1, "m");
        tab.insert_extension("pending", 3_u32);
        assert_eq!(tab.extension::<u32>("pending"), Some(&3));
        assert_eq!(tab.extension::<String>("pending"), None);

        if let Some(count) = tab.extension_mut::<u32>("pending") {
            *count += 1;
        }
        assert_eq!(tab.extension::<u32>("pending"), Some(&4));
        assert!(tab.remove_extension("pending"));
        assert!(!tab.remove_extension("pending"));
    }

    #[test]
    fn new_tabs_start_inactive_and_closable() {
        let tab = TabRecord::new_stub(2, "m");
        assert_eq!(tab.state(), TabState::Inactive);
        assert!(tab.can_close);
        assert!(!tab.is_first());
    }
}
