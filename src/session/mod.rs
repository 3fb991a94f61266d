//! Session persistence for the open-tab set
//!
//! Saving walks the open tabs in order and asks each tab's mode for an opaque
//! state blob; restoring hands each blob back to the mode's restore hook, which
//! reopens the tab through the engine. The engine never looks inside the blobs.
//!
//! Files are stored as YAML in `~/.config/tabdeck/last_session.yaml` unless
//! the config names another path.

mod capture;
mod restore;
pub mod storage;

use crate::error::EngineError;
use crate::tab::TabId;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Current on-disk format version
pub const SESSION_FORMAT_VERSION: u32 = 1;

fn default_version() -> u32 {
    SESSION_FORMAT_VERSION
}

/// The persisted open-tab set
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionRecord {
    /// Format version the record was written with
    #[serde(default = "default_version")]
    pub version: u32,
    /// Timestamp when the session was saved (RFC 3339)
    #[serde(default)]
    pub saved_at: String,
    /// Persisted tabs, in display order
    #[serde(default)]
    pub tabs: Vec<SessionEntry>,
    /// Index into `tabs` of the tab selected at save time
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected_index: Option<usize>,
}

impl SessionRecord {
    /// An empty record stamped with the current time
    pub fn new() -> Self {
        Self {
            version: SESSION_FORMAT_VERSION,
            saved_at: chrono::Utc::now().to_rfc3339(),
            tabs: Vec::new(),
            selected_index: None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.tabs.is_empty()
    }

    /// Mode names in order
    pub fn mode_names(&self) -> Vec<&str> {
        self.tabs.iter().map(|entry| entry.mode.as_str()).collect()
    }
}

impl Default for SessionRecord {
    fn default() -> Self {
        Self::new()
    }
}

/// One persisted tab
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionEntry {
    /// Mode the tab was opened from
    pub mode: String,
    /// Provider-defined state, passed back to the restore hook untouched
    #[serde(default)]
    pub state: Value,
    /// State contributed by monitors, keyed by monitor name
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub monitors: BTreeMap<String, Value>,
}

impl SessionEntry {
    pub fn new(mode: impl Into<String>, state: Value) -> Self {
        Self {
            mode: mode.into(),
            state,
            monitors: BTreeMap::new(),
        }
    }
}

/// Outcome of restoring a [`SessionRecord`]
#[derive(Debug, Default)]
pub struct RestoreReport {
    /// Tabs opened by the restore, in entry order
    pub restored: Vec<TabId>,
    /// Entries that could not be restored
    pub failures: Vec<RestoreFailure>,
    /// Entries whose restore hook succeeded without opening a tab
    pub skipped: usize,
}

impl RestoreReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// A session entry that failed to restore
#[derive(Debug)]
pub struct RestoreFailure {
    /// Position of the entry in the record
    pub index: usize,
    /// Mode the entry named
    pub mode: String,
    pub error: EngineError,
}
