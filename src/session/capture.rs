//! Capture the open-tab set into a session record

use super::{SessionEntry, SessionRecord};
use crate::engine::TabEngine;
use crate::error::{EngineError, EngineResult};
use crate::monitor::MonitorEvent;
use crate::tab::TabId;

impl TabEngine {
    /// Persist one tab.
    ///
    /// Returns `Ok(None)` when the tab's mode has no persist hook or the hook
    /// declined to persist this tab.
    pub fn persist_tab(&mut self, id: TabId) -> EngineResult<Option<SessionEntry>> {
        if !self.tabs.contains(id) {
            return Err(EngineError::TabNotFound(id));
        }
        Ok(self.persist_entry(id))
    }

    /// Build a session record from every open tab, in display order.
    ///
    /// Tabs that do not persist are left out. The selected index points at
    /// the selected tab's entry, or is `None` if that tab was left out.
    pub fn save_session(&mut self) -> SessionRecord {
        let mut record = SessionRecord::new();
        let selected = self.tabs.active_tab_id();

        for id in self.tabs.ids() {
            let Some(entry) = self.persist_entry(id) else {
                log::debug!("Tab {} has no persisted state; leaving it out", id);
                continue;
            };
            if selected == Some(id) {
                record.selected_index = Some(record.tabs.len());
            }
            record.tabs.push(entry);
        }

        log::info!(
            "Captured session with {} of {} tab(s)",
            record.tabs.len(),
            self.tabs.tab_count()
        );
        record
    }

    /// Persist hook plus monitor contributions for an open tab
    pub(crate) fn persist_entry(&mut self, id: TabId) -> Option<SessionEntry> {
        let mode = self.mode_of(id).ok()?;
        let persist = mode.lifecycle().persist.as_ref()?;
        let tab = self.tabs.get(id)?;
        let state = persist(tab)?;

        let mut entry = SessionEntry::new(mode.name(), state);
        let contributions = self
            .monitors
            .collect(MonitorEvent::TabPersisting, |monitor| {
                monitor.on_tab_persisting(tab)
            });
        entry.monitors.extend(contributions);
        Some(entry)
    }
}
