//! Replay a session record through the modes' restore hooks

use super::{RestoreFailure, RestoreReport, SessionEntry, SessionRecord, storage};
use crate::engine::TabEngine;
use crate::error::{EngineError, EngineResult};
use crate::monitor::MonitorEvent;
use crate::tab::TabId;

impl TabEngine {
    /// Restore the saved session from the configured session file, if the
    /// config asks for restore on startup and a session was saved.
    ///
    /// Returns `Ok(None)` when restore is turned off or there is nothing to
    /// restore. Only reading the file can fail; entry failures are reported.
    pub fn restore_last_session(&mut self) -> anyhow::Result<Option<RestoreReport>> {
        if !self.config.session.restore_on_startup {
            log::info!("Session restore on startup is turned off");
            return Ok(None);
        }
        let Some(record) = storage::load_session(&self.config)? else {
            log::debug!("No saved session to restore");
            return Ok(None);
        };
        Ok(Some(self.restore_session(&record)))
    }

    /// Reopen every entry of `record`, in order, then select the tab that was
    /// selected at save time.
    ///
    /// Tabs open in the background while the restore runs. An entry that
    /// fails is reported and skipped; the rest still restore.
    pub fn restore_session(&mut self, record: &SessionRecord) -> RestoreReport {
        let was_restoring = std::mem::replace(&mut self.restoring, true);
        let mut report = RestoreReport::default();
        let mut selected_tab = None;

        for (index, entry) in record.tabs.iter().enumerate() {
            match self.restore_entry(entry) {
                Ok(Some(id)) => {
                    if record.selected_index == Some(index) {
                        selected_tab = Some(id);
                    }
                    report.restored.push(id);
                }
                Ok(None) => {
                    log::debug!("Session entry {} ('{}') opened no tab", index, entry.mode);
                    report.skipped += 1;
                }
                Err(error) => {
                    log::warn!(
                        "Session restore: skipping entry {} ('{}'): {}",
                        index,
                        entry.mode,
                        error
                    );
                    report.failures.push(RestoreFailure {
                        index,
                        mode: entry.mode.clone(),
                        error,
                    });
                }
            }
        }
        self.restoring = was_restoring;

        if let Some(id) = selected_tab
            && let Err(err) = self.switch_to_tab(id)
        {
            log::warn!("Session restore: could not select tab {}: {}", id, err);
        }

        log::info!(
            "Restored {} of {} session entries ({} failed)",
            report.restored.len(),
            record.tabs.len(),
            report.failures.len()
        );
        report
    }

    /// Run one entry's restore hook and hand monitor state back.
    ///
    /// Returns the first tab the hook opened, if any.
    pub(crate) fn restore_entry(&mut self, entry: &SessionEntry) -> EngineResult<Option<TabId>> {
        let mode = self.mode_entry(&entry.mode)?;
        let restore = mode
            .lifecycle()
            .restore
            .clone()
            .ok_or_else(|| EngineError::NotRestorable(entry.mode.clone()))?;

        let last_before = self.tabs.last_allocated_id();
        restore(self, &entry.state)
            .map_err(|err| EngineError::from_hook(&entry.mode, "restore", err))?;

        let opened = self
            .tabs
            .tabs()
            .iter()
            .map(|tab| tab.id())
            .filter(|id| *id > last_before)
            .min();
        let Some(id) = opened else {
            return Ok(None);
        };

        if !entry.monitors.is_empty()
            && let Some(tab) = self.tabs.get(id)
        {
            self.monitors
                .notify(MonitorEvent::TabRestored, |monitor| {
                    match entry.monitors.get(monitor.name()) {
                        Some(state) => monitor.on_tab_restored(tab, state),
                        None => Ok(()),
                    }
                });
        }
        Ok(Some(id))
    }
}
