//! Open, switch, close and retitle transitions.
//!
//! Per tab: `Opening -> Active <-> Inactive -> Closing -> Closed`. Each
//! transition runs its provider hooks, updates the collection and notifies
//! monitors before returning.

use super::TabEngine;
use crate::error::{EngineError, EngineResult};
use crate::monitor::MonitorEvent;
use crate::registry::ModeEntry;
use crate::session::SessionEntry;
use crate::tab::{TabId, TabRecord, TabState};
use serde_json::Value;
use tabdeck_config::LastTabPolicy;

/// Options for [`TabEngine::open_tab_with`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OpenOptions {
    /// Open without selecting the new tab. Ignored when no tab is selected.
    pub background: bool,
}

impl OpenOptions {
    pub fn background() -> Self {
        Self { background: true }
    }
}

impl TabEngine {
    // -----------------------------------------------------------------------
    // Open
    // -----------------------------------------------------------------------

    /// Open a tab of `mode` and select it.
    ///
    /// If the mode's dedup hook names an open tab, or the mode allows a single
    /// tab and already has it, that tab is selected and returned instead.
    pub fn open_tab(&mut self, mode: &str, args: Value) -> EngineResult<TabId> {
        self.open_tab_with(mode, args, OpenOptions::default())
    }

    /// Open a tab of `mode` without taking the selection away from the current tab.
    pub fn open_tab_in_background(&mut self, mode: &str, args: Value) -> EngineResult<TabId> {
        self.open_tab_with(mode, args, OpenOptions::background())
    }

    pub fn open_tab_with(
        &mut self,
        mode_name: &str,
        args: Value,
        options: OpenOptions,
    ) -> EngineResult<TabId> {
        let mode = self.mode_entry(mode_name)?;

        if let Some(existing) = self.dedup_target(&mode, &args) {
            log::debug!(
                "Mode '{}' redirected open to existing tab {}",
                mode_name,
                existing
            );
            return self.redirect_open(existing, options);
        }

        if let Some(max_tabs) = mode.max_tabs()
            && self.registry.modes().open_count(mode_name) >= max_tabs
        {
            if max_tabs == 1
                && let Some(existing) = self.tabs.first_of_mode(mode_name).map(|tab| tab.id())
            {
                log::debug!(
                    "Mode '{}' allows one tab; reusing tab {}",
                    mode_name,
                    existing
                );
                return self.redirect_open(existing, options);
            }
            log::debug!("Mode '{}' is at its cap of {} tab(s)", mode_name, max_tabs);
            return Err(EngineError::ModeCapacityExceeded {
                mode: mode_name.to_string(),
                max_tabs,
            });
        }

        let id = self.tabs.allocate_id();
        let surface = self.panels.allocate(mode.presentation(), id);
        let is_first = self.tabs.next_is_first();
        let mut tab = TabRecord::new(id, mode.name(), mode.type_name(), surface, is_first);

        if let Some(open) = &mode.lifecycle().open
            && let Err(err) = open(&mut tab, &args)
        {
            self.panels.release(tab.into_surface(), id);
            return Err(EngineError::from_hook(mode_name, "open", err));
        }
        if let Some(title_hook) = &mode.descriptor().on_title_changed {
            let title = title_hook(&tab);
            tab.title = title;
        }

        self.tabs.push(tab);
        self.registry.modes_mut().tab_opened(mode_name);
        log::info!(
            "Opened tab {} in mode '{}' (total: {})",
            id,
            mode_name,
            self.tabs.tab_count()
        );

        let tabs = &self.tabs;
        if let Some(tab) = tabs.get(id) {
            let previous = tabs.active_tab();
            self.monitors.notify(MonitorEvent::TabOpened, |monitor| {
                monitor.on_tab_opened(tab, is_first, previous)
            });
        }

        if !self.opens_in_background(options) {
            self.switch_to_tab(id)?;
        }
        Ok(id)
    }

    /// Answer an open with a tab that is already open
    fn redirect_open(&mut self, existing: TabId, options: OpenOptions) -> EngineResult<TabId> {
        if !self.opens_in_background(options) {
            self.switch_to_tab(existing)?;
        }
        Ok(existing)
    }

    /// Background opens and restores leave the selection alone, unless nothing is selected
    fn opens_in_background(&self, options: OpenOptions) -> bool {
        (options.background || self.restoring) && self.tabs.active_tab_id().is_some()
    }

    /// Open tab named by the mode's dedup hook, if it is still open
    fn dedup_target(&self, mode: &ModeEntry, args: &Value) -> Option<TabId> {
        let hook = mode.descriptor().should_switch_to.as_ref()?;
        let target = hook(args, self.tabs.tabs())?;
        if self.tabs.contains(target) {
            Some(target)
        } else {
            log::warn!(
                "Mode '{}' asked to switch to tab {}, which is not open; opening a new tab",
                mode.name(),
                target
            );
            None
        }
    }

    // -----------------------------------------------------------------------
    // Switch
    // -----------------------------------------------------------------------

    /// Select a tab. Selecting the already selected tab does nothing.
    pub fn switch_to_tab(&mut self, id: TabId) -> EngineResult<()> {
        if !self.tabs.contains(id) {
            return Err(EngineError::TabNotFound(id));
        }
        let previous = self.tabs.active_tab_id();
        if previous == Some(id) {
            return Ok(());
        }

        if let Some(old) = previous {
            self.deactivate(old);
        }
        self.activate(id);
        self.notify_switched(id, previous);
        log::debug!("Switched to tab {}", id);
        Ok(())
    }

    /// Select the tab at a 0-based position
    pub fn switch_to_index(&mut self, index: usize) -> EngineResult<()> {
        let id = self
            .tabs
            .at(index)
            .map(|tab| tab.id())
            .ok_or(EngineError::NoTabAtIndex {
                index,
                count: self.tabs.tab_count(),
            })?;
        self.switch_to_tab(id)
    }

    /// Switch to the next tab (wraps around)
    pub fn next_tab(&mut self) -> EngineResult<()> {
        match self.tabs.active_tab_id().and_then(|id| self.tabs.next_id(id)) {
            Some(next) => self.switch_to_tab(next),
            None => Ok(()),
        }
    }

    /// Switch to the previous tab (wraps around)
    pub fn prev_tab(&mut self) -> EngineResult<()> {
        match self.tabs.active_tab_id().and_then(|id| self.tabs.prev_id(id)) {
            Some(prev) => self.switch_to_tab(prev),
            None => Ok(()),
        }
    }

    /// Select the first open tab of a mode, returning it if there was one
    pub fn select_tab_by_mode(&mut self, mode: &str) -> EngineResult<Option<TabId>> {
        self.mode_entry(mode)?;
        let Some(id) = self.tabs.first_of_mode(mode).map(|tab| tab.id()) else {
            return Ok(None);
        };
        self.switch_to_tab(id)?;
        Ok(Some(id))
    }

    /// Reorder a tab without changing the selection
    pub fn move_tab_to_index(&mut self, id: TabId, index: usize) -> EngineResult<bool> {
        if !self.tabs.contains(id) {
            return Err(EngineError::TabNotFound(id));
        }
        Ok(self.tabs.move_tab_to_index(id, index))
    }

    /// Outgoing half of a switch: save hook, then release the shared panel
    fn deactivate(&mut self, id: TabId) {
        let hook = self
            .mode_of(id)
            .ok()
            .and_then(|mode| mode.lifecycle().save_state.clone());
        let Some(tab) = self.tabs.get_mut(id) else {
            return;
        };
        if let Some(hook) = hook {
            hook(tab);
        }
        tab.set_state(TabState::Inactive);
        self.panels.relinquish(tab.surface(), id);
    }

    /// Incoming half of a switch: take the shared panel, then show hook
    fn activate(&mut self, id: TabId) {
        let hook = self
            .mode_of(id)
            .ok()
            .and_then(|mode| mode.lifecycle().show.clone());
        self.tabs.set_active(Some(id));
        let Some(tab) = self.tabs.get_mut(id) else {
            return;
        };
        self.panels.acquire(tab.surface(), id);
        tab.set_state(TabState::Active);
        if let Some(hook) = hook {
            hook(tab);
        }
    }

    fn notify_switched(&mut self, id: TabId, previous: Option<TabId>) {
        let tabs = &self.tabs;
        if let Some(tab) = tabs.get(id) {
            let previous = previous.and_then(|old| tabs.get(old));
            self.monitors.notify(MonitorEvent::TabSwitched, |monitor| {
                monitor.on_tab_switched(tab, previous)
            });
        }
    }

    // -----------------------------------------------------------------------
    // Close
    // -----------------------------------------------------------------------

    /// Close a tab, selecting a neighbor if it was selected.
    pub fn close_tab(&mut self, id: TabId) -> EngineResult<()> {
        let (can_close, is_first) = {
            let tab = self.tabs.get(id).ok_or(EngineError::TabNotFound(id))?;
            (tab.can_close, tab.is_first())
        };
        if !can_close {
            return Err(EngineError::CannotCloseLastTab {
                tab: id,
                reason: "the tab is marked as not closable",
            });
        }
        if self.tabs.tab_count() == 1 {
            self.guard_last_tab(id, is_first)?;
        }

        let mode = self.mode_of(id)?;
        let closed_entry = if self.config.tabs.recently_closed_limit > 0 {
            self.persist_entry(id)
        } else {
            None
        };

        if let Some(hook) = &mode.lifecycle().close
            && let Some(tab) = self.tabs.get_mut(id)
        {
            hook(tab);
        }

        if let Some(tab) = self.tabs.get(id) {
            self.monitors
                .notify(MonitorEvent::TabClosing, |monitor| monitor.on_tab_closing(tab));
        }

        let was_active = self.tabs.active_tab_id() == Some(id);
        let (index, tab) = self.tabs.remove(id).ok_or(EngineError::TabNotFound(id))?;
        self.registry.modes_mut().tab_closed(tab.mode());
        self.panels.release(tab.into_surface(), id);
        if let Some(entry) = closed_entry {
            self.remember_closed(entry);
        }
        log::info!(
            "Closed tab {} (index {}, remaining: {})",
            id,
            index,
            self.tabs.tab_count()
        );

        if was_active && let Some(next) = self.tabs.successor_of_removed(index) {
            self.activate(next);
            self.notify_switched(next, None);
        }
        Ok(())
    }

    /// Close the selected tab
    pub fn close_current_tab(&mut self) -> EngineResult<()> {
        let id = self.tabs.active_tab_id().ok_or(EngineError::NoTabSelected)?;
        self.close_tab(id)
    }

    /// Close every tab except `keep`, which becomes selected.
    ///
    /// Tabs that refuse to close stay open; their errors are returned.
    pub fn close_other_tabs(&mut self, keep: TabId) -> EngineResult<Vec<(TabId, EngineError)>> {
        self.switch_to_tab(keep)?;
        let mut refused = Vec::new();
        for id in self.tabs.ids() {
            if id == keep {
                continue;
            }
            if let Err(err) = self.close_tab(id) {
                log::warn!("Tab {} stayed open: {}", id, err);
                refused.push((id, err));
            }
        }
        Ok(refused)
    }

    /// Apply the configured policy for closing the sole remaining tab
    fn guard_last_tab(&mut self, id: TabId, is_first: bool) -> EngineResult<()> {
        match self.config.tabs.last_tab_policy {
            LastTabPolicy::ProtectFirst if is_first => Err(EngineError::CannotCloseLastTab {
                tab: id,
                reason: "it is the only tab and the first tab opened",
            }),
            LastTabPolicy::ProtectFirst => Ok(()),
            LastTabPolicy::ProtectAny => Err(EngineError::CannotCloseLastTab {
                tab: id,
                reason: "it is the only remaining tab",
            }),
            LastTabPolicy::ReplaceWithDefault => {
                let Some(default) = self.registry.modes().default_mode() else {
                    return Err(EngineError::CannotCloseLastTab {
                        tab: id,
                        reason: "no default mode is registered to replace it",
                    });
                };
                let replacement = self.open_tab(default.name(), Value::Null)?;
                if replacement == id {
                    return Err(EngineError::CannotCloseLastTab {
                        tab: id,
                        reason: "the default mode resolved to this same tab",
                    });
                }
                log::debug!("Opened tab {} to replace last tab {}", replacement, id);
                Ok(())
            }
        }
    }

    // -----------------------------------------------------------------------
    // Undo close
    // -----------------------------------------------------------------------

    fn remember_closed(&mut self, entry: SessionEntry) {
        self.recently_closed.push_back(entry);
        while self.recently_closed.len() > self.config.tabs.recently_closed_limit {
            self.recently_closed.pop_front();
        }
    }

    /// Recently closed tabs that can be reopened, oldest first
    pub fn recently_closed(&self) -> impl Iterator<Item = &SessionEntry> {
        self.recently_closed.iter()
    }

    /// Reopen the most recently closed tab through its mode's restore hook.
    ///
    /// Returns `Ok(None)` when there is nothing to reopen, or when the
    /// restore hook chose not to open a tab.
    pub fn undo_close_tab(&mut self) -> EngineResult<Option<TabId>> {
        let Some(entry) = self.recently_closed.pop_back() else {
            return Ok(None);
        };
        let reopened = match self.restore_entry(&entry) {
            Ok(reopened) => reopened,
            Err(err) => {
                log::warn!("Could not reopen closed '{}' tab: {}", entry.mode, err);
                self.recently_closed.push_back(entry);
                return Err(err);
            }
        };
        if let Some(id) = reopened {
            self.switch_to_tab(id)?;
        }
        Ok(reopened)
    }

    // -----------------------------------------------------------------------
    // Titles
    // -----------------------------------------------------------------------

    /// Recompute a tab's title through its mode's title hook.
    ///
    /// Returns whether the title changed; monitors hear about it only then.
    pub fn update_title(&mut self, id: TabId) -> EngineResult<bool> {
        self.retitle(id, None)
    }

    /// Propose a new title. The mode's title hook, if any, has the last word.
    pub fn set_tab_title(&mut self, id: TabId, title: impl Into<String>) -> EngineResult<bool> {
        self.retitle(id, Some(title.into()))
    }

    fn retitle(&mut self, id: TabId, proposed: Option<String>) -> EngineResult<bool> {
        let mode = self.mode_of(id)?;
        let tab = self.tabs.get_mut(id).ok_or(EngineError::TabNotFound(id))?;
        let old_title = tab.title.clone();
        if let Some(proposed) = proposed {
            tab.title = proposed;
        }
        if let Some(hook) = &mode.descriptor().on_title_changed {
            let title = hook(&*tab);
            tab.title = title;
        }
        if tab.title == old_title {
            return Ok(false);
        }

        log::debug!("Tab {} title: '{}' -> '{}'", id, old_title, tab.title);
        if let Some(tab) = self.tabs.get(id) {
            self.monitors.notify(MonitorEvent::TabTitleChanged, |monitor| {
                monitor.on_tab_title_changed(tab)
            });
        }
        Ok(true)
    }
}
