//! The tab engine: registries, open tabs, surfaces and monitors behind one
//! single-threaded API.
//!
//! Lifecycle transitions live in `lifecycle.rs`, command routing in
//! `commands.rs`, and session save/restore in [`crate::session`].
//!
//! Handles ([`TabId`]) are only meaningful while the tab is open. Provider
//! code that finishes work after a hook returned (a deferred load, for
//! example) must go through [`TabEngine::with_tab_mut`] or the `set_*`
//! helpers, which turn a closed tab into a no-op instead of a dangling write.

mod commands;
mod lifecycle;

pub use commands::CommandOutcome;
pub use lifecycle::OpenOptions;

use crate::error::{EngineError, EngineResult, MonitorNotificationFailure};
use crate::monitor::{MonitorBus, MonitorId, TabMonitor};
use crate::panel::{PanelAllocator, SurfaceId};
use crate::registry::{ModeEntry, Presentation, Registry, TabTypeDescriptor};
use crate::session::SessionEntry;
use crate::tab::{TabCollection, TabId, TabRecord};
use std::collections::VecDeque;
use std::rc::Rc;
use tabdeck_config::Config;

/// Owns every open tab and drives their lifecycle.
#[derive(Debug)]
pub struct TabEngine {
    pub(crate) config: Config,
    pub(crate) registry: Registry,
    pub(crate) panels: PanelAllocator,
    pub(crate) tabs: TabCollection,
    pub(crate) monitors: MonitorBus,
    /// Persisted entries of recently closed tabs, newest last
    pub(crate) recently_closed: VecDeque<SessionEntry>,
    /// Set while a session restore is replaying entries
    pub(crate) restoring: bool,
}

impl TabEngine {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            registry: Registry::new(),
            panels: PanelAllocator::new(),
            tabs: TabCollection::new(),
            monitors: MonitorBus::new(),
            recently_closed: VecDeque::new(),
            restoring: false,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    // -----------------------------------------------------------------------
    // Registration
    // -----------------------------------------------------------------------

    /// Register a view provider's tab type and all of its modes.
    pub fn register_tab_type(&mut self, descriptor: TabTypeDescriptor) -> EngineResult<()> {
        let shared_panel = descriptor.panel_id.clone();
        self.registry.register(descriptor)?;
        if let Some(panel_id) = shared_panel {
            self.panels.register_shared(&panel_id);
        }
        Ok(())
    }

    /// Add a monitor; it observes events from the next call on.
    pub fn register_tab_monitor(&mut self, monitor: Box<dyn TabMonitor>) -> MonitorId {
        self.monitors.register(monitor)
    }

    pub fn unregister_tab_monitor(&mut self, id: MonitorId) -> Option<Box<dyn TabMonitor>> {
        self.monitors.unregister(id)
    }

    /// Monitor failures recorded since the last call
    pub fn take_monitor_failures(&mut self) -> Vec<MonitorNotificationFailure> {
        self.monitors.take_failures()
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn panels(&self) -> &PanelAllocator {
        &self.panels
    }

    pub fn tabs(&self) -> &TabCollection {
        &self.tabs
    }

    pub fn monitors(&self) -> &MonitorBus {
        &self.monitors
    }

    // -----------------------------------------------------------------------
    // Handle access
    // -----------------------------------------------------------------------

    pub fn is_open(&self, id: TabId) -> bool {
        self.tabs.contains(id)
    }

    pub fn tab(&self, id: TabId) -> Option<&TabRecord> {
        self.tabs.get(id)
    }

    pub fn current_tab(&self) -> Option<&TabRecord> {
        self.tabs.active_tab()
    }

    pub fn current_tab_id(&self) -> Option<TabId> {
        self.tabs.active_tab_id()
    }

    pub fn tab_count(&self) -> usize {
        self.tabs.tab_count()
    }

    /// Run `f` against the tab if it is still open
    pub fn with_tab_mut<R>(&mut self, id: TabId, f: impl FnOnce(&mut TabRecord) -> R) -> Option<R> {
        match self.tabs.get_mut(id) {
            Some(tab) => Some(f(tab)),
            None => {
                log::debug!("Ignoring update for closed tab {}", id);
                None
            }
        }
    }

    /// Set the busy flag; returns false if the tab has closed
    pub fn set_busy(&mut self, id: TabId, busy: bool) -> bool {
        self.with_tab_mut(id, |tab| tab.busy = busy).is_some()
    }

    /// Set the thinking flag; returns false if the tab has closed
    pub fn set_thinking(&mut self, id: TabId, thinking: bool) -> bool {
        self.with_tab_mut(id, |tab| tab.thinking = thinking).is_some()
    }

    /// Surface hosting the tab's content: the mode's browser hook if it has
    /// one, else the tab's own presentation surface
    pub fn content_surface(&self, id: TabId) -> EngineResult<SurfaceId> {
        let tab = self.tabs.get(id).ok_or(EngineError::TabNotFound(id))?;
        let mode = self.mode_entry(tab.mode())?;
        let from_hook = mode
            .descriptor()
            .get_browser
            .as_ref()
            .and_then(|hook| hook(tab));
        Ok(from_hook.unwrap_or_else(|| tab.surface_id()))
    }

    /// Number of open tabs of a mode
    pub fn open_count(&self, mode: &str) -> usize {
        self.registry.modes().open_count(mode)
    }

    pub(crate) fn mode_entry(&self, name: &str) -> EngineResult<Rc<ModeEntry>> {
        self.registry
            .modes()
            .get(name)
            .ok_or_else(|| EngineError::UnknownMode(name.to_string()))
    }

    pub(crate) fn mode_of(&self, id: TabId) -> EngineResult<Rc<ModeEntry>> {
        let tab = self.tabs.get(id).ok_or(EngineError::TabNotFound(id))?;
        self.mode_entry(tab.mode())
    }

    /// Shared panel a mode renders into, if its type uses one
    pub fn shared_panel_of(&self, mode: &str) -> Option<String> {
        let entry = self.registry.modes().get(mode)?;
        match entry.presentation() {
            Presentation::Shared { panel_id } => Some(panel_id.clone()),
            Presentation::PerTab { .. } => None,
        }
    }
}

impl Default for TabEngine {
    fn default() -> Self {
        Self::new(Config::default())
    }
}
