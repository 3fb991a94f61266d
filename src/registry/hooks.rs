//! Hook signatures supplied by view providers.
//!
//! Hooks are plain reference-counted closures stored in optional fields.
//! Which hooks a mode has is fixed at registration time; the engine never
//! probes providers for capabilities at call time.

use crate::engine::TabEngine;
use crate::panel::SurfaceId;
use crate::tab::{TabId, TabRecord};
use serde_json::Value;
use std::fmt;
use std::rc::Rc;

/// Populate a freshly allocated tab from the caller's open arguments.
pub type OpenHook = Rc<dyn Fn(&mut TabRecord, &Value) -> anyhow::Result<()>>;
/// Close, save-state and show hooks.
pub type TabHook = Rc<dyn Fn(&mut TabRecord)>;
/// Produce the opaque state to persist, or `None` to leave the tab out.
pub type PersistHook = Rc<dyn Fn(&TabRecord) -> Option<Value>>;
/// Re-open a tab from persisted state by calling back into the engine.
pub type RestoreHook = Rc<dyn Fn(&mut TabEngine, &Value) -> anyhow::Result<()>>;
/// Compute the authoritative display title of a tab.
pub type TitleHook = Rc<dyn Fn(&TabRecord) -> String>;
/// Dedup check: name an already open tab to switch to instead of opening.
pub type SwitchToHook = Rc<dyn Fn(&Value, &[TabRecord]) -> Option<TabId>>;
/// `supports_command` / `is_command_enabled` queries.
pub type CommandQueryHook = Rc<dyn Fn(&str, &TabRecord) -> bool>;
/// Execute a command against a tab.
pub type CommandHook = Rc<dyn Fn(&str, &mut TabRecord) -> anyhow::Result<()>>;
/// Report the surface that hosts a tab's content.
pub type BrowserHook = Rc<dyn Fn(&TabRecord) -> Option<SurfaceId>>;

/// The lifecycle hooks a mode may define, and a tab type may provide as
/// fallbacks for modes that omit them.
#[derive(Clone, Default)]
pub struct LifecycleHooks {
    pub(crate) open: Option<OpenHook>,
    pub(crate) close: Option<TabHook>,
    pub(crate) save_state: Option<TabHook>,
    pub(crate) show: Option<TabHook>,
    pub(crate) persist: Option<PersistHook>,
    pub(crate) restore: Option<RestoreHook>,
}

impl LifecycleHooks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_open(
        mut self,
        hook: impl Fn(&mut TabRecord, &Value) -> anyhow::Result<()> + 'static,
    ) -> Self {
        self.open = Some(Rc::new(hook));
        self
    }

    pub fn on_close(mut self, hook: impl Fn(&mut TabRecord) + 'static) -> Self {
        self.close = Some(Rc::new(hook));
        self
    }

    /// Called on the outgoing tab of a switch, before the incoming tab is shown
    pub fn on_save_state(mut self, hook: impl Fn(&mut TabRecord) + 'static) -> Self {
        self.save_state = Some(Rc::new(hook));
        self
    }

    pub fn on_show(mut self, hook: impl Fn(&mut TabRecord) + 'static) -> Self {
        self.show = Some(Rc::new(hook));
        self
    }

    pub fn on_persist(mut self, hook: impl Fn(&TabRecord) -> Option<Value> + 'static) -> Self {
        self.persist = Some(Rc::new(hook));
        self
    }

    pub fn on_restore(
        mut self,
        hook: impl Fn(&mut TabEngine, &Value) -> anyhow::Result<()> + 'static,
    ) -> Self {
        self.restore = Some(Rc::new(hook));
        self
    }

    /// Mode hooks first, tab-type hooks for whatever the mode left out.
    pub(crate) fn or_fallback(&self, fallback: &LifecycleHooks) -> LifecycleHooks {
        LifecycleHooks {
            open: self.open.clone().or_else(|| fallback.open.clone()),
            close: self.close.clone().or_else(|| fallback.close.clone()),
            save_state: self
                .save_state
                .clone()
                .or_else(|| fallback.save_state.clone()),
            show: self.show.clone().or_else(|| fallback.show.clone()),
            persist: self.persist.clone().or_else(|| fallback.persist.clone()),
            restore: self.restore.clone().or_else(|| fallback.restore.clone()),
        }
    }

    /// Names of the hooks that are present, for diagnostics
    pub fn present(&self) -> Vec<&'static str> {
        [
            ("open", self.open.is_some()),
            ("close", self.close.is_some()),
            ("save_state", self.save_state.is_some()),
            ("show", self.show.is_some()),
            ("persist", self.persist.is_some()),
            ("restore", self.restore.is_some()),
        ]
        .into_iter()
        .filter_map(|(name, present)| present.then_some(name))
        .collect()
    }
}

impl fmt::Debug for LifecycleHooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LifecycleHooks")
            .field("present", &self.present())
            .finish()
    }
}
