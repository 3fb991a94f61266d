//! Provider-supplied descriptors for tab types and their modes.

use super::hooks::{
    BrowserHook, CommandHook, CommandQueryHook, LifecycleHooks, SwitchToHook, TitleHook,
};
use crate::engine::TabEngine;
use crate::panel::SurfaceId;
use crate::tab::{TabId, TabRecord};
use serde_json::Value;
use std::any::Any;
use std::fmt;
use std::rc::Rc;

/// Builds the content of a per-tab surface.
pub type SurfaceFactory = Rc<dyn Fn(TabId) -> Box<dyn Any>>;

/// Per-tab presentation: every tab gets a new container of this type.
#[derive(Clone)]
pub struct PerTabPanel {
    pub(crate) container: String,
    pub(crate) factory: Option<SurfaceFactory>,
}

impl PerTabPanel {
    /// An empty container of the named type per tab
    pub fn container(container: impl Into<String>) -> Self {
        Self {
            container: container.into(),
            factory: None,
        }
    }

    /// A container whose content is built by `factory` for each tab
    pub fn with_factory<T: 'static>(
        container: impl Into<String>,
        factory: impl Fn(TabId) -> T + 'static,
    ) -> Self {
        Self {
            container: container.into(),
            factory: Some(Rc::new(move |tab| Box::new(factory(tab)) as Box<dyn Any>)),
        }
    }
}

impl fmt::Debug for PerTabPanel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PerTabPanel")
            .field("container", &self.container)
            .field("has_factory", &self.factory.is_some())
            .finish()
    }
}

/// One mode of a tab type: the unit tabs are opened from.
#[derive(Clone)]
pub struct ModeDescriptor {
    pub(crate) name: String,
    pub(crate) style_class: String,
    pub(crate) is_default: bool,
    pub(crate) max_tabs: Option<usize>,
    pub(crate) hooks: LifecycleHooks,
    pub(crate) on_title_changed: Option<TitleHook>,
    pub(crate) should_switch_to: Option<SwitchToHook>,
    pub(crate) supports_command: Option<CommandQueryHook>,
    pub(crate) is_command_enabled: Option<CommandQueryHook>,
    pub(crate) do_command: Option<CommandHook>,
    pub(crate) get_browser: Option<BrowserHook>,
}

impl ModeDescriptor {
    /// A mode with no hooks; the style class defaults to the mode name
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            style_class: name.clone(),
            name,
            is_default: false,
            max_tabs: None,
            hooks: LifecycleHooks::default(),
            on_title_changed: None,
            should_switch_to: None,
            supports_command: None,
            is_command_enabled: None,
            do_command: None,
            get_browser: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn style_class(&self) -> &str {
        &self.style_class
    }

    pub fn is_default(&self) -> bool {
        self.is_default
    }

    pub fn max_tabs(&self) -> Option<usize> {
        self.max_tabs
    }

    pub fn hooks(&self) -> &LifecycleHooks {
        &self.hooks
    }

    pub fn with_style_class(mut self, style_class: impl Into<String>) -> Self {
        self.style_class = style_class.into();
        self
    }

    /// Mark this as the mode used when a default tab is needed
    pub fn default_mode(mut self) -> Self {
        self.is_default = true;
        self
    }

    /// Cap the number of simultaneously open tabs of this mode
    pub fn with_max_tabs(mut self, max_tabs: usize) -> Self {
        self.max_tabs = Some(max_tabs);
        self
    }

    /// Replace the whole lifecycle hook set
    pub fn with_hooks(mut self, hooks: LifecycleHooks) -> Self {
        self.hooks = hooks;
        self
    }

    pub fn on_open(
        mut self,
        hook: impl Fn(&mut TabRecord, &Value) -> anyhow::Result<()> + 'static,
    ) -> Self {
        self.hooks = self.hooks.on_open(hook);
        self
    }

    pub fn on_close(mut self, hook: impl Fn(&mut TabRecord) + 'static) -> Self {
        self.hooks = self.hooks.on_close(hook);
        self
    }

    pub fn on_save_state(mut self, hook: impl Fn(&mut TabRecord) + 'static) -> Self {
        self.hooks = self.hooks.on_save_state(hook);
        self
    }

    pub fn on_show(mut self, hook: impl Fn(&mut TabRecord) + 'static) -> Self {
        self.hooks = self.hooks.on_show(hook);
        self
    }

    pub fn on_persist(mut self, hook: impl Fn(&TabRecord) -> Option<Value> + 'static) -> Self {
        self.hooks = self.hooks.on_persist(hook);
        self
    }

    pub fn on_restore(
        mut self,
        hook: impl Fn(&mut TabEngine, &Value) -> anyhow::Result<()> + 'static,
    ) -> Self {
        self.hooks = self.hooks.on_restore(hook);
        self
    }

    pub fn on_title_changed(mut self, hook: impl Fn(&TabRecord) -> String + 'static) -> Self {
        self.on_title_changed = Some(Rc::new(hook));
        self
    }

    /// Dedup hook: return an open tab to switch to instead of opening a new one
    pub fn should_switch_to(
        mut self,
        hook: impl Fn(&Value, &[TabRecord]) -> Option<TabId> + 'static,
    ) -> Self {
        self.should_switch_to = Some(Rc::new(hook));
        self
    }

    pub fn supports_command(mut self, hook: impl Fn(&str, &TabRecord) -> bool + 'static) -> Self {
        self.supports_command = Some(Rc::new(hook));
        self
    }

    pub fn is_command_enabled(
        mut self,
        hook: impl Fn(&str, &TabRecord) -> bool + 'static,
    ) -> Self {
        self.is_command_enabled = Some(Rc::new(hook));
        self
    }

    pub fn do_command(
        mut self,
        hook: impl Fn(&str, &mut TabRecord) -> anyhow::Result<()> + 'static,
    ) -> Self {
        self.do_command = Some(Rc::new(hook));
        self
    }

    pub fn get_browser(mut self, hook: impl Fn(&TabRecord) -> Option<SurfaceId> + 'static) -> Self {
        self.get_browser = Some(Rc::new(hook));
        self
    }
}

impl fmt::Debug for ModeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModeDescriptor")
            .field("name", &self.name)
            .field("style_class", &self.style_class)
            .field("is_default", &self.is_default)
            .field("max_tabs", &self.max_tabs)
            .field("hooks", &self.hooks)
            .finish_non_exhaustive()
    }
}

/// A view provider's registration record.
///
/// Exactly one of [`shared_panel`](Self::shared_panel) and
/// [`per_tab_panel`](Self::per_tab_panel) must be set; registration rejects
/// descriptors with neither or both.
#[derive(Clone)]
pub struct TabTypeDescriptor {
    pub(crate) name: String,
    pub(crate) panel_id: Option<String>,
    pub(crate) per_tab_panel: Option<PerTabPanel>,
    pub(crate) modes: Vec<ModeDescriptor>,
    pub(crate) fallback: LifecycleHooks,
}

impl TabTypeDescriptor {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            panel_id: None,
            per_tab_panel: None,
            modes: Vec::new(),
            fallback: LifecycleHooks::default(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// All tabs of this type multiplex the panel with this id
    pub fn shared_panel(mut self, panel_id: impl Into<String>) -> Self {
        self.panel_id = Some(panel_id.into());
        self
    }

    /// Every tab of this type gets its own surface
    pub fn per_tab_panel(mut self, panel: PerTabPanel) -> Self {
        self.per_tab_panel = Some(panel);
        self
    }

    pub fn mode(mut self, mode: ModeDescriptor) -> Self {
        self.modes.push(mode);
        self
    }

    /// Type-level hooks used by modes that omit their own
    pub fn fallback_hooks(mut self, hooks: LifecycleHooks) -> Self {
        self.fallback = hooks;
        self
    }
}

impl fmt::Debug for TabTypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TabTypeDescriptor")
            .field("name", &self.name)
            .field("panel_id", &self.panel_id)
            .field("per_tab_panel", &self.per_tab_panel)
            .field("modes", &self.modes)
            .field("fallback", &self.fallback)
            .finish()
    }
}
