//! Flat, system-wide namespace of modes.

use super::Presentation;
use super::descriptor::ModeDescriptor;
use super::hooks::LifecycleHooks;
use std::collections::HashMap;
use std::rc::Rc;

/// A registered mode with its tab-type fallbacks already resolved.
#[derive(Debug)]
pub struct ModeEntry {
    descriptor: ModeDescriptor,
    type_name: String,
    presentation: Presentation,
    lifecycle: LifecycleHooks,
}

impl ModeEntry {
    pub(crate) fn new(
        descriptor: ModeDescriptor,
        type_name: &str,
        presentation: Presentation,
        fallback: &LifecycleHooks,
    ) -> Self {
        let lifecycle = descriptor.hooks.or_fallback(fallback);
        Self {
            descriptor,
            type_name: type_name.to_string(),
            presentation,
            lifecycle,
        }
    }

    pub fn name(&self) -> &str {
        &self.descriptor.name
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// The descriptor exactly as the provider registered it
    pub fn descriptor(&self) -> &ModeDescriptor {
        &self.descriptor
    }

    pub fn presentation(&self) -> &Presentation {
        &self.presentation
    }

    /// Effective lifecycle hooks (mode hooks, else tab-type fallbacks)
    pub fn lifecycle(&self) -> &LifecycleHooks {
        &self.lifecycle
    }

    pub fn max_tabs(&self) -> Option<usize> {
        self.descriptor.max_tabs
    }

    pub fn is_default(&self) -> bool {
        self.descriptor.is_default
    }
}

/// Every mode of every registered type, keyed by mode name.
#[derive(Debug, Default)]
pub struct ModeRegistry {
    modes: HashMap<String, Rc<ModeEntry>>,
    /// Registration order, for listing and default-mode lookup
    order: Vec<String>,
    open_counts: HashMap<String, usize>,
}

impl ModeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<Rc<ModeEntry>> {
        self.modes.get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.modes.contains_key(name)
    }

    /// Tab type that owns a mode name
    pub fn owner_of(&self, name: &str) -> Option<&str> {
        self.modes.get(name).map(|entry| entry.type_name())
    }

    pub(crate) fn insert(&mut self, entry: ModeEntry) {
        let name = entry.name().to_string();
        self.open_counts.insert(name.clone(), 0);
        self.order.push(name.clone());
        self.modes.insert(name, Rc::new(entry));
    }

    /// Mode names in registration order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    /// The first mode registered with the default flag
    pub fn default_mode(&self) -> Option<Rc<ModeEntry>> {
        self.order
            .iter()
            .filter_map(|name| self.modes.get(name))
            .find(|entry| entry.is_default())
            .cloned()
    }

    pub fn open_count(&self, name: &str) -> usize {
        self.open_counts.get(name).copied().unwrap_or(0)
    }

    pub(crate) fn tab_opened(&mut self, name: &str) {
        *self.open_counts.entry(name.to_string()).or_insert(0) += 1;
    }

    pub(crate) fn tab_closed(&mut self, name: &str) {
        if let Some(count) = self.open_counts.get_mut(name) {
            *count = count.saturating_sub(1);
        }
    }

    pub fn len(&self) -> usize {
        self.modes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modes.is_empty()
    }
}
