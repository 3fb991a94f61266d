//! Registration of view providers.
//!
//! This module provides:
//! - `TabTypeDescriptor` / `ModeDescriptor`: what a provider hands in
//! - `TypeRegistry`: registered tab types keyed by name, validated on entry
//! - `ModeRegistry`: every mode of every type in one namespace, with
//!   per-mode open-tab counts
//!
//! Registration is all-or-nothing: a descriptor that fails any check leaves
//! both registries untouched. Types cannot be unregistered.

mod descriptor;
mod hooks;
mod modes;

pub use descriptor::{ModeDescriptor, PerTabPanel, SurfaceFactory, TabTypeDescriptor};
pub use hooks::{
    BrowserHook, CommandHook, CommandQueryHook, LifecycleHooks, OpenHook, PersistHook,
    RestoreHook, SwitchToHook, TabHook, TitleHook,
};
pub use modes::{ModeEntry, ModeRegistry};

use crate::error::{EngineError, EngineResult};
use std::collections::{HashMap, HashSet};
use std::fmt;

/// Validated presentation strategy of a tab type.
#[derive(Clone)]
pub enum Presentation {
    /// All tabs of the type multiplex one panel
    Shared {
        /// Panel id from the descriptor
        panel_id: String,
    },
    /// Each tab gets its own surface
    PerTab {
        /// Container type created for each tab
        container: String,
        /// Optional content builder
        factory: Option<SurfaceFactory>,
    },
}

impl fmt::Debug for Presentation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Presentation::Shared { panel_id } => {
                f.debug_struct("Shared").field("panel_id", panel_id).finish()
            }
            Presentation::PerTab { container, factory } => f
                .debug_struct("PerTab")
                .field("container", container)
                .field("has_factory", &factory.is_some())
                .finish(),
        }
    }
}

/// A tab type as stored after registration.
#[derive(Debug, Clone)]
pub struct RegisteredType {
    name: String,
    presentation: Presentation,
    mode_names: Vec<String>,
}

impl RegisteredType {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn presentation(&self) -> &Presentation {
        &self.presentation
    }

    /// Modes declared by this type, in declaration order
    pub fn mode_names(&self) -> &[String] {
        &self.mode_names
    }
}

/// Registered tab types keyed by unique name.
#[derive(Debug, Default)]
pub struct TypeRegistry {
    types: HashMap<String, RegisteredType>,
    order: Vec<String>,
}

impl TypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&RegisteredType> {
        self.types.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.types.contains_key(name)
    }

    /// Registered types in registration order
    pub fn iter(&self) -> impl Iterator<Item = &RegisteredType> {
        self.order.iter().filter_map(|name| self.types.get(name))
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    fn insert(&mut self, registered: RegisteredType) {
        self.order.push(registered.name.clone());
        self.types.insert(registered.name.clone(), registered);
    }
}

/// Both registries, updated together.
#[derive(Debug, Default)]
pub struct Registry {
    types: TypeRegistry,
    modes: ModeRegistry,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn types(&self) -> &TypeRegistry {
        &self.types
    }

    pub fn modes(&self) -> &ModeRegistry {
        &self.modes
    }

    pub(crate) fn modes_mut(&mut self) -> &mut ModeRegistry {
        &mut self.modes
    }

    /// Validate and register a tab type with all of its modes.
    pub(crate) fn register(&mut self, descriptor: TabTypeDescriptor) -> EngineResult<()> {
        let presentation = self.validate(&descriptor)?;
        let TabTypeDescriptor {
            name,
            modes,
            fallback,
            ..
        } = descriptor;

        let mode_names: Vec<String> = modes.iter().map(|mode| mode.name.clone()).collect();
        for mode in modes {
            self.modes
                .insert(ModeEntry::new(mode, &name, presentation.clone(), &fallback));
        }

        log::info!(
            "Registered tab type '{}' ({:?}) with modes {:?}",
            name,
            presentation,
            mode_names
        );
        self.types.insert(RegisteredType {
            name,
            presentation,
            mode_names,
        });
        Ok(())
    }

    /// Check a descriptor against itself and the existing registrations.
    fn validate(&self, descriptor: &TabTypeDescriptor) -> EngineResult<Presentation> {
        let type_name = &descriptor.name;
        let invalid = |reason: String| EngineError::InvalidDescriptor {
            type_name: type_name.clone(),
            reason,
        };

        if type_name.trim().is_empty() {
            return Err(invalid("tab type name is empty".to_string()));
        }
        if self.types.contains(type_name) {
            return Err(EngineError::DuplicateTypeName(type_name.clone()));
        }

        let presentation = match (&descriptor.panel_id, &descriptor.per_tab_panel) {
            (Some(panel_id), None) => {
                if panel_id.trim().is_empty() {
                    return Err(invalid("shared panel id is empty".to_string()));
                }
                Presentation::Shared {
                    panel_id: panel_id.clone(),
                }
            }
            (None, Some(panel)) => Presentation::PerTab {
                container: panel.container.clone(),
                factory: panel.factory.clone(),
            },
            (None, None) => {
                return Err(invalid(
                    "neither a shared panel nor a per-tab panel is set".to_string(),
                ));
            }
            (Some(_), Some(_)) => {
                return Err(invalid(
                    "both a shared panel and a per-tab panel are set".to_string(),
                ));
            }
        };

        if descriptor.modes.is_empty() {
            return Err(invalid("no modes declared".to_string()));
        }

        let mut seen = HashSet::new();
        for mode in &descriptor.modes {
            if mode.name.trim().is_empty() {
                return Err(invalid("a mode name is empty".to_string()));
            }
            if let Some(owner) = self.modes.owner_of(&mode.name) {
                return Err(EngineError::DuplicateModeName {
                    mode: mode.name.clone(),
                    owner: owner.to_string(),
                });
            }
            if !seen.insert(mode.name.as_str()) {
                return Err(EngineError::DuplicateModeName {
                    mode: mode.name.clone(),
                    owner: type_name.clone(),
                });
            }
            if mode.max_tabs == Some(0) {
                return Err(invalid(format!("mode '{}' has max_tabs = 0", mode.name)));
            }

            let effective = mode.hooks.or_fallback(&descriptor.fallback);
            if effective.open.is_none() {
                return Err(invalid(format!("mode '{}' has no open hook", mode.name)));
            }
            if effective.persist.is_some() && effective.restore.is_none() {
                return Err(invalid(format!(
                    "mode '{}' persists tabs but has no restore hook",
                    mode.name
                )));
            }
        }

        let ignored = self.ignored_defaults(descriptor);
        if !ignored.is_empty() {
            let current = self
                .modes
                .default_mode()
                .map(|mode| mode.name().to_string())
                .or_else(|| {
                    descriptor
                        .modes
                        .iter()
                        .find(|m| m.is_default)
                        .map(|m| m.name.clone())
                })
                .unwrap_or_default();
            log::warn!(
                "Tab type '{}' marks {:?} as default, but '{}' is already the default mode",
                type_name,
                ignored,
                current
            );
        }

        Ok(presentation)
    }

    /// Modes this descriptor flags as default that would not become the
    /// system-wide default. Only one mode can be the default; the first
    /// flagged mode in registration order wins.
    pub(crate) fn ignored_defaults(&self, descriptor: &TabTypeDescriptor) -> Vec<String> {
        let skip = usize::from(self.modes.default_mode().is_none());
        descriptor
            .modes
            .iter()
            .filter(|mode| mode.is_default)
            .skip(skip)
            .map(|mode| mode.name.clone())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn openable(name: &str) -> ModeDescriptor {
        ModeDescriptor::new(name).on_open(|_, _| Ok(()))
    }

    #[test]
    fn register_adds_every_mode_with_zero_count() {
        let mut registry = Registry::new();
        registry
            .register(
                TabTypeDescriptor::new("mail")
                    .shared_panel("mailContent")
                    .mode(openable("folder"))
                    .mode(openable("message")),
            )
            .unwrap();

        assert!(registry.types().contains("mail"));
        assert_eq!(registry.modes().len(), 2);
        assert_eq!(registry.modes().open_count("folder"), 0);
        assert_eq!(registry.modes().owner_of("message"), Some("mail"));
    }

    #[test]
    fn duplicate_type_name_is_rejected() {
        let mut registry = Registry::new();
        registry
            .register(TabTypeDescriptor::new("mail").shared_panel("P").mode(openable("a")))
            .unwrap();
        let err = registry
            .register(TabTypeDescriptor::new("mail").shared_panel("P").mode(openable("b")))
            .unwrap_err();
        assert!(matches!(err, EngineError::DuplicateTypeName(name) if name == "mail"));
        assert!(!registry.modes().contains("b"));
    }

    #[test]
    fn overlapping_mode_names_leave_no_partial_registration() {
        let mut registry = Registry::new();
        registry
            .register(TabTypeDescriptor::new("first").shared_panel("P").mode(openable("shared")))
            .unwrap();
        let err = registry
            .register(
                TabTypeDescriptor::new("second")
                    .shared_panel("Q")
                    .mode(openable("fresh"))
                    .mode(openable("shared")),
            )
            .unwrap_err();

        assert!(matches!(
            err,
            EngineError::DuplicateModeName { ref mode, ref owner } if mode == "shared" && owner == "first"
        ));
        assert!(!registry.modes().contains("fresh"));
        assert!(!registry.types().contains("second"));
    }

    #[test]
    fn presentation_must_be_exactly_one() {
        let mut registry = Registry::new();
        let neither = TabTypeDescriptor::new("none").mode(openable("a"));
        assert!(matches!(
            registry.register(neither),
            Err(EngineError::InvalidDescriptor { .. })
        ));

        let both = TabTypeDescriptor::new("both")
            .shared_panel("P")
            .per_tab_panel(PerTabPanel::container("vbox"))
            .mode(openable("b"));
        assert!(matches!(
            registry.register(both),
            Err(EngineError::InvalidDescriptor { .. })
        ));
        assert!(registry.types().is_empty());
        assert!(registry.modes().is_empty());
    }

    #[test]
    fn type_level_open_hook_satisfies_modes() {
        let mut registry = Registry::new();
        let descriptor = TabTypeDescriptor::new("content")
            .per_tab_panel(PerTabPanel::container("browser"))
            .fallback_hooks(LifecycleHooks::new().on_open(|_, _| Ok(())))
            .mode(ModeDescriptor::new("page"));
        registry.register(descriptor).unwrap();

        let entry = registry.modes().get("page").unwrap();
        assert!(entry.lifecycle().open.is_some());
        assert!(entry.descriptor().hooks().open.is_none());
    }

    #[test]
    fn structural_checks() {
        let mut registry = Registry::new();
        let cases = [
            TabTypeDescriptor::new("no-modes").shared_panel("P"),
            TabTypeDescriptor::new("no-open")
                .shared_panel("P")
                .mode(ModeDescriptor::new("x")),
            TabTypeDescriptor::new("zero-cap")
                .shared_panel("P")
                .mode(openable("y").with_max_tabs(0)),
            TabTypeDescriptor::new("persist-only")
                .shared_panel("P")
                .mode(openable("z").on_persist(|_| None)),
            TabTypeDescriptor::new("")
                .shared_panel("P")
                .mode(openable("w")),
        ];
        for descriptor in cases {
            assert!(matches!(
                registry.register(descriptor),
                Err(EngineError::InvalidDescriptor { .. })
            ));
        }
        assert!(registry.modes().is_empty());
    }

    #[test]
    fn repeated_mode_within_one_descriptor() {
        let mut registry = Registry::new();
        let err = registry
            .register(
                TabTypeDescriptor::new("dup")
                    .shared_panel("P")
                    .mode(openable("m"))
                    .mode(openable("m")),
            )
            .unwrap_err();
        assert!(matches!(err, EngineError::DuplicateModeName { .. }));
    }

    #[test]
    fn default_mode_is_first_flagged() {
        let mut registry = Registry::new();
        registry
            .register(
                TabTypeDescriptor::new("t")
                    .shared_panel("P")
                    .mode(openable("plain"))
                    .mode(openable("home").default_mode()),
            )
            .unwrap();
        assert_eq!(
            registry.modes().default_mode().map(|m| m.name().to_string()),
            Some("home".to_string())
        );
    }

    #[test]
    fn later_default_modes_are_ignored() {
        let mut registry = Registry::new();
        let second_default = TabTypeDescriptor::new("t")
            .shared_panel("P")
            .mode(openable("home").default_mode())
            .mode(openable("start").default_mode());
        assert_eq!(registry.ignored_defaults(&second_default), vec!["start"]);
        registry.register(second_default).unwrap();

        let other_type = TabTypeDescriptor::new("u")
            .shared_panel("Q")
            .mode(openable("dashboard").default_mode());
        assert_eq!(registry.ignored_defaults(&other_type), vec!["dashboard"]);
        registry.register(other_type).unwrap();

        assert_eq!(
            registry.modes().default_mode().map(|m| m.name().to_string()),
            Some("home".to_string())
        );
    }
}
