//! Presentation surface allocation.
//!
//! A tab type either multiplexes all of its tabs onto one shared panel, or
//! gives every tab a freshly built surface of its own. [`PanelAllocator`]
//! hands out [`Surface`] values for both strategies and tracks which tab
//! currently holds each shared panel.

use crate::registry::{Presentation, SurfaceFactory};
use crate::tab::TabId;
use std::any::Any;
use std::collections::{HashMap, HashSet};
use std::fmt;
use uuid::Uuid;

/// Identity of a presentation surface.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SurfaceId {
    /// A shared panel, named by its panel id
    Shared(String),
    /// A per-tab surface
    Owned(Uuid),
}

impl fmt::Display for SurfaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SurfaceId::Shared(panel_id) => write!(f, "panel:{panel_id}"),
            SurfaceId::Owned(id) => write!(f, "surface:{id}"),
        }
    }
}

/// A surface built for exactly one tab.
pub struct OwnedSurface {
    id: Uuid,
    container: String,
    content: Option<Box<dyn Any>>,
}

impl OwnedSurface {
    /// Unique id of this surface
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Container type the surface was created as
    pub fn container(&self) -> &str {
        &self.container
    }

    /// Provider-built content, if the factory produced a value of type `T`
    pub fn content<T: 'static>(&self) -> Option<&T> {
        self.content.as_ref().and_then(|c| c.downcast_ref::<T>())
    }

    /// Mutable access to provider-built content of type `T`
    pub fn content_mut<T: 'static>(&mut self) -> Option<&mut T> {
        self.content.as_mut().and_then(|c| c.downcast_mut::<T>())
    }
}

impl fmt::Debug for OwnedSurface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OwnedSurface")
            .field("id", &self.id)
            .field("container", &self.container)
            .field("has_content", &self.content.is_some())
            .finish()
    }
}

/// The surface a tab renders into.
#[derive(Debug)]
pub enum Surface {
    /// Borrowed use of a shared panel
    Shared {
        /// Panel id from the tab type descriptor
        panel_id: String,
    },
    /// Exclusively owned per-tab surface
    Owned(OwnedSurface),
}

impl Surface {
    pub fn id(&self) -> SurfaceId {
        match self {
            Surface::Shared { panel_id } => SurfaceId::Shared(panel_id.clone()),
            Surface::Owned(owned) => SurfaceId::Owned(owned.id),
        }
    }

    pub fn is_shared(&self) -> bool {
        matches!(self, Surface::Shared { .. })
    }

    pub fn as_owned(&self) -> Option<&OwnedSurface> {
        match self {
            Surface::Owned(owned) => Some(owned),
            Surface::Shared { .. } => None,
        }
    }

    pub fn as_owned_mut(&mut self) -> Option<&mut OwnedSurface> {
        match self {
            Surface::Owned(owned) => Some(owned),
            Surface::Shared { .. } => None,
        }
    }
}

/// Bookkeeping for one shared panel.
#[derive(Debug, Default)]
struct SharedPanel {
    /// Tabs currently multiplexed onto the panel
    users: usize,
    /// Tab whose show hook last acquired the panel
    owner: Option<TabId>,
}

/// Hands out and reclaims presentation surfaces.
#[derive(Debug, Default)]
pub struct PanelAllocator {
    shared: HashMap<String, SharedPanel>,
    live_owned: HashSet<Uuid>,
}

impl PanelAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make a shared panel known before any tab uses it
    pub(crate) fn register_shared(&mut self, panel_id: &str) {
        self.shared.entry(panel_id.to_string()).or_default();
    }

    /// Produce the surface for a new tab.
    ///
    /// Shared panels are handed out as-is; per-tab surfaces are built through
    /// the provider factory, or as an empty container of the named type.
    pub(crate) fn allocate(&mut self, presentation: &Presentation, tab: TabId) -> Surface {
        match presentation {
            Presentation::Shared { panel_id } => {
                self.shared.entry(panel_id.clone()).or_default().users += 1;
                Surface::Shared {
                    panel_id: panel_id.clone(),
                }
            }
            Presentation::PerTab { container, factory } => {
                let surface = build_owned(container, factory.as_ref(), tab);
                self.live_owned.insert(surface.id);
                log::debug!(
                    "Allocated {} surface {} for tab {}",
                    surface.container,
                    surface.id,
                    tab
                );
                Surface::Owned(surface)
            }
        }
    }

    /// Give a surface back. Per-tab surfaces are destroyed; shared panels stay.
    pub(crate) fn release(&mut self, surface: Surface, tab: TabId) {
        match surface {
            Surface::Shared { panel_id } => {
                if let Some(panel) = self.shared.get_mut(&panel_id) {
                    panel.users = panel.users.saturating_sub(1);
                    if panel.owner == Some(tab) {
                        panel.owner = None;
                    }
                }
            }
            Surface::Owned(owned) => {
                self.live_owned.remove(&owned.id);
                log::debug!("Destroyed surface {} of tab {}", owned.id, tab);
                drop(owned);
            }
        }
    }

    /// Record that `tab` now holds its shared panel (no-op for per-tab surfaces)
    pub(crate) fn acquire(&mut self, surface: &Surface, tab: TabId) {
        if let Surface::Shared { panel_id } = surface
            && let Some(panel) = self.shared.get_mut(panel_id)
        {
            panel.owner = Some(tab);
        }
    }

    /// Record that `tab` let go of its shared panel (no-op for per-tab surfaces)
    pub(crate) fn relinquish(&mut self, surface: &Surface, tab: TabId) {
        if let Surface::Shared { panel_id } = surface
            && let Some(panel) = self.shared.get_mut(panel_id)
            && panel.owner == Some(tab)
        {
            panel.owner = None;
        }
    }

    /// Tab currently holding a shared panel
    pub fn shared_owner(&self, panel_id: &str) -> Option<TabId> {
        self.shared.get(panel_id).and_then(|panel| panel.owner)
    }

    /// Number of tabs multiplexed onto a shared panel
    pub fn shared_users(&self, panel_id: &str) -> usize {
        self.shared.get(panel_id).map_or(0, |panel| panel.users)
    }

    /// Whether a shared panel with this id is known
    pub fn has_shared_panel(&self, panel_id: &str) -> bool {
        self.shared.contains_key(panel_id)
    }

    /// Number of per-tab surfaces that have not been released
    pub fn live_surface_count(&self) -> usize {
        self.live_owned.len()
    }

    /// Whether a per-tab surface is still alive
    pub fn is_live(&self, id: Uuid) -> bool {
        self.live_owned.contains(&id)
    }
}

fn build_owned(container: &str, factory: Option<&SurfaceFactory>, tab: TabId) -> OwnedSurface {
    OwnedSurface {
        id: Uuid::new_v4(),
        container: container.to_string(),
        content: factory.map(|build| build(tab)),
    }
}
