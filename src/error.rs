//! Typed error types for the tab engine.
//!
//! Every failure the engine reports degrades to "this one registration, tab or
//! session entry did not succeed"; none of them leave the engine unusable.

use crate::tab::TabId;
use thiserror::Error;

/// Result alias for engine operations.
pub type EngineResult<T> = std::result::Result<T, EngineError>;

/// Errors returned synchronously from registration and lifecycle calls.
#[derive(Debug, Error)]
pub enum EngineError {
    // -----------------------------------------------------------------------
    // Registration
    // -----------------------------------------------------------------------
    /// A tab type with this name is already registered.
    #[error("tab type '{0}' is already registered")]
    DuplicateTypeName(String),

    /// A mode with this name already exists somewhere in the system.
    #[error("mode '{mode}' is already registered by tab type '{owner}'")]
    DuplicateModeName {
        /// The colliding mode name.
        mode: String,
        /// Tab type that already owns the name.
        owner: String,
    },

    /// The descriptor is structurally incomplete or contradictory.
    #[error("invalid descriptor for tab type '{type_name}': {reason}")]
    InvalidDescriptor {
        /// Name of the rejected tab type.
        type_name: String,
        /// Human-readable description of the problem.
        reason: String,
    },

    // -----------------------------------------------------------------------
    // Lifecycle
    // -----------------------------------------------------------------------
    /// No registered mode has this name.
    #[error("unknown mode '{0}'")]
    UnknownMode(String),

    /// The mode already has `max_tabs` tabs open.
    #[error("mode '{mode}' already has the maximum of {max_tabs} open tab(s)")]
    ModeCapacityExceeded {
        /// Mode that is at capacity.
        mode: String,
        /// The mode's configured cap.
        max_tabs: usize,
    },

    /// Closing the tab would break the close policy.
    #[error("tab {tab} cannot be closed: {reason}")]
    CannotCloseLastTab {
        /// Tab the caller tried to close.
        tab: TabId,
        /// Which guard refused the close.
        reason: &'static str,
    },

    /// The handle does not name an open tab (it closed, or never existed).
    #[error("no open tab with id {0}")]
    TabNotFound(TabId),

    /// A 0-based position past the end of the tab strip.
    #[error("no tab at index {index} (open tabs: {count})")]
    NoTabAtIndex {
        /// Requested position.
        index: usize,
        /// Number of open tabs when the call was made.
        count: usize,
    },

    /// The call acts on the selected tab, and no tab is selected.
    #[error("no tab is selected")]
    NoTabSelected,

    /// A provider hook reported a failure.
    #[error("{hook} hook for mode '{mode}' failed: {message}")]
    HookFailed {
        /// Mode whose hook failed.
        mode: String,
        /// Hook name (`open`, `restore`, `do_command`, ...).
        hook: &'static str,
        /// The provider's error, rendered with its context chain.
        message: String,
    },

    /// A session entry names a mode that cannot restore tabs.
    #[error("mode '{0}' has no restore hook")]
    NotRestorable(String),
}

impl EngineError {
    /// Convert a provider hook error, keeping engine errors the hook propagated.
    pub(crate) fn from_hook(mode: &str, hook: &'static str, err: anyhow::Error) -> Self {
        match err.downcast::<EngineError>() {
            Ok(engine_err) => engine_err,
            Err(other) => EngineError::HookFailed {
                mode: mode.to_string(),
                hook,
                message: format!("{other:#}"),
            },
        }
    }
}

/// A monitor failed while observing a lifecycle event.
///
/// Never returned from engine calls: failures are logged and collected on the
/// monitor bus, and delivery continues with the next monitor.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("monitor '{monitor}' failed during {event}: {message}")]
pub struct MonitorNotificationFailure {
    /// Name reported by the failing monitor.
    pub monitor: String,
    /// Event being delivered.
    pub event: crate::monitor::MonitorEvent,
    /// The monitor's error, rendered with its context chain.
    pub message: String,
}
