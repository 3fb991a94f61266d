//! tabdeck: a host-agnostic tab management engine.
//!
//! View providers register tab types (each with one or more modes) on a
//! [`TabEngine`]; the engine opens, switches, closes, retitles and persists
//! the tabs those modes create, and fans every lifecycle event out to
//! registered [`TabMonitor`]s.
//!
//! The engine is single-threaded: every call runs to completion, hooks and
//! monitor notifications included, before it returns. Nothing here locks.

/// Crate version, for CLI and log output.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod cli;
pub mod debug;
pub mod engine;
pub mod error;
pub mod monitor;
pub mod panel;
pub mod registry;
pub mod session;
pub mod tab;

pub use engine::{CommandOutcome, OpenOptions, TabEngine};
pub use error::{EngineError, EngineResult, MonitorNotificationFailure};
pub use monitor::{MonitorEvent, MonitorId, MonitorResult, TabMonitor};
pub use panel::{OwnedSurface, PanelAllocator, Surface, SurfaceId};
pub use registry::{LifecycleHooks, ModeDescriptor, PerTabPanel, TabTypeDescriptor};
pub use session::{RestoreFailure, RestoreReport, SessionEntry, SessionRecord};
pub use tab::{TabCollection, TabId, TabRecord, TabState};
pub use tabdeck_config::{Config, LastTabPolicy, LogLevel};
