//! Configuration system for the tabdeck tab management engine.
//!
//! This crate provides configuration loading, saving, and default values
//! for the engine. It includes:
//!
//! - Tab lifecycle options (last-tab close policy, undo-close history size)
//! - Session persistence settings (restore on startup, session file location)
//! - Log level selection for the logging bridge

pub mod config;
pub mod defaults;
pub mod error;
mod types;

pub use config::{Config, SessionConfig, TabsConfig};
pub use error::ConfigError;
pub use types::{LastTabPolicy, LogLevel};
