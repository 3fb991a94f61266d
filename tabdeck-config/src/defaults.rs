//! Default value functions for configuration.
//!
//! Used as `#[serde(default = "crate::defaults::...")]` attributes on config
//! fields so that partial YAML files fill in the gaps.

/// Number of closed tabs remembered for undo-close
pub fn recently_closed_limit() -> usize {
    10
}

pub fn restore_on_startup() -> bool {
    true
}

/// File name of the session file inside the config directory
pub fn session_file_name() -> &'static str {
    "last_session.yaml"
}
