use serde::{Deserialize, Serialize};

/// What happens when the caller asks to close the only remaining tab.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum LastTabPolicy {
    /// Refuse only when the sole tab is the first tab ever opened
    #[default]
    ProtectFirst,
    /// Refuse whenever a single tab remains
    ProtectAny,
    /// Open the default mode as a replacement, then close
    ReplaceWithDefault,
}

impl LastTabPolicy {
    /// Display name for CLI output
    pub fn display_name(&self) -> &'static str {
        match self {
            LastTabPolicy::ProtectFirst => "Protect first tab",
            LastTabPolicy::ProtectAny => "Protect any last tab",
            LastTabPolicy::ReplaceWithDefault => "Replace with default mode",
        }
    }
}

/// Log level for the logging bridge.
///
/// The `TABDECK_LOG` environment variable and the `--log-level` CLI flag take
/// precedence over the configured value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// No logging
    Off,
    /// Errors only
    Error,
    /// Warnings and errors
    Warn,
    /// Informational messages
    #[default]
    Info,
    /// Debug messages
    Debug,
    /// Most verbose
    Trace,
}

impl LogLevel {
    /// Display name for CLI output
    pub fn display_name(&self) -> &'static str {
        match self {
            LogLevel::Off => "Off",
            LogLevel::Error => "Error",
            LogLevel::Warn => "Warn",
            LogLevel::Info => "Info",
            LogLevel::Debug => "Debug",
            LogLevel::Trace => "Trace",
        }
    }

    /// All available levels, least to most verbose
    pub fn all() -> &'static [LogLevel] {
        &[
            LogLevel::Off,
            LogLevel::Error,
            LogLevel::Warn,
            LogLevel::Info,
            LogLevel::Debug,
            LogLevel::Trace,
        ]
    }

    /// Parse a level name case-insensitively (`"warn"`, `"DEBUG"`, ...)
    pub fn parse(name: &str) -> Option<LogLevel> {
        let name = name.trim();
        Self::all()
            .iter()
            .copied()
            .find(|level| level.display_name().eq_ignore_ascii_case(name))
    }

    /// Convert to `log::LevelFilter`
    pub fn to_level_filter(self) -> log::LevelFilter {
        match self {
            LogLevel::Off => log::LevelFilter::Off,
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}
