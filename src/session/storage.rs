//! File I/O for session persistence
//!
//! The default location comes from [`Config::session_path`], normally
//! `~/.config/tabdeck/last_session.yaml`.

use super::SessionRecord;
use anyhow::{Context, Result};
use std::path::Path;
use tabdeck_config::Config;

/// Save a session record to the location named by `config`
pub fn save_session(config: &Config, record: &SessionRecord) -> Result<()> {
    save_session_to(record, &config.session_path())
}

/// Save a session record to a specific file.
///
/// The file is written next to its destination and renamed into place, so a
/// crash mid-write leaves the previous session intact.
pub fn save_session_to(record: &SessionRecord, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create session directory {:?}", parent))?;
    }

    let contents =
        serde_yaml_ng::to_string(record).context("Failed to serialize session record")?;

    let temp_path = path.with_extension("yaml.tmp");
    std::fs::write(&temp_path, contents)
        .with_context(|| format!("Failed to write session record to {:?}", temp_path))?;
    std::fs::rename(&temp_path, path)
        .with_context(|| format!("Failed to move session record into place at {:?}", path))?;

    log::info!(
        "Saved session ({} tabs) to {:?}",
        record.tabs.len(),
        path
    );
    Ok(())
}

/// Load the session record from the location named by `config`
///
/// Returns `None` if the file doesn't exist or is empty.
/// Returns an error if the file exists but is corrupt.
pub fn load_session(config: &Config) -> Result<Option<SessionRecord>> {
    load_session_from(&config.session_path())
}

/// Load a session record from a specific file
pub fn load_session_from(path: &Path) -> Result<Option<SessionRecord>> {
    if !path.exists() {
        return Ok(None);
    }

    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read session record from {:?}", path))?;

    if contents.trim().is_empty() {
        return Ok(None);
    }

    let record: SessionRecord = serde_yaml_ng::from_str(&contents)
        .with_context(|| format!("Failed to parse session record from {:?}", path))?;

    log::info!(
        "Loaded session ({} tabs, saved {}) from {:?}",
        record.tabs.len(),
        record.saved_at,
        path
    );
    Ok(Some(record))
}

/// Remove the session file named by `config` (e.g., after a successful restore)
pub fn clear_session(config: &Config) -> Result<bool> {
    clear_session_at(&config.session_path())
}

/// Remove a session file. Returns whether there was one to remove.
pub fn clear_session_at(path: &Path) -> Result<bool> {
    if !path.exists() {
        return Ok(false);
    }
    std::fs::remove_file(path)
        .with_context(|| format!("Failed to remove session file {:?}", path))?;
    Ok(true)
}
