//! Command routing to the selected tab's mode.
//!
//! Commands are opaque names. The engine never interprets them; it only asks
//! the current tab's mode whether it knows the command, whether it is enabled
//! right now, and finally hands it over for execution.

use super::TabEngine;
use crate::error::{EngineError, EngineResult};
use crate::registry::ModeEntry;
use crate::tab::TabId;
use std::rc::Rc;

/// What happened to a routed command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandOutcome {
    /// The mode executed the command
    Executed,
    /// The mode supports the command but it is disabled right now
    Disabled,
    /// No tab is selected, or its mode does not handle the command
    Unsupported,
}

impl TabEngine {
    /// Whether the selected tab's mode handles `command` at all
    pub fn supports_command(&self, command: &str) -> bool {
        let Some((_, tab_mode)) = self.current_mode() else {
            return false;
        };
        let Some(tab) = self.tabs.active_tab() else {
            return false;
        };
        tab_mode
            .descriptor()
            .supports_command
            .as_ref()
            .is_some_and(|hook| hook(command, tab))
    }

    /// Whether `command` is supported and currently enabled on the selected tab.
    ///
    /// A mode without an enabled-check hook reports every command as disabled.
    pub fn is_command_enabled(&self, command: &str) -> bool {
        if !self.supports_command(command) {
            return false;
        }
        let (Some((_, tab_mode)), Some(tab)) = (self.current_mode(), self.tabs.active_tab()) else {
            return false;
        };
        tab_mode
            .descriptor()
            .is_command_enabled
            .as_ref()
            .is_some_and(|hook| hook(command, tab))
    }

    /// Execute `command` on the selected tab if it is supported and enabled.
    ///
    /// Unsupported and disabled commands are not errors; only a failing
    /// command hook is.
    pub fn do_command(&mut self, command: &str) -> EngineResult<CommandOutcome> {
        let Some((id, tab_mode)) = self.current_mode() else {
            log::debug!("Command '{}' ignored: no tab selected", command);
            return Ok(CommandOutcome::Unsupported);
        };
        if !self.supports_command(command) {
            return Ok(CommandOutcome::Unsupported);
        }
        if !self.is_command_enabled(command) {
            log::debug!("Command '{}' is disabled on tab {}", command, id);
            return Ok(CommandOutcome::Disabled);
        }
        let Some(hook) = tab_mode.descriptor().do_command.clone() else {
            log::warn!(
                "Mode '{}' enables '{}' but has no do_command hook",
                tab_mode.name(),
                command
            );
            return Ok(CommandOutcome::Unsupported);
        };
        let Some(tab) = self.tabs.get_mut(id) else {
            return Err(EngineError::TabNotFound(id));
        };

        hook(command, tab).map_err(|err| EngineError::from_hook(tab_mode.name(), "do_command", err))?;
        log::debug!("Executed command '{}' on tab {}", command, id);
        Ok(CommandOutcome::Executed)
    }

    fn current_mode(&self) -> Option<(TabId, Rc<ModeEntry>)> {
        let id = self.tabs.active_tab_id()?;
        let mode = self.mode_of(id).ok()?;
        Some((id, mode))
    }
}
