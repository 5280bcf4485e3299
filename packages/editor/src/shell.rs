//! Editor shell glue: keyboard shortcuts and the navigate-away guard.

use crate::document::{DocumentStore, SaveOutcome};
use crate::errors::EditorResult;
use crate::sync::SyncController;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorCommand {
    Save,
    Undo,
    Redo,
}

/// A key press with its modifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct KeyChord {
    pub key: char,
    pub ctrl: bool,
    /// Cmd on macOS
    pub meta: bool,
    pub shift: bool,
    pub alt: bool,
}

impl KeyChord {
    pub fn new(key: char) -> Self {
        Self {
            key,
            ..Default::default()
        }
    }

    pub fn ctrl(mut self) -> Self {
        self.ctrl = true;
        self
    }

    pub fn meta(mut self) -> Self {
        self.meta = true;
        self
    }

    pub fn shift(mut self) -> Self {
        self.shift = true;
        self
    }

    pub fn alt(mut self) -> Self {
        self.alt = true;
        self
    }
}

/// Ctrl/Cmd+S save, Ctrl/Cmd+Z undo, Ctrl/Cmd+Shift+Z or Ctrl/Cmd+Y redo
pub fn command_for(chord: KeyChord) -> Option<EditorCommand> {
    if !(chord.ctrl || chord.meta) || chord.alt {
        return None;
    }

    match (chord.key.to_ascii_lowercase(), chord.shift) {
        ('s', false) => Some(EditorCommand::Save),
        ('z', false) => Some(EditorCommand::Undo),
        ('z', true) | ('y', false) => Some(EditorCommand::Redo),
        _ => None,
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum CommandOutcome {
    Saved(SaveOutcome),
    /// Undo or redo; false when there was nothing to step to
    Stepped(bool),
}

/// Run a shortcut command. Saves are not versioned.
pub async fn run_command(controller: &SyncController, command: EditorCommand) -> EditorResult<CommandOutcome> {
    debug!(?command, "shortcut");
    match command {
        EditorCommand::Save => controller.save_now(false, None).await.map(CommandOutcome::Saved),
        EditorCommand::Undo => Ok(CommandOutcome::Stepped(controller.store().lock().await.undo())),
        EditorCommand::Redo => Ok(CommandOutcome::Stepped(controller.store().lock().await.redo())),
    }
}

/// Blocks navigation away from the editor while there are unsaved changes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NavigationGuard {
    active: bool,
}

impl NavigationGuard {
    pub const PROMPT: &'static str = "You have unsaved changes. Leave anyway?";

    pub fn for_store(store: &DocumentStore) -> Self {
        Self {
            active: store.page().is_some() && store.is_dirty(),
        }
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Prompt to show, if navigation should be confirmed
    pub fn prompt(&self) -> Option<&'static str> {
        self.active.then_some(Self::PROMPT)
    }
}

pub fn should_block_navigation(store: &DocumentStore) -> bool {
    NavigationGuard::for_store(store).is_active()
}
