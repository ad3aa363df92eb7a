//! Interpreter session state.
//!
//! Exactly one mode is active at a time:
//!
//! | State | Entered by | Left by |
//! |-------|------------|---------|
//! | [`Session::Idle`] | start-up, end of any block | any other state |
//! | [`Session::ActiveCommand`] | a handler calling `start_command` | `..`, or the handler calling `end_command` |
//! | [`Session::RecordingMacro`] | `how to <template>` | `end` |
//! | [`Session::RecordingConstants`] | `in this context` | `end` |
//!
//! There is no terminal state; an interpreter lives as long as its owner.

use std::collections::HashMap;

use crate::constants::PendingScope;
use crate::pattern::Pattern;
use crate::script::Value;

/// Free-form key/value bag owned by an interactive command.
pub type LocalState = HashMap<String, Value>;

/// The interpreter's current interaction mode.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Session {
    #[default]
    Idle,
    /// A command is mid-dialogue; every line goes back to its handler.
    ActiveCommand { command: String, state: LocalState },
    /// Between `how to` and `end`.
    RecordingMacro { pattern: Pattern, lines: Vec<String> },
    /// Between `in this context` and `end`.
    RecordingConstants(PendingScope),
}

impl Session {
    pub fn is_idle(&self) -> bool {
        matches!(self, Session::Idle)
    }

    /// Short name of the state, for logging.
    pub fn label(&self) -> &'static str {
        match self {
            Session::Idle => "idle",
            Session::ActiveCommand { .. } => "active-command",
            Session::RecordingMacro { .. } => "recording-macro",
            Session::RecordingConstants(_) => "recording-constants",
        }
    }

    /// Name of the command holding the dialogue, if any.
    pub fn active_command(&self) -> Option<&str> {
        match self {
            Session::ActiveCommand { command, .. } => Some(command),
            _ => None,
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
