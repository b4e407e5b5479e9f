//! Persistent session state.

use yt_dialogue::{OptionId, VariableStore};

/// Display surface size reported by the client.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Metrics {
    /// Width in client units.
    pub width: f64,
    /// Height in client units.
    pub height: f64,
}

impl Default for Metrics {
    fn default() -> Self {
        Self {
            width: 80.0,
            height: 24.0,
        }
    }
}

/// An option offered to the player at the end of the latest turn.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingOption {
    /// Interpreter-assigned option number.
    pub id: OptionId,
    /// Display text as shown to the player.
    pub text: String,
}

/// Everything that survives between invocations.
///
/// The interpreter's own position is not held here: it is written into and
/// read back from the autosave by the interpreter itself.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionState {
    /// Narrative turns produced so far.
    pub turn: u32,
    /// Invocations completed so far.
    pub generation: u32,
    /// Client metrics from the start stanza, if it sent any.
    pub metrics: Option<Metrics>,
    /// Options offered by the latest produced turn.
    pub pending_options: Vec<PendingOption>,
    /// Script variables.
    pub storage: VariableStore,
}

impl SessionState {
    /// A brand-new session: generation 0, turn 0, nothing offered.
    pub fn new() -> Self {
        Self::default()
    }

    /// The pending option with this id, if it was offered.
    pub fn pending_option(&self, id: OptionId) -> Option<&PendingOption> {
        self.pending_options.iter().find(|o| o.id == id)
    }
}
