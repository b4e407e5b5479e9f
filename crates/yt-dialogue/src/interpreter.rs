//! The interpreter contract.

use yt_json::{JsonResult, JsonWriter, TokenCursor};

use crate::error::DialogueResult;
use crate::line::{Line, OptionId, OptionSet};
use crate::storage::VariableStore;

/// What a single [`Interpreter::step`] ended with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// A line was delivered; the dialogue is still running.
    Continued,
    /// An option set was delivered; the dialogue waits for a selection.
    AwaitingOptions,
    /// The dialogue has ended.
    Finished,
}

/// Receives what the interpreter produces while stepping.
pub trait DialogueHandler {
    /// A line of dialogue was reached.
    fn on_line(&mut self, line: Line);

    /// An option set was reached.
    fn on_options(&mut self, options: OptionSet);

    /// The script hit a runtime problem. Stepping carries on regardless.
    fn on_error(&mut self, message: &str) {
        log::error!("{message}");
    }
}

/// A narrative interpreter the session can drive one turn at a time.
///
/// The session owns the variable store and hands it in for every step. The
/// interpreter's own position is opaque to the session: it is written into
/// and read back from the autosave by the interpreter itself, at whatever
/// point of the token stream the session's codec has reached.
pub trait Interpreter {
    /// Begin running at the start of `node`.
    fn set_node(&mut self, node: &str) -> DialogueResult<()>;

    /// Answer the pending option set.
    fn set_selected_option(&mut self, id: OptionId) -> DialogueResult<()>;

    /// Run until the next line, option set, or the end of the dialogue.
    fn step(
        &mut self,
        storage: &mut VariableStore,
        handler: &mut dyn DialogueHandler,
    ) -> DialogueResult<StepOutcome>;

    /// Whether the dialogue is running or waiting for a selection.
    fn is_active(&self) -> bool;

    /// Write the interpreter state as one JSON value.
    fn export_state(&self, writer: &mut JsonWriter);

    /// Replace the interpreter state with one JSON value read from `cursor`.
    fn import_state(&mut self, cursor: &mut TokenCursor<'_>) -> JsonResult<()>;
}
