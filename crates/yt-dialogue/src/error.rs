//! Error types for the dialogue engine.

use thiserror::Error;

use crate::line::OptionId;

/// Result type for dialogue operations.
pub type DialogueResult<T> = Result<T, DialogueError>;

/// Hard errors raised by the interpreter.
///
/// Problems inside a running script (unknown variables, bad jump targets) are
/// not errors at this level; they go to [`crate::DialogueHandler::on_error`].
#[derive(Debug, Error)]
pub enum DialogueError {
    /// The compiled program document could not be parsed.
    #[error("invalid program: {0}")]
    InvalidProgram(String),

    /// Requested start node does not exist.
    #[error("node not found: {0}")]
    NodeNotFound(String),

    /// A line id missing from the program's string table.
    #[error("no text for line id: {0}")]
    StringNotFound(String),

    /// An option id that was not part of the pending option set.
    #[error("option not found: {0}")]
    OptionNotFound(OptionId),

    /// An option was selected while no option set was pending.
    #[error("dialogue is not waiting for an option")]
    NotAwaitingOption,

    /// Stepping was requested while an option set is still unanswered.
    #[error("dialogue is waiting for an option to be selected")]
    AwaitingOption,
}
