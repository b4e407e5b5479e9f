//! Error types for the session layer.

use std::io;
use std::path::PathBuf;

use thiserror::Error;
use yt_dialogue::DialogueError;
use yt_json::JsonError;

/// Result type for session operations.
pub type SessionResult<T> = Result<T, SessionError>;

/// Errors that can occur while playing a turn.
///
/// Everything except [`SessionError::InvalidChoice`] aborts the invocation
/// before the autosave is touched.
#[derive(Debug, Error)]
pub enum SessionError {
    /// Input ended before a complete JSON stanza arrived.
    #[error("end of input and not JSON")]
    EndOfInput,

    /// Reading the input stream failed.
    #[error("cannot read input: {0}")]
    Input(#[source] io::Error),

    /// Writing the update document failed.
    #[error("cannot write output: {0}")]
    Output(#[source] io::Error),

    /// The autosave does not match the expected schema.
    #[error("malformed autosave: {0}")]
    MalformedAutosave(String),

    /// A resume was requested but there is no autosave.
    #[error("no saved session at {}", .0.display())]
    SessionNotFound(PathBuf),

    /// The compiled program could not be loaded.
    #[error("cannot load game file {}: {reason}", path.display())]
    GameFile {
        /// Path given on the command line.
        path: PathBuf,
        /// What went wrong.
        reason: String,
    },

    /// Player input that does not select a currently offered option.
    #[error("invalid choice: {0}")]
    InvalidChoice(String),

    /// Filesystem access failed.
    #[error("cannot access {}: {source}", path.display())]
    Io {
        /// File or directory involved.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: io::Error,
    },

    /// The interpreter refused an operation.
    #[error("dialogue error: {0}")]
    Dialogue(#[from] DialogueError),
}

impl From<JsonError> for SessionError {
    fn from(e: JsonError) -> Self {
        SessionError::MalformedAutosave(e.to_string())
    }
}
