//! Dialogue interpreter for Yarnturn.
//!
//! The session layer only talks to the [`Interpreter`] trait: select a start
//! node, step until the dialogue pauses or ends, feed back the player's
//! option, and export/import the interpreter's own state through the shared
//! `yt-json` token stream. [`Dialogue`] is a small bytecode VM implementing
//! that contract over a compiled [`Program`].

/// Error types for the dialogue engine.
pub mod error;
/// The interpreter contract.
pub mod interpreter;
/// Lines, options and positional text formatting.
pub mod line;
/// Compiled program documents.
pub mod program;
/// Variable storage owned by the session.
pub mod storage;
/// Variable values.
pub mod value;
/// Reference bytecode VM.
pub mod vm;

pub use error::{DialogueError, DialogueResult};
pub use interpreter::{DialogueHandler, Interpreter, StepOutcome};
pub use line::{DialogueOption, Line, OptionId, OptionSet, format_positional};
pub use program::{Instruction, Program};
pub use storage::VariableStore;
pub use value::Value;
pub use vm::Dialogue;
