//! Loading the compiled program named on the command line.

use std::fs;
use std::path::Path;

use yt_dialogue::Program;

use crate::error::{SessionError, SessionResult};

/// Read and parse a compiled program document.
pub fn load_program(path: &Path) -> SessionResult<Program> {
    let game_error = |reason: String| SessionError::GameFile {
        path: path.to_path_buf(),
        reason,
    };
    let source = fs::read_to_string(path).map_err(|e| game_error(e.to_string()))?;
    let program = Program::from_json(&source).map_err(|e| game_error(e.to_string()))?;
    log::debug!(
        "loaded {} with {} nodes",
        path.display(),
        program.nodes.len()
    );
    Ok(program)
}
