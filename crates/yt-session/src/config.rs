//! Configuration for a session invocation.

use std::path::{Path, PathBuf};

/// Name of the autosave file inside the autosave directory.
pub const AUTOSAVE_FILE: &str = "autosave.json";

/// Configuration for one turn.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Directory holding the autosave file.
    pub autosave_dir: PathBuf,
    /// Node a fresh session starts at.
    pub start_node: String,
    /// Write the autosave indented rather than compact.
    pub pretty_autosave: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            autosave_dir: PathBuf::from("."),
            start_node: "Start".to_string(),
            pretty_autosave: true,
        }
    }
}

impl SessionConfig {
    /// Set the autosave directory.
    pub fn with_autosave_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.autosave_dir = dir.as_ref().to_path_buf();
        self
    }

    /// Set the start node.
    pub fn with_start_node(mut self, node: impl Into<String>) -> Self {
        self.start_node = node.into();
        self
    }

    /// Choose indented or compact autosave output.
    pub fn with_pretty_autosave(mut self, pretty: bool) -> Self {
        self.pretty_autosave = pretty;
        self
    }

    /// Full path of the autosave file.
    pub fn autosave_path(&self) -> PathBuf {
        self.autosave_dir.join(AUTOSAVE_FILE)
    }
}
