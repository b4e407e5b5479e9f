//! Compiled program documents.

use std::collections::HashMap;

use serde::Deserialize;

use crate::error::{DialogueError, DialogueResult};
use crate::line::{Line, format_positional};
use crate::value::Value;

/// A compiled dialogue program: a string table, default variable values and
/// named nodes of instructions.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Program {
    /// Line id → display text with positional markers.
    #[serde(default)]
    pub strings: HashMap<String, String>,
    /// Values used for variables the session has not stored yet.
    #[serde(default)]
    pub initial_values: HashMap<String, Value>,
    /// Node name → instruction list.
    pub nodes: HashMap<String, Vec<Instruction>>,
}

/// One VM instruction.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Instruction {
    /// Deliver a line and pause.
    Line {
        /// String-table id.
        id: String,
        /// Substitution operands: `$name` reads a variable, anything else is
        /// a literal.
        #[serde(default)]
        subs: Vec<String>,
    },
    /// Queue an option for the next `show_options`.
    #[serde(rename = "option")]
    AddOption {
        /// String-table id of the option text.
        id: String,
        /// Substitution operands, as for `line`.
        #[serde(default)]
        subs: Vec<String>,
        /// Node to jump to when chosen.
        #[serde(default)]
        dest: Option<String>,
        /// Boolean variable that must be true for the option to be available.
        #[serde(default)]
        condition: Option<String>,
    },
    /// Deliver the queued options and wait for a selection.
    ShowOptions,
    /// Continue at the start of another node.
    Jump {
        /// Target node.
        node: String,
    },
    /// Store a value in a variable.
    Set {
        /// Variable name.
        var: String,
        /// Value to store.
        value: Value,
    },
    /// End the dialogue.
    Stop,
}

impl Program {
    /// Parse a compiled program document.
    pub fn from_json(source: &str) -> DialogueResult<Self> {
        serde_json::from_str(source).map_err(|e| DialogueError::InvalidProgram(e.to_string()))
    }

    /// Whether a node with this name exists.
    pub fn has_node(&self, name: &str) -> bool {
        self.nodes.contains_key(name)
    }

    /// Instruction at `pc` in `node`, if both exist.
    pub fn instruction(&self, node: &str, pc: usize) -> Option<&Instruction> {
        self.nodes.get(node).and_then(|n| n.get(pc))
    }

    /// Display text for a delivered line, with substitutions applied.
    pub fn text_for(&self, line: &Line) -> DialogueResult<String> {
        let template = self
            .strings
            .get(&line.id)
            .ok_or_else(|| DialogueError::StringNotFound(line.id.clone()))?;
        Ok(format_positional(template, &line.substitutions))
    }
}
