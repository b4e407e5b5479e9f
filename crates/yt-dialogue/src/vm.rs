//! Reference bytecode VM.

use yt_json::{JsonError, JsonResult, JsonToken, JsonWriter, TokenCursor};

use crate::error::{DialogueError, DialogueResult};
use crate::interpreter::{DialogueHandler, Interpreter, StepOutcome};
use crate::line::{DialogueOption, Line, OptionId, OptionSet};
use crate::program::{Instruction, Program};
use crate::storage::VariableStore;
use crate::value::Value;

/// Instructions a single [`Interpreter::step`] may run without reaching a
/// line, an option set or the end. Past this the node is treated as a loop.
pub const MAX_INSTRUCTIONS_PER_STEP: usize = 10_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Status {
    Stopped,
    Running,
    AwaitingOption,
}

impl Status {
    fn as_str(self) -> &'static str {
        match self {
            Status::Stopped => "stopped",
            Status::Running => "running",
            Status::AwaitingOption => "awaiting_option",
        }
    }

    fn parse(s: &str) -> Option<Self> {
        match s {
            "stopped" => Some(Status::Stopped),
            "running" => Some(Status::Running),
            "awaiting_option" => Some(Status::AwaitingOption),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
struct PendingOption {
    id: OptionId,
    destination: Option<String>,
}

/// Dialogue runner over a compiled [`Program`].
#[derive(Debug)]
pub struct Dialogue<'p> {
    program: &'p Program,
    node: Option<String>,
    pc: usize,
    status: Status,
    // Options added since the last `show_options`.
    queued: Vec<DialogueOption>,
    // Options delivered and awaiting a selection.
    pending: Vec<PendingOption>,
}

impl<'p> Dialogue<'p> {
    /// Create a stopped dialogue over `program`.
    pub fn new(program: &'p Program) -> Self {
        Self {
            program,
            node: None,
            pc: 0,
            status: Status::Stopped,
            queued: Vec::new(),
            pending: Vec::new(),
        }
    }

    /// The program being run.
    pub fn program(&self) -> &'p Program {
        self.program
    }

    /// Node currently executing, if any.
    pub fn current_node(&self) -> Option<&str> {
        self.node.as_deref()
    }

    fn stop(&mut self) {
        self.status = Status::Stopped;
        self.queued.clear();
        self.pending.clear();
    }

    fn lookup<'a>(&'a self, name: &str, storage: &'a VariableStore) -> Option<&'a Value> {
        storage
            .get(name)
            .or_else(|| self.program.initial_values.get(name))
    }

    fn resolve(
        &self,
        operands: &[String],
        storage: &VariableStore,
        handler: &mut dyn DialogueHandler,
    ) -> Vec<String> {
        operands
            .iter()
            .map(|operand| {
                if !operand.starts_with('$') {
                    return operand.clone();
                }
                match self.lookup(operand, storage) {
                    Some(value) => value.to_string(),
                    None => {
                        handler.on_error(&format!("undefined variable {operand}"));
                        String::new()
                    }
                }
            })
            .collect()
    }

    fn condition_holds(
        &self,
        name: &str,
        storage: &VariableStore,
        handler: &mut dyn DialogueHandler,
    ) -> bool {
        match self.lookup(name, storage) {
            Some(Value::Bool(b)) => *b,
            Some(other) => {
                handler.on_error(&format!(
                    "condition {name} is a {}, expected bool",
                    other.kind()
                ));
                false
            }
            None => {
                handler.on_error(&format!("undefined variable {name}"));
                false
            }
        }
    }
}

impl Interpreter for Dialogue<'_> {
    fn set_node(&mut self, node: &str) -> DialogueResult<()> {
        if !self.program.has_node(node) {
            return Err(DialogueError::NodeNotFound(node.to_string()));
        }
        self.stop();
        self.node = Some(node.to_string());
        self.pc = 0;
        self.status = Status::Running;
        Ok(())
    }

    fn set_selected_option(&mut self, id: OptionId) -> DialogueResult<()> {
        if self.status != Status::AwaitingOption {
            return Err(DialogueError::NotAwaitingOption);
        }
        let chosen = self
            .pending
            .iter()
            .find(|o| o.id == id)
            .cloned()
            .ok_or(DialogueError::OptionNotFound(id))?;

        self.pending.clear();
        if let Some(dest) = chosen.destination {
            self.node = Some(dest);
            self.pc = 0;
        }
        self.status = Status::Running;
        Ok(())
    }

    fn step(
        &mut self,
        storage: &mut VariableStore,
        handler: &mut dyn DialogueHandler,
    ) -> DialogueResult<StepOutcome> {
        match self.status {
            Status::Stopped => return Ok(StepOutcome::Finished),
            Status::AwaitingOption => return Err(DialogueError::AwaitingOption),
            Status::Running => {}
        }

        let program = self.program;
        for _ in 0..MAX_INSTRUCTIONS_PER_STEP {
            let Some(node) = self.node.clone() else {
                self.stop();
                return Ok(StepOutcome::Finished);
            };
            if !program.has_node(&node) {
                handler.on_error(&format!("node {node} does not exist"));
                self.stop();
                return Ok(StepOutcome::Finished);
            }
            let Some(instruction) = program.instruction(&node, self.pc) else {
                self.stop();
                return Ok(StepOutcome::Finished);
            };
            self.pc += 1;

            match instruction {
                Instruction::Line { id, subs } => {
                    let substitutions = self.resolve(subs, storage, handler);
                    handler.on_line(Line {
                        id: id.clone(),
                        substitutions,
                    });
                    return Ok(StepOutcome::Continued);
                }
                Instruction::AddOption {
                    id,
                    subs,
                    dest,
                    condition,
                } => {
                    let is_available = match condition {
                        Some(name) => self.condition_holds(name, storage, handler),
                        None => true,
                    };
                    let substitutions = self.resolve(subs, storage, handler);
                    let option = DialogueOption {
                        id: self.queued.len() as OptionId,
                        line: Line {
                            id: id.clone(),
                            substitutions,
                        },
                        destination: dest.clone(),
                        is_available,
                    };
                    self.queued.push(option);
                }
                Instruction::ShowOptions => {
                    let options = std::mem::take(&mut self.queued);
                    self.pending = options
                        .iter()
                        .map(|o| PendingOption {
                            id: o.id,
                            destination: o.destination.clone(),
                        })
                        .collect();
                    self.status = Status::AwaitingOption;
                    handler.on_options(OptionSet { options });
                    return Ok(StepOutcome::AwaitingOptions);
                }
                Instruction::Jump { node } => {
                    self.node = Some(node.clone());
                    self.pc = 0;
                }
                Instruction::Set { var, value } => {
                    storage.set(var.clone(), value.clone());
                }
                Instruction::Stop => {
                    self.stop();
                    return Ok(StepOutcome::Finished);
                }
            }
        }

        let node = self.node.as_deref().unwrap_or_default();
        handler.on_error(&format!(
            "no line or options after {MAX_INSTRUCTIONS_PER_STEP} instructions in node {node}"
        ));
        self.stop();
        Ok(StepOutcome::Finished)
    }

    fn is_active(&self) -> bool {
        self.status != Status::Stopped
    }

    fn export_state(&self, writer: &mut JsonWriter) {
        writer.start_object();
        writer.property_name("node");
        match &self.node {
            Some(node) => writer.string(node),
            None => writer.null(),
        }
        writer.write_integer("pc", self.pc as i64);
        writer.write_string("status", self.status.as_str());
        writer.property_name("options");
        writer.start_array();
        for option in &self.pending {
            writer.start_object();
            writer.write_integer("id", i64::from(option.id));
            writer.property_name("dest");
            match &option.destination {
                Some(dest) => writer.string(dest),
                None => writer.null(),
            }
            writer.end_object();
        }
        writer.end_array();
        writer.end_object();
    }

    fn import_state(&mut self, cursor: &mut TokenCursor<'_>) -> JsonResult<()> {
        let mut node = None;
        let mut pc = 0;
        let mut status = Status::Stopped;
        let mut pending = Vec::new();

        cursor.read_start_object()?;
        while let Some(key) = cursor.read_property()? {
            match key.as_str() {
                "node" => node = read_optional_string(cursor)?,
                "pc" => {
                    let value = cursor.read_integer()?;
                    pc = usize::try_from(value).map_err(|_| JsonError::Unexpected {
                        expected: "instruction index",
                        found: value.to_string(),
                        offset: cursor.offset(),
                    })?;
                }
                "status" => {
                    let text = cursor.read_string()?;
                    status = Status::parse(&text).ok_or_else(|| JsonError::Unexpected {
                        expected: "dialogue status",
                        found: format!("\"{text}\""),
                        offset: cursor.offset(),
                    })?;
                }
                "options" => pending = read_pending(cursor)?,
                _ => {
                    return Err(JsonError::Unexpected {
                        expected: "dialogue state field",
                        found: format!("property \"{key}\""),
                        offset: cursor.offset(),
                    });
                }
            }
        }

        self.node = node;
        self.pc = pc;
        self.status = status;
        self.queued.clear();
        self.pending = pending;
        Ok(())
    }
}

fn read_optional_string(cursor: &mut TokenCursor<'_>) -> JsonResult<Option<String>> {
    match cursor.next_token()? {
        JsonToken::String(s) => Ok(Some(s)),
        JsonToken::Null => Ok(None),
        other => Err(cursor.mismatch("string or null", &other)),
    }
}

fn read_pending(cursor: &mut TokenCursor<'_>) -> JsonResult<Vec<PendingOption>> {
    let mut pending = Vec::new();
    cursor.read_start_array()?;
    loop {
        match cursor.next_token()? {
            JsonToken::EndArray => break,
            JsonToken::StartObject => {}
            other => return Err(cursor.mismatch("option object", &other)),
        }
        let mut id = None;
        let mut destination = None;
        while let Some(key) = cursor.read_property()? {
            match key.as_str() {
                "id" => {
                    let value = cursor.read_integer()?;
                    id = Some(OptionId::try_from(value).map_err(|_| JsonError::Unexpected {
                        expected: "option id",
                        found: value.to_string(),
                        offset: cursor.offset(),
                    })?);
                }
                "dest" => destination = read_optional_string(cursor)?,
                _ => {
                    return Err(JsonError::Unexpected {
                        expected: "option field",
                        found: format!("property \"{key}\""),
                        offset: cursor.offset(),
                    });
                }
            }
        }
        let id = id.ok_or(JsonError::Unexpected {
            expected: "option id",
            found: "'}'".to_string(),
            offset: cursor.offset(),
        })?;
        pending.push(PendingOption { id, destination });
    }
    Ok(pending)
}
