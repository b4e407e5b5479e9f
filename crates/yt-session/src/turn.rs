//! Turn controller.
//!
//! One invocation runs `Init → Fresh | Resuming → Advancing? → Persisted`.
//! A start stanza builds a new session; anything else restores the autosave
//! and is matched against the options the previous turn offered. Only a
//! start or an accepted choice advances the dialogue; every other input is an
//! idle turn that still bumps the generation and rewrites the autosave.

use std::fs;
use std::io::{ErrorKind, Read, Write};
use std::path::Path;

use yt_dialogue::{
    Dialogue, DialogueHandler, Interpreter, Line, OptionSet, Program, StepOutcome,
};

use crate::config::SessionConfig;
use crate::error::{SessionError, SessionResult};
use crate::game::load_program;
use crate::output::{WINDOW_ID, render_update, write_update};
use crate::stanza::{Stanza, read_stanza};
use crate::state::{PendingOption, SessionState};

/// What one invocation produced, before formatting.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TurnResult {
    /// Narrative lines, in emission order.
    pub lines: Vec<String>,
    /// Available options offered at the end of the turn.
    pub options: Vec<PendingOption>,
    /// The dialogue has ended.
    pub story_done: bool,
    /// Text of the option the player just chose, echoed back.
    pub choice_text: Option<String>,
    /// New output is due.
    pub new_turn: bool,
    /// A new input request is due.
    pub new_input: bool,
}

/// Session state and turn result after a completed invocation.
#[derive(Debug, Clone)]
pub struct TurnOutcome {
    /// State as persisted.
    pub state: SessionState,
    /// What the turn produced.
    pub result: TurnResult,
}

enum Advance {
    Start,
    Choice(PendingOption),
}

/// Collects interpreter output for one turn.
#[derive(Default)]
struct Collector {
    lines: Vec<Line>,
    option_sets: Vec<OptionSet>,
}

impl DialogueHandler for Collector {
    fn on_line(&mut self, line: Line) {
        self.lines.push(line);
    }

    fn on_options(&mut self, options: OptionSet) {
        self.option_sets.push(options);
    }
}

/// Plays single turns of one program against one autosave.
pub struct TurnController<'a> {
    program: &'a Program,
    config: &'a SessionConfig,
}

impl<'a> TurnController<'a> {
    /// Create a controller.
    pub fn new(program: &'a Program, config: &'a SessionConfig) -> Self {
        Self { program, config }
    }

    /// Play one turn for `stanza` and persist the result.
    ///
    /// `force_start` starts a fresh session regardless of the stanza.
    pub fn play(&self, stanza: &Stanza, force_start: bool) -> SessionResult<TurnOutcome> {
        let mut dialogue = Dialogue::new(self.program);
        self.play_with(&mut dialogue, stanza, force_start)
    }

    /// Like [`TurnController::play`], driving a caller-supplied interpreter.
    pub fn play_with(
        &self,
        interpreter: &mut dyn Interpreter,
        stanza: &Stanza,
        force_start: bool,
    ) -> SessionResult<TurnOutcome> {
        let start = force_start || stanza.is_start();
        let mut state = if start {
            log::info!("starting a new session");
            let mut state = SessionState::new();
            if let Stanza::Init { metrics } = stanza {
                state.metrics = *metrics;
            }
            state
        } else {
            self.load(interpreter)?
        };

        let advance = if start {
            Some(Advance::Start)
        } else {
            match accept_choice(stanza, &state) {
                Ok(option) => Some(Advance::Choice(option)),
                Err(e) => {
                    log::warn!("{e}; nothing to do this turn");
                    None
                }
            }
        };

        let generation = bump(state.generation, "Gen")?;
        let mut result = TurnResult::default();
        match advance {
            Some(advance) => {
                let turn = bump(state.turn, "Turn")?;
                self.advance(interpreter, &mut state, &mut result, advance)?;
                state.turn = turn;
            }
            // A story can also end on an option set with nothing available,
            // which leaves the interpreter waiting.
            None => {
                result.story_done = !interpreter.is_active()
                    || (state.turn > 0 && state.pending_options.is_empty());
            }
        }
        state.generation = generation;

        self.persist(&state, interpreter)?;
        log::debug!(
            "generation {} turn {}: {} lines, {} options{}",
            state.generation,
            state.turn,
            result.lines.len(),
            result.options.len(),
            if result.story_done { ", story done" } else { "" }
        );
        Ok(TurnOutcome { state, result })
    }

    fn load(&self, interpreter: &mut dyn Interpreter) -> SessionResult<SessionState> {
        let path = self.config.autosave_path();
        let source = match fs::read_to_string(&path) {
            Ok(source) => source,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(SessionError::SessionNotFound(path));
            }
            Err(source) => return Err(SessionError::Io { path, source }),
        };
        SessionState::decode(&source, interpreter)
    }

    fn advance(
        &self,
        interpreter: &mut dyn Interpreter,
        state: &mut SessionState,
        result: &mut TurnResult,
        advance: Advance,
    ) -> SessionResult<()> {
        match advance {
            Advance::Start => interpreter.set_node(&self.config.start_node)?,
            Advance::Choice(option) => {
                interpreter.set_selected_option(option.id)?;
                result.choice_text = Some(option.text);
            }
        }

        let mut collector = Collector::default();
        let awaiting_options = loop {
            match interpreter.step(&mut state.storage, &mut collector)? {
                StepOutcome::Continued if interpreter.is_active() => {}
                StepOutcome::AwaitingOptions => break true,
                StepOutcome::Continued | StepOutcome::Finished => break false,
            }
        };

        for line in &collector.lines {
            result.lines.push(self.program.text_for(line)?);
        }
        for set in &collector.option_sets {
            for option in set.available() {
                result.options.push(PendingOption {
                    id: option.id,
                    text: self.program.text_for(&option.line)?,
                });
            }
        }

        result.story_done = !awaiting_options || result.options.is_empty();
        result.new_turn = true;
        result.new_input = true;
        state.pending_options = result.options.clone();
        Ok(())
    }

    fn persist(&self, state: &SessionState, interpreter: &dyn Interpreter) -> SessionResult<()> {
        let dir = &self.config.autosave_dir;
        fs::create_dir_all(dir).map_err(|source| SessionError::Io {
            path: dir.clone(),
            source,
        })?;
        let path = self.config.autosave_path();
        let text = state.encode(interpreter, self.config.pretty_autosave);
        fs::write(&path, text).map_err(|source| SessionError::Io { path, source })
    }
}

fn bump(counter: u32, key: &str) -> SessionResult<u32> {
    counter.checked_add(1).ok_or_else(|| {
        SessionError::MalformedAutosave(format!("\"{key}\" cannot advance past {counter}"))
    })
}

/// Match a resume stanza against the options the last turn offered.
///
/// Only a `hyperlink` event on the story window whose value is
/// `"<turn>:<option>"` for the current turn and an offered option is
/// accepted.
fn accept_choice(stanza: &Stanza, state: &SessionState) -> SessionResult<PendingOption> {
    let Stanza::Event {
        kind,
        window,
        value,
    } = stanza
    else {
        return Err(SessionError::InvalidChoice("unexpected start stanza".into()));
    };

    if kind != "hyperlink" {
        return Err(SessionError::InvalidChoice(format!("ignoring {kind:?} event")));
    }
    if *window != Some(WINDOW_ID) {
        return Err(SessionError::InvalidChoice(format!(
            "hyperlink for window {window:?}"
        )));
    }
    let value = value
        .as_deref()
        .ok_or_else(|| SessionError::InvalidChoice("hyperlink without a value".into()))?;

    let (turn, option) = value
        .split_once(':')
        .and_then(|(t, o)| Some((t.parse::<u32>().ok()?, o.parse::<u32>().ok()?)))
        .ok_or_else(|| SessionError::InvalidChoice(format!("malformed value {value:?}")))?;

    if turn != state.turn {
        return Err(SessionError::InvalidChoice(format!(
            "stale choice {value:?}, current turn is {}",
            state.turn
        )));
    }
    state
        .pending_option(option)
        .cloned()
        .ok_or_else(|| SessionError::InvalidChoice(format!("option {option} was not offered")))
}

/// Run a whole invocation: load the program, read one stanza from `input`,
/// play the turn, and write the update to `output`.
pub fn run_invocation<R: Read, W: Write>(
    game: &Path,
    config: &SessionConfig,
    force_start: bool,
    input: &mut R,
    output: &mut W,
) -> SessionResult<()> {
    let program = load_program(game)?;
    let doc = read_stanza(input)?;
    let stanza = Stanza::from_value(&doc);

    let outcome = TurnController::new(&program, config).play(&stanza, force_start)?;
    let update = render_update(&outcome.result, &outcome.state);
    write_update(output, &update)
}
