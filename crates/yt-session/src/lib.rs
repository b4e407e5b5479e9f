//! Single-turn session protocol for Yarnturn.
//!
//! Every process invocation plays exactly one turn: read a JSON stanza,
//! restore the session from its autosave (or start fresh), advance the
//! dialogue if the input warrants it, write the autosave back, and render a
//! GlkOte-style update document describing what changed.

/// Autosave encoding and decoding.
pub mod autosave;
/// Configuration for a session invocation.
pub mod config;
/// Error types for the session layer.
pub mod error;
/// Loading compiled game files.
pub mod game;
/// Update document formatting.
pub mod output;
/// Reading and classifying the player's input stanza.
pub mod stanza;
/// Persistent session state.
pub mod state;
/// The turn controller and whole-invocation driver.
pub mod turn;

pub use config::SessionConfig;
pub use error::{SessionError, SessionResult};
pub use game::load_program;
pub use output::{render_update, write_update};
pub use stanza::{Stanza, read_stanza};
pub use state::{Metrics, PendingOption, SessionState};
pub use turn::{TurnController, TurnOutcome, TurnResult, run_invocation};
