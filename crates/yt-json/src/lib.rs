//! Streaming, token-level JSON for Yarnturn.
//!
//! The autosave file interleaves session bookkeeping with state that belongs
//! to the dialogue interpreter. Both sides walk the same document through a
//! [`TokenCursor`] on the way in and a [`JsonWriter`] on the way out, so the
//! interpreter can pick up (or emit) its part at the exact position the
//! session codec hands it over.

/// Error types for the JSON layer.
pub mod error;
/// Token cursor over a JSON document.
pub mod cursor;
mod lexer;
/// Streaming JSON writer.
pub mod writer;

pub use cursor::{JsonToken, TokenCursor};
pub use error::{JsonError, JsonResult};
pub use writer::JsonWriter;
