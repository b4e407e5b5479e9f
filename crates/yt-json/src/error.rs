//! Error types for the JSON layer.

use thiserror::Error;

/// Result type for JSON operations.
pub type JsonResult<T> = Result<T, JsonError>;

/// Errors raised while walking a JSON document.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum JsonError {
    /// Bytes that do not form any JSON token.
    #[error("invalid token at byte {offset}")]
    InvalidToken {
        /// Byte offset of the offending input.
        offset: usize,
    },

    /// A string literal with a bad escape sequence.
    #[error("invalid string literal at byte {offset}")]
    InvalidString {
        /// Byte offset of the literal.
        offset: usize,
    },

    /// A well-formed token in the wrong place, or of the wrong kind.
    #[error("expected {expected}, found {found} at byte {offset}")]
    Unexpected {
        /// What the reader was looking for.
        expected: &'static str,
        /// What it got instead.
        found: String,
        /// Byte offset of the token.
        offset: usize,
    },

    /// The input ended inside a document.
    #[error("unexpected end of document")]
    UnexpectedEnd,

    /// Extra tokens after the top-level value.
    #[error("trailing content at byte {offset}")]
    TrailingContent {
        /// Byte offset of the first extra token.
        offset: usize,
    },
}
