//! Token cursor over a JSON document.
//!
//! The cursor validates structure (commas, colons, balanced containers) as it
//! goes and hands out one [`JsonToken`] at a time. Readers that own a nested
//! value take the cursor by `&mut` and consume exactly that value, leaving it
//! positioned for the caller's next property.

use std::fmt;

use logos::Logos;

use crate::error::{JsonError, JsonResult};
use crate::lexer::Lexeme;

/// A structural or scalar JSON token.
#[derive(Debug, Clone, PartialEq)]
pub enum JsonToken {
    /// `{`
    StartObject,
    /// `}`
    EndObject,
    /// `[`
    StartArray,
    /// `]`
    EndArray,
    /// An object key, already unescaped.
    PropertyName(String),
    /// A string value, already unescaped.
    String(String),
    /// A numeric value. Integers are carried as `f64` as well.
    Number(f64),
    /// `true` or `false`.
    Bool(bool),
    /// `null`
    Null,
}

impl fmt::Display for JsonToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JsonToken::StartObject => write!(f, "'{{'"),
            JsonToken::EndObject => write!(f, "'}}'"),
            JsonToken::StartArray => write!(f, "'['"),
            JsonToken::EndArray => write!(f, "']'"),
            JsonToken::PropertyName(name) => write!(f, "property \"{name}\""),
            JsonToken::String(_) => write!(f, "string"),
            JsonToken::Number(n) => write!(f, "number {n}"),
            JsonToken::Bool(b) => write!(f, "{b}"),
            JsonToken::Null => write!(f, "null"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Container {
    Object,
    Array,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Expect {
    /// A value: top level, after a colon, or after a comma in an array.
    Value,
    /// Right after `[`.
    ValueOrEnd,
    /// Right after `{`.
    KeyOrEnd,
    /// After a comma in an object.
    Key,
    /// After a complete value inside a container.
    CommaOrEnd,
    /// The top-level value is complete.
    Done,
}

/// Forward-only reader over one JSON document.
pub struct TokenCursor<'src> {
    lexer: logos::Lexer<'src, Lexeme>,
    stack: Vec<Container>,
    expect: Expect,
    offset: usize,
}

impl<'src> TokenCursor<'src> {
    /// Create a cursor positioned before the first token of `source`.
    pub fn new(source: &'src str) -> Self {
        Self {
            lexer: Lexeme::lexer(source),
            stack: Vec::new(),
            expect: Expect::Value,
            offset: 0,
        }
    }

    /// Byte offset of the most recently read token.
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Nesting depth at the current position (0 outside any container).
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    /// Read the next token.
    pub fn next_token(&mut self) -> JsonResult<JsonToken> {
        loop {
            match self.expect {
                Expect::Done => return Err(JsonError::UnexpectedEnd),
                Expect::Value | Expect::ValueOrEnd => {
                    let lexeme = self.next_lexeme()?;
                    if self.expect == Expect::ValueOrEnd && lexeme == Lexeme::RBracket {
                        return self.close(Container::Array);
                    }
                    return self.value(lexeme);
                }
                Expect::KeyOrEnd | Expect::Key => {
                    let lexeme = self.next_lexeme()?;
                    if self.expect == Expect::KeyOrEnd && lexeme == Lexeme::RBrace {
                        return self.close(Container::Object);
                    }
                    if lexeme != Lexeme::Str {
                        return Err(self.unexpected("property name", lexeme));
                    }
                    let name = self.decode_string()?;
                    let colon = self.next_lexeme()?;
                    if colon != Lexeme::Colon {
                        return Err(self.unexpected("':'", colon));
                    }
                    self.expect = Expect::Value;
                    return Ok(JsonToken::PropertyName(name));
                }
                Expect::CommaOrEnd => {
                    let lexeme = self.next_lexeme()?;
                    let container = self.stack.last().copied();
                    match (lexeme, container) {
                        (Lexeme::Comma, Some(Container::Object)) => self.expect = Expect::Key,
                        (Lexeme::Comma, Some(Container::Array)) => self.expect = Expect::Value,
                        (Lexeme::RBrace, Some(Container::Object)) => {
                            return self.close(Container::Object);
                        }
                        (Lexeme::RBracket, Some(Container::Array)) => {
                            return self.close(Container::Array);
                        }
                        _ => return Err(self.unexpected("',' or end of container", lexeme)),
                    }
                }
            }
        }
    }

    /// Check that nothing but whitespace follows the top-level value.
    pub fn finish(mut self) -> JsonResult<()> {
        if self.expect != Expect::Done {
            return Err(JsonError::UnexpectedEnd);
        }
        match self.lexer.next() {
            None => Ok(()),
            Some(_) => Err(JsonError::TrailingContent {
                offset: self.lexer.span().start,
            }),
        }
    }

    /// Read a `{` token.
    pub fn read_start_object(&mut self) -> JsonResult<()> {
        match self.next_token()? {
            JsonToken::StartObject => Ok(()),
            other => Err(self.mismatch("object", &other)),
        }
    }

    /// Read a `[` token.
    pub fn read_start_array(&mut self) -> JsonResult<()> {
        match self.next_token()? {
            JsonToken::StartArray => Ok(()),
            other => Err(self.mismatch("array", &other)),
        }
    }

    /// Inside an object: the next property name, or `None` at the closing `}`.
    pub fn read_property(&mut self) -> JsonResult<Option<String>> {
        match self.next_token()? {
            JsonToken::PropertyName(name) => Ok(Some(name)),
            JsonToken::EndObject => Ok(None),
            other => Err(self.mismatch("property name", &other)),
        }
    }

    /// Read a string value.
    pub fn read_string(&mut self) -> JsonResult<String> {
        match self.next_token()? {
            JsonToken::String(s) => Ok(s),
            other => Err(self.mismatch("string", &other)),
        }
    }

    /// Read a numeric value.
    pub fn read_number(&mut self) -> JsonResult<f64> {
        match self.next_token()? {
            JsonToken::Number(n) => Ok(n),
            other => Err(self.mismatch("number", &other)),
        }
    }

    /// Read a numeric value that must be a whole number within `i64` range.
    pub fn read_integer(&mut self) -> JsonResult<i64> {
        match self.next_token()? {
            JsonToken::Number(n)
                if n.fract() == 0.0 && n >= i64::MIN as f64 && n <= i64::MAX as f64 =>
            {
                Ok(n as i64)
            }
            other => Err(self.mismatch("integer", &other)),
        }
    }

    /// Read a boolean value.
    pub fn read_bool(&mut self) -> JsonResult<bool> {
        match self.next_token()? {
            JsonToken::Bool(b) => Ok(b),
            other => Err(self.mismatch("boolean", &other)),
        }
    }

    /// Build an `Unexpected` error for a token the caller could not use.
    pub fn mismatch(&self, expected: &'static str, found: &JsonToken) -> JsonError {
        JsonError::Unexpected {
            expected,
            found: found.to_string(),
            offset: self.offset,
        }
    }

    fn value(&mut self, lexeme: Lexeme) -> JsonResult<JsonToken> {
        let token = match lexeme {
            Lexeme::LBrace => {
                self.stack.push(Container::Object);
                self.expect = Expect::KeyOrEnd;
                return Ok(JsonToken::StartObject);
            }
            Lexeme::LBracket => {
                self.stack.push(Container::Array);
                self.expect = Expect::ValueOrEnd;
                return Ok(JsonToken::StartArray);
            }
            Lexeme::Str => JsonToken::String(self.decode_string()?),
            Lexeme::Number => {
                // Overflowing literals parse to infinity, which cannot be written back.
                let n = self
                    .lexer
                    .slice()
                    .parse::<f64>()
                    .ok()
                    .filter(|n| n.is_finite())
                    .ok_or(JsonError::InvalidToken { offset: self.offset })?;
                JsonToken::Number(n)
            }
            Lexeme::True => JsonToken::Bool(true),
            Lexeme::False => JsonToken::Bool(false),
            Lexeme::Null => JsonToken::Null,
            other => return Err(self.unexpected("value", other)),
        };
        self.after_value();
        Ok(token)
    }

    fn close(&mut self, container: Container) -> JsonResult<JsonToken> {
        self.stack.pop();
        self.after_value();
        Ok(match container {
            Container::Object => JsonToken::EndObject,
            Container::Array => JsonToken::EndArray,
        })
    }

    fn after_value(&mut self) {
        self.expect = if self.stack.is_empty() {
            Expect::Done
        } else {
            Expect::CommaOrEnd
        };
    }

    fn next_lexeme(&mut self) -> JsonResult<Lexeme> {
        match self.lexer.next() {
            None => Err(JsonError::UnexpectedEnd),
            Some(result) => {
                self.offset = self.lexer.span().start;
                result.map_err(|_| JsonError::InvalidToken { offset: self.offset })
            }
        }
    }

    fn decode_string(&self) -> JsonResult<String> {
        serde_json::from_str::<String>(self.lexer.slice())
            .map_err(|_| JsonError::InvalidString { offset: self.offset })
    }

    fn unexpected(&self, expected: &'static str, found: Lexeme) -> JsonError {
        JsonError::Unexpected {
            expected,
            found: found.describe().to_string(),
            offset: self.offset,
        }
    }
}
