//! Reading and classifying the player's input stanza.

use std::io::{ErrorKind, Read};

use serde_json::Value;

use crate::error::{SessionError, SessionResult};
use crate::state::Metrics;

/// Bytes requested from the input stream per read.
pub const CHUNK_SIZE: usize = 256;

/// Read the first complete JSON document from `reader`.
///
/// Input is consumed in [`CHUNK_SIZE`] reads, and each read is split after
/// every linefeed. After each piece is appended, everything buffered so far
/// is parsed; the first success wins and any bytes after it are dropped. A
/// failed parse keeps the buffer and waits for more, so documents spanning
/// several lines or several reads work.
///
/// Known limitation: the buffer is never resynchronised. If the leading
/// bytes can never become valid JSON, the reader keeps consuming until the
/// stream ends and then fails with [`SessionError::EndOfInput`]. Callers
/// that need bounded latency must put a timeout around the whole process.
pub fn read_stanza<R: Read>(reader: &mut R) -> SessionResult<Value> {
    let mut chunk = [0u8; CHUNK_SIZE];
    let mut buf = Vec::new();

    loop {
        let len = match reader.read(&mut chunk) {
            Ok(0) => return Err(SessionError::EndOfInput),
            Ok(len) => len,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(SessionError::Input(e)),
        };

        for piece in chunk[..len].split_inclusive(|b| *b == b'\n') {
            buf.extend_from_slice(piece);
            match serde_json::from_slice(&buf) {
                Ok(doc) => return Ok(doc),
                Err(e) => log::trace!("stanza incomplete after {} bytes: {e}", buf.len()),
            }
        }
    }
}

/// A classified input stanza.
#[derive(Debug, Clone, PartialEq)]
pub enum Stanza {
    /// Session start. Carries the client's metrics when it sent usable ones.
    Init {
        /// Display size, if present and well-formed.
        metrics: Option<Metrics>,
    },
    /// Any other client event.
    Event {
        /// The event's `type` field (empty when missing).
        kind: String,
        /// Target window id, when present and integral.
        window: Option<i64>,
        /// The event's `value` field, when it is a string.
        value: Option<String>,
    },
}

impl Stanza {
    /// Classify a parsed input document.
    ///
    /// A document is a start stanza when its `type` is `init`, or when it has
    /// no `type` at all but carries a `metrics` object. Typed events that
    /// also report metrics (`arrange` after a resize) are ordinary events.
    pub fn from_value(doc: &Value) -> Self {
        let kind = doc.get("type").and_then(Value::as_str);

        if kind == Some("init") || (kind.is_none() && doc.get("metrics").is_some()) {
            let metrics = doc.get("metrics").and_then(parse_metrics);
            if metrics.is_none() {
                log::warn!("start stanza without usable metrics");
            }
            return Stanza::Init { metrics };
        }

        Stanza::Event {
            kind: kind.unwrap_or_default().to_string(),
            window: doc.get("window").and_then(Value::as_i64),
            value: doc.get("value").and_then(Value::as_str).map(str::to_string),
        }
    }

    /// Whether this stanza starts a new session.
    pub fn is_start(&self) -> bool {
        matches!(self, Stanza::Init { .. })
    }
}

fn parse_metrics(metrics: &Value) -> Option<Metrics> {
    let width = metrics.get("width")?.as_f64()?;
    let height = metrics.get("height")?.as_f64()?;
    Some(Metrics { width, height })
}
