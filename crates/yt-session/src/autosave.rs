//! Autosave codec.
//!
//! The autosave is a single JSON object walked token by token rather than
//! mapped through serde, because its `State` member belongs to the
//! interpreter: the codec hands the shared cursor (or writer) over at that
//! point and takes it back once the interpreter has consumed (or produced)
//! exactly one value.
//!
//! Keys are accepted in any order on read and always written in this order:
//! `Turn`, `Gen`, `MetricsWidth`, `MetricsHeight`, `OutOptions`, `Storage`,
//! `State`. Consumers may rely on that order. The schema is closed: an
//! unknown key is an error, not something to skip.

use std::collections::HashSet;

use yt_dialogue::{Interpreter, OptionId, Value, VariableStore};
use yt_json::{JsonToken, JsonWriter, TokenCursor};

use crate::error::{SessionError, SessionResult};
use crate::state::{Metrics, PendingOption, SessionState};

const TURN: &str = "Turn";
const GEN: &str = "Gen";
const METRICS_WIDTH: &str = "MetricsWidth";
const METRICS_HEIGHT: &str = "MetricsHeight";
const OUT_OPTIONS: &str = "OutOptions";
const STORAGE: &str = "Storage";
const STATE: &str = "State";

fn malformed(message: impl Into<String>) -> SessionError {
    SessionError::MalformedAutosave(message.into())
}

impl SessionState {
    /// Decode an autosave document, importing the interpreter's state into
    /// `interpreter` along the way.
    pub fn decode(source: &str, interpreter: &mut dyn Interpreter) -> SessionResult<Self> {
        let mut cursor = TokenCursor::new(source);
        cursor.read_start_object()?;

        let mut seen = HashSet::new();
        let mut turn = None;
        let mut generation = None;
        let mut width = None;
        let mut height = None;
        let mut pending_options = Vec::new();
        let mut storage = None;
        let mut has_state = false;

        while let Some(key) = cursor.read_property()? {
            if !seen.insert(key.clone()) {
                return Err(malformed(format!("duplicate key \"{key}\"")));
            }
            match key.as_str() {
                TURN => turn = Some(read_counter(&mut cursor, TURN)?),
                GEN => generation = Some(read_counter(&mut cursor, GEN)?),
                METRICS_WIDTH => width = Some(cursor.read_number()?),
                METRICS_HEIGHT => height = Some(cursor.read_number()?),
                OUT_OPTIONS => pending_options = read_options(&mut cursor)?,
                STORAGE => storage = Some(read_storage(&mut cursor)?),
                STATE => {
                    interpreter
                        .import_state(&mut cursor)
                        .map_err(|e| malformed(format!("State: {e}")))?;
                    has_state = true;
                }
                other => return Err(malformed(format!("unknown key \"{other}\""))),
            }
        }
        cursor.finish()?;

        let metrics = match (width, height) {
            (Some(width), Some(height)) => Some(Metrics { width, height }),
            (None, None) => None,
            _ => {
                return Err(malformed(format!(
                    "{METRICS_WIDTH} and {METRICS_HEIGHT} must appear together"
                )));
            }
        };
        if !has_state {
            return Err(malformed(format!("missing \"{STATE}\"")));
        }

        Ok(Self {
            turn: turn.ok_or_else(|| malformed(format!("missing \"{TURN}\"")))?,
            generation: generation.ok_or_else(|| malformed(format!("missing \"{GEN}\"")))?,
            metrics,
            pending_options,
            storage: storage.ok_or_else(|| malformed(format!("missing \"{STORAGE}\"")))?,
        })
    }

    /// Encode the session and the interpreter's state as an autosave
    /// document, terminated by a newline.
    pub fn encode(&self, interpreter: &dyn Interpreter, pretty: bool) -> String {
        let mut writer = if pretty {
            JsonWriter::pretty()
        } else {
            JsonWriter::new()
        };

        writer.start_object();
        writer.write_integer(TURN, i64::from(self.turn));
        writer.write_integer(GEN, i64::from(self.generation));
        if let Some(metrics) = &self.metrics {
            writer.write_number(METRICS_WIDTH, metrics.width);
            writer.write_number(METRICS_HEIGHT, metrics.height);
        }
        if !self.pending_options.is_empty() {
            writer.property_name(OUT_OPTIONS);
            write_options(&mut writer, &self.pending_options);
        }
        writer.property_name(STORAGE);
        write_storage(&mut writer, &self.storage);
        writer.property_name(STATE);
        interpreter.export_state(&mut writer);
        writer.end_object();

        let mut text = writer.into_string();
        text.push('\n');
        text
    }
}

fn read_counter(cursor: &mut TokenCursor<'_>, key: &str) -> SessionResult<u32> {
    let value = cursor.read_integer()?;
    u32::try_from(value).map_err(|_| malformed(format!("\"{key}\" out of range: {value}")))
}

fn read_options(cursor: &mut TokenCursor<'_>) -> SessionResult<Vec<PendingOption>> {
    let mut options = Vec::new();
    cursor.read_start_array()?;
    loop {
        match cursor.next_token()? {
            JsonToken::EndArray => break,
            JsonToken::StartObject => {}
            other => return Err(cursor.mismatch("option record", &other).into()),
        }

        let mut id = None;
        let mut text = None;
        while let Some(key) = cursor.read_property()? {
            match key.as_str() {
                "index" => {
                    let value = cursor.read_integer()?;
                    id = Some(OptionId::try_from(value).map_err(|_| {
                        malformed(format!("option index out of range: {value}"))
                    })?);
                }
                "text" => text = Some(cursor.read_string()?),
                other => return Err(malformed(format!("unknown option key \"{other}\""))),
            }
        }

        match (id, text) {
            (Some(id), Some(text)) => options.push(PendingOption { id, text }),
            _ => return Err(malformed("option record needs \"index\" and \"text\"")),
        }
    }
    Ok(options)
}

fn write_options(writer: &mut JsonWriter, options: &[PendingOption]) {
    writer.start_array();
    for option in options {
        writer.start_object();
        writer.write_integer("index", i64::from(option.id));
        writer.write_string("text", &option.text);
        writer.end_object();
    }
    writer.end_array();
}

/// Read a variable-store object. Each member's token kind decides its value
/// kind; whole numbers become floats like any other number.
fn read_storage(cursor: &mut TokenCursor<'_>) -> SessionResult<VariableStore> {
    let mut store = VariableStore::new();
    cursor.read_start_object()?;
    while let Some(name) = cursor.read_property()? {
        match cursor.next_token()? {
            JsonToken::String(s) => store.set_string(name, s),
            JsonToken::Number(n) => store.set_number(name, n),
            JsonToken::Bool(b) => store.set_bool(name, b),
            other => {
                return Err(malformed(format!(
                    "{STORAGE}: variable \"{name}\" holds {other}"
                )));
            }
        }
    }
    Ok(store)
}

fn write_storage(writer: &mut JsonWriter, store: &VariableStore) {
    writer.start_object();
    for (name, value) in store.iter() {
        match value {
            Value::String(s) => writer.write_string(name, s),
            Value::Number(n) => writer.write_number(name, *n),
            Value::Bool(b) => writer.write_bool(name, *b),
        }
    }
    writer.end_object();
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use yt_dialogue::{Dialogue, DialogueHandler, Line, OptionSet, Program};

    struct Quiet;

    impl DialogueHandler for Quiet {
        fn on_line(&mut self, _line: Line) {}
        fn on_options(&mut self, _options: OptionSet) {}
    }

    fn program() -> Program {
        Program::from_json(
            r#"{"nodes": {"Start": [
                {"op": "line", "id": "a"},
                {"op": "option", "id": "b", "dest": "Start"},
                {"op": "show_options"}
            ]}}"#,
        )
        .unwrap()
    }

    fn sample_state() -> SessionState {
        let mut storage = VariableStore::new();
        storage.set_string("$name", "Mara \"the bold\"");
        storage.set_number("$gold", 12.0);
        storage.set_number("$ratio", 0.25);
        storage.set_bool("$met", true);
        SessionState {
            turn: 4,
            generation: 9,
            metrics: Some(Metrics {
                width: 80.0,
                height: 24.0,
            }),
            pending_options: vec![
                PendingOption {
                    id: 0,
                    text: "Go left".into(),
                },
                PendingOption {
                    id: 3,
                    text: "Wait".into(),
                },
            ],
            storage,
        }
    }

    fn paused_dialogue(program: &Program) -> Dialogue<'_> {
        let mut dialogue = Dialogue::new(program);
        let mut storage = VariableStore::new();
        dialogue.set_node("Start").unwrap();
        while dialogue.step(&mut storage, &mut Quiet).unwrap() == yt_dialogue::StepOutcome::Continued
        {}
        dialogue
    }

    #[test]
    fn writes_keys_in_contract_order() {
        let program = program();
        let dialogue = paused_dialogue(&program);
        let text = sample_state().encode(&dialogue, false);

        let positions: Vec<usize> = [
            "\"Turn\"",
            "\"Gen\"",
            "\"MetricsWidth\"",
            "\"MetricsHeight\"",
            "\"OutOptions\"",
            "\"Storage\"",
            "\"State\"",
        ]
        .iter()
        .map(|k| text.find(k).unwrap())
        .collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]));
        assert!(text.ends_with("}\n"));
    }

    #[test]
    fn compact_encoding_is_exact() {
        let program = program();
        let dialogue = Dialogue::new(&program);
        let state = SessionState {
            turn: 1,
            generation: 2,
            ..SessionState::new()
        };
        assert_eq!(
            state.encode(&dialogue, false),
            "{\"Turn\":1,\"Gen\":2,\"Storage\":{},\"State\":{\"node\":null,\"pc\":0,\"status\":\"stopped\",\"options\":[]}}\n"
        );
    }

    #[test]
    fn round_trip_preserves_everything() {
        let program = program();
        let dialogue = paused_dialogue(&program);
        let state = sample_state();

        let first = state.encode(&dialogue, true);
        let mut restored = Dialogue::new(&program);
        let decoded = SessionState::decode(&first, &mut restored).unwrap();
        assert_eq!(decoded, state);
        assert_eq!(decoded.encode(&restored, true), first);
    }

    #[test]
    fn keys_in_any_order() {
        let program = program();
        let mut dialogue = Dialogue::new(&program);
        let source = r#"{
            "State": {"node": "Start", "pc": 3, "status": "awaiting_option", "options": [{"id": 0, "dest": "Start"}]},
            "Storage": {"$count": 2},
            "Gen": 5,
            "Turn": 2
        }"#;
        let state = SessionState::decode(source, &mut dialogue).unwrap();
        assert_eq!(state.turn, 2);
        assert_eq!(state.generation, 5);
        assert_eq!(state.metrics, None);
        assert!(state.pending_options.is_empty());
        assert_eq!(state.storage.get("$count"), Some(&Value::Number(2.0)));
        assert!(dialogue.is_active());
    }

    fn decode_err(source: &str) -> String {
        let program = program();
        let mut dialogue = Dialogue::new(&program);
        match SessionState::decode(source, &mut dialogue) {
            Err(SessionError::MalformedAutosave(msg)) => msg,
            other => panic!("expected MalformedAutosave, got {other:?}"),
        }
    }

    const STATE_JSON: &str = r#"{"node": null, "pc": 0, "status": "stopped", "options": []}"#;

    #[test]
    fn unknown_key_is_rejected() {
        let msg = decode_err(&format!(
            r#"{{"Turn": 1, "Gen": 1, "Storage": {{}}, "State": {STATE_JSON}, "Extra": 1}}"#
        ));
        assert!(msg.contains("unknown key \"Extra\""));
    }

    #[test]
    fn non_object_root_is_rejected() {
        decode_err("[1, 2]");
        decode_err("\"Turn\"");
    }

    #[test]
    fn wrong_types_are_rejected() {
        decode_err(&format!(
            r#"{{"Turn": "1", "Gen": 1, "Storage": {{}}, "State": {STATE_JSON}}}"#
        ));
        decode_err(&format!(
            r#"{{"Turn": 1.5, "Gen": 1, "Storage": {{}}, "State": {STATE_JSON}}}"#
        ));
        decode_err(&format!(
            r#"{{"Turn": -1, "Gen": 1, "Storage": {{}}, "State": {STATE_JSON}}}"#
        ));
        decode_err(&format!(
            r#"{{"Turn": 1, "Gen": 1, "Storage": {{"$x": null}}, "State": {STATE_JSON}}}"#
        ));
        decode_err(&format!(
            r#"{{"Turn": 1, "Gen": 1, "Storage": {{"$x": [1]}}, "State": {STATE_JSON}}}"#
        ));
    }

    #[test]
    fn missing_required_keys_are_rejected() {
        assert!(decode_err(r#"{"Turn": 1, "Gen": 1, "Storage": {}}"#).contains("State"));
        assert!(
            decode_err(&format!(r#"{{"Gen": 1, "Storage": {{}}, "State": {STATE_JSON}}}"#))
                .contains("Turn")
        );
        assert!(
            decode_err(&format!(r#"{{"Turn": 1, "Gen": 1, "State": {STATE_JSON}}}"#))
                .contains("Storage")
        );
    }

    #[test]
    fn half_a_metrics_pair_is_rejected() {
        let msg = decode_err(&format!(
            r#"{{"Turn": 1, "Gen": 1, "MetricsWidth": 80, "Storage": {{}}, "State": {STATE_JSON}}}"#
        ));
        assert!(msg.contains("together"));
    }

    #[test]
    fn duplicate_key_is_rejected() {
        let msg = decode_err(&format!(
            r#"{{"Turn": 1, "Turn": 2, "Gen": 1, "Storage": {{}}, "State": {STATE_JSON}}}"#
        ));
        assert!(msg.contains("duplicate"));
    }

    #[test]
    fn bad_option_records_are_rejected() {
        decode_err(&format!(
            r#"{{"Turn": 1, "Gen": 1, "OutOptions": [{{"index": 0}}], "Storage": {{}}, "State": {STATE_JSON}}}"#
        ));
        decode_err(&format!(
            r#"{{"Turn": 1, "Gen": 1, "OutOptions": ["Go"], "Storage": {{}}, "State": {STATE_JSON}}}"#
        ));
    }

    #[test]
    fn interpreter_state_errors_surface_as_malformed() {
        let msg = decode_err(r#"{"Turn": 1, "Gen": 1, "Storage": {}, "State": {"status": "dancing"}}"#);
        assert!(msg.starts_with("State:"));
    }

    #[test]
    fn trailing_content_is_rejected() {
        decode_err(&format!(
            r#"{{"Turn": 1, "Gen": 1, "Storage": {{}}, "State": {STATE_JSON}}} {{}}"#
        ));
    }

    fn arb_value() -> impl Strategy<Value = Value> {
        prop_oneof![
            any::<bool>().prop_map(Value::Bool),
            (-1.0e9f64..1.0e9).prop_map(Value::Number),
            "\\PC{0,12}".prop_map(Value::String),
        ]
    }

    fn arb_state() -> impl Strategy<Value = SessionState> {
        (
            any::<u32>(),
            any::<u32>(),
            proptest::option::of((0.0f64..500.0, 0.0f64..500.0)),
            proptest::collection::vec((any::<u32>(), "\\PC{0,16}"), 0..4),
            proptest::collection::btree_map("\\$[a-z_]{1,8}", arb_value(), 0..6),
        )
            .prop_map(|(turn, generation, metrics, options, vars)| {
                let mut storage = VariableStore::new();
                for (name, value) in vars {
                    storage.set(name, value);
                }
                SessionState {
                    turn,
                    generation,
                    metrics: metrics.map(|(width, height)| Metrics { width, height }),
                    pending_options: options
                        .into_iter()
                        .map(|(id, text)| PendingOption { id, text })
                        .collect(),
                    storage,
                }
            })
    }

    proptest! {
        #[test]
        fn decode_inverts_encode(state in arb_state(), pretty in any::<bool>()) {
            let program = program();
            let dialogue = paused_dialogue(&program);
            let text = state.encode(&dialogue, pretty);

            let mut restored = Dialogue::new(&program);
            let decoded = SessionState::decode(&text, &mut restored).unwrap();
            prop_assert_eq!(&decoded, &state);
            prop_assert_eq!(decoded.encode(&restored, pretty), text);
        }
    }
}
