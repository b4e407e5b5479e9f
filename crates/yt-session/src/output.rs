//! Update document formatting.

use std::io::Write;

use serde_json::{Value, json};

use crate::error::{SessionError, SessionResult};
use crate::state::SessionState;
use crate::turn::TurnResult;

/// Id of the single buffer window every update targets.
pub const WINDOW_ID: i64 = 1;

fn styled(style: &str, text: &str) -> Value {
    json!({ "content": [{ "style": style, "text": text }] })
}

/// Build the update document for a finished turn.
///
/// `windows` is only sent while the generation is at most 1, so the client
/// sets up its display once. `content` is left out entirely when the turn
/// produced nothing to show.
pub fn render_update(result: &TurnResult, state: &SessionState) -> Value {
    let mut update = json!({
        "type": "update",
        "gen": state.generation,
    });

    if state.generation <= 1 {
        let metrics = state.metrics.unwrap_or_default();
        update["windows"] = json!([{
            "id": WINDOW_ID,
            "type": "buffer",
            "rock": 0,
            "left": 0,
            "top": 0,
            "width": metrics.width,
            "height": metrics.height,
        }]);
    }

    let mut lines = Vec::new();
    if result.new_turn {
        if let Some(choice) = &result.choice_text {
            lines.push(styled("input", choice));
        }
        for text in &result.lines {
            lines.push(styled("normal", text));
        }
        for option in &result.options {
            lines.push(json!({
                "content": [{
                    "style": "note",
                    "text": option.text,
                    "hyperlink": format!("{}:{}", state.turn, option.id),
                }]
            }));
        }
    }

    if result.new_input && !result.options.is_empty() {
        update["input"] = json!([{
            "id": WINDOW_ID,
            "gen": state.generation,
            "hyperlink": true,
        }]);
    }

    if !lines.is_empty() {
        update["content"] = json!([{ "id": WINDOW_ID, "text": lines }]);
    }

    if result.story_done {
        update["exit"] = json!(true);
    }

    update
}

/// Write an update as a single line of compact JSON.
pub fn write_update<W: Write>(out: &mut W, update: &Value) -> SessionResult<()> {
    serde_json::to_writer(&mut *out, update)
        .map_err(|e| SessionError::Output(std::io::Error::other(e)))?;
    writeln!(out).map_err(SessionError::Output)?;
    out.flush().map_err(SessionError::Output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{Metrics, PendingOption};

    fn opening() -> (TurnResult, SessionState) {
        let result = TurnResult {
            lines: vec!["The gate creaks.".into(), "A crow watches.".into()],
            options: vec![PendingOption {
                id: 0,
                text: "Enter".into(),
            }],
            new_turn: true,
            new_input: true,
            ..TurnResult::default()
        };
        let state = SessionState {
            turn: 1,
            generation: 1,
            metrics: Some(Metrics {
                width: 80.0,
                height: 24.0,
            }),
            ..SessionState::new()
        };
        (result, state)
    }

    #[test]
    fn opening_turn_shape() {
        let (result, state) = opening();
        let update = render_update(&result, &state);

        assert_eq!(update["type"], "update");
        assert_eq!(update["gen"], 1);

        let window = &update["windows"][0];
        assert_eq!(window["type"], "buffer");
        assert_eq!(window["width"].as_f64(), Some(80.0));
        assert_eq!(window["height"].as_f64(), Some(24.0));

        let text = update["content"][0]["text"].as_array().unwrap();
        assert_eq!(text.len(), 3);
        assert_eq!(text[0]["content"][0]["style"], "normal");
        assert_eq!(text[1]["content"][0]["text"], "A crow watches.");
        assert_eq!(text[2]["content"][0]["style"], "note");
        assert_eq!(text[2]["content"][0]["hyperlink"], "1:0");

        assert_eq!(update["input"][0]["hyperlink"], true);
        assert!(update.get("exit").is_none());
    }

    #[test]
    fn windows_only_while_generation_at_most_one() {
        let (result, mut state) = opening();
        for generation in 0..4 {
            state.generation = generation;
            let update = render_update(&result, &state);
            assert_eq!(update.get("windows").is_some(), generation <= 1);
        }
    }

    #[test]
    fn default_window_size_without_metrics() {
        let (result, mut state) = opening();
        state.metrics = None;
        let update = render_update(&result, &state);
        assert_eq!(update["windows"][0]["width"].as_f64(), Some(80.0));
        assert_eq!(update["windows"][0]["height"].as_f64(), Some(24.0));
    }

    #[test]
    fn choice_echo_comes_first() {
        let (mut result, state) = opening();
        result.choice_text = Some("Knock".into());
        let update = render_update(&result, &state);
        let first = &update["content"][0]["text"][0]["content"][0];
        assert_eq!(first["style"], "input");
        assert_eq!(first["text"], "Knock");
    }

    #[test]
    fn idle_turn_has_no_content_or_input() {
        let state = SessionState {
            turn: 3,
            generation: 7,
            ..SessionState::new()
        };
        let update = render_update(&TurnResult::default(), &state);
        assert_eq!(update, json!({"type": "update", "gen": 7}));
    }

    #[test]
    fn story_end_sets_exit_without_input() {
        let (mut result, state) = opening();
        result.options.clear();
        result.story_done = true;
        let update = render_update(&result, &state);
        assert_eq!(update["exit"], true);
        assert!(update.get("input").is_none());
        assert_eq!(update["content"][0]["text"].as_array().map(Vec::len), Some(2));
    }

    #[test]
    fn written_as_one_line() {
        let (result, state) = opening();
        let mut out = Vec::new();
        write_update(&mut out, &render_update(&result, &state)).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.ends_with('\n'));
        assert_eq!(text.lines().count(), 1);
    }
}
