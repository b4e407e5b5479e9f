//! Streaming JSON writer.
//!
//! Mirrors the cursor: callers emit start/end markers, property names and
//! scalars in document order. The writer takes care of separators and
//! optional indentation; it does not check that calls are balanced.

/// Incremental JSON writer backed by a `String`.
#[derive(Debug, Default)]
pub struct JsonWriter {
    out: String,
    indent: Option<usize>,
    // Item count per open container.
    frames: Vec<usize>,
    after_name: bool,
}

impl JsonWriter {
    /// Writer producing compact output.
    pub fn new() -> Self {
        Self::default()
    }

    /// Writer producing output indented by two spaces per level.
    pub fn pretty() -> Self {
        Self {
            indent: Some(2),
            ..Self::default()
        }
    }

    /// Consume the writer and return the text written so far.
    pub fn into_string(self) -> String {
        self.out
    }

    /// Begin an object value.
    pub fn start_object(&mut self) {
        self.open('{');
    }

    /// Close the innermost object.
    pub fn end_object(&mut self) {
        self.close('}');
    }

    /// Begin an array value.
    pub fn start_array(&mut self) {
        self.open('[');
    }

    /// Close the innermost array.
    pub fn end_array(&mut self) {
        self.close(']');
    }

    /// Write an object key. The next call must write its value.
    pub fn property_name(&mut self, name: &str) {
        self.begin_item();
        self.push_escaped(name);
        self.out.push(':');
        if self.indent.is_some() {
            self.out.push(' ');
        }
        self.after_name = true;
    }

    /// Write a string value.
    pub fn string(&mut self, value: &str) {
        self.begin_item();
        self.push_escaped(value);
    }

    /// Write an integer value.
    pub fn integer(&mut self, value: i64) {
        self.begin_item();
        self.out.push_str(&value.to_string());
    }

    /// Write a floating-point value. Non-finite values become `null`.
    pub fn number(&mut self, value: f64) {
        self.begin_item();
        if value.is_finite() {
            self.out.push_str(&value.to_string());
        } else {
            self.out.push_str("null");
        }
    }

    /// Write a boolean value.
    pub fn bool(&mut self, value: bool) {
        self.begin_item();
        self.out.push_str(if value { "true" } else { "false" });
    }

    /// Write `null`.
    pub fn null(&mut self) {
        self.begin_item();
        self.out.push_str("null");
    }

    /// Write a `"name": "value"` property.
    pub fn write_string(&mut self, name: &str, value: &str) {
        self.property_name(name);
        self.string(value);
    }

    /// Write a `"name": <integer>` property.
    pub fn write_integer(&mut self, name: &str, value: i64) {
        self.property_name(name);
        self.integer(value);
    }

    /// Write a `"name": <number>` property.
    pub fn write_number(&mut self, name: &str, value: f64) {
        self.property_name(name);
        self.number(value);
    }

    /// Write a `"name": <bool>` property.
    pub fn write_bool(&mut self, name: &str, value: bool) {
        self.property_name(name);
        self.bool(value);
    }

    fn open(&mut self, bracket: char) {
        self.begin_item();
        self.out.push(bracket);
        self.frames.push(0);
    }

    fn close(&mut self, bracket: char) {
        let items = self.frames.pop().unwrap_or(0);
        if items > 0 {
            self.newline();
        }
        self.out.push(bracket);
    }

    fn begin_item(&mut self) {
        if self.after_name {
            self.after_name = false;
            return;
        }
        if let Some(items) = self.frames.last_mut() {
            if *items > 0 {
                self.out.push(',');
            }
            *items += 1;
            self.newline();
        }
    }

    fn newline(&mut self) {
        if let Some(width) = self.indent {
            self.out.push('\n');
            for _ in 0..width * self.frames.len() {
                self.out.push(' ');
            }
        }
    }

    fn push_escaped(&mut self, s: &str) {
        let literal = serde_json::Value::String(s.to_owned()).to_string();
        self.out.push_str(&literal);
    }
}
