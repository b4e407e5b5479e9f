//! Lines, options and positional text formatting.

/// Interpreter-assigned option number. Unique within one option set, not
/// necessarily contiguous.
pub type OptionId = u32;

/// A line of dialogue as delivered by the interpreter: a string-table id plus
/// already-resolved substitution values.
#[derive(Debug, Clone, PartialEq)]
pub struct Line {
    /// Key into the program's string table.
    pub id: String,
    /// Values for the `{0}`, `{1}`, … markers in the line's text.
    pub substitutions: Vec<String>,
}

impl Line {
    /// Create a line without substitutions.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            substitutions: Vec::new(),
        }
    }

    /// Add a substitution value.
    pub fn with_substitution(mut self, value: impl Into<String>) -> Self {
        self.substitutions.push(value.into());
        self
    }
}

/// One entry in an option set.
#[derive(Debug, Clone, PartialEq)]
pub struct DialogueOption {
    /// Number to hand back to `set_selected_option`.
    pub id: OptionId,
    /// The option's display line.
    pub line: Line,
    /// Node to continue at when chosen; `None` continues after the option set.
    pub destination: Option<String>,
    /// Whether the option's condition held when it was offered.
    pub is_available: bool,
}

/// A set of options offered together.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OptionSet {
    /// Options in offer order, available or not.
    pub options: Vec<DialogueOption>,
}

impl OptionSet {
    /// Options whose conditions held.
    pub fn available(&self) -> impl Iterator<Item = &DialogueOption> {
        self.options.iter().filter(|o| o.is_available)
    }
}

/// Replace `{0}`, `{1}`, … in `template` with the matching substitution.
///
/// `{{` and `}}` produce literal braces. Markers whose index is out of range,
/// or that are not a plain index, are copied through unchanged.
pub fn format_positional(template: &str, substitutions: &[String]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(pos) = rest.find(['{', '}']) {
        out.push_str(&rest[..pos]);
        let tail = &rest[pos..];

        if tail.starts_with("{{") || tail.starts_with("}}") {
            out.push_str(&tail[..1]);
            rest = &tail[2..];
            continue;
        }

        if let Some(stripped) = tail.strip_prefix('{')
            && let Some(end) = stripped.find('}')
            && let Ok(index) = stripped[..end].parse::<usize>()
            && let Some(value) = substitutions.get(index)
        {
            out.push_str(value);
            rest = &stripped[end + 1..];
            continue;
        }

        out.push_str(&tail[..1]);
        rest = &tail[1..];
    }

    out.push_str(rest);
    out
}
