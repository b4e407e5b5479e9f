//! Variable storage owned by the session.

use std::collections::BTreeMap;

use crate::value::Value;

/// Flat mapping from variable name to value.
///
/// The session owns the store and lends it to the interpreter for the
/// duration of a step. Names iterate in sorted order, so the persisted form
/// is stable across runs.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VariableStore {
    variables: BTreeMap<String, Value>,
}

impl VariableStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a variable.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.variables.get(name)
    }

    /// Set a variable to any value, replacing its previous kind.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.variables.insert(name.into(), value.into());
    }

    /// Set a string variable.
    pub fn set_string(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.set(name, Value::String(value.into()));
    }

    /// Set a numeric variable.
    pub fn set_number(&mut self, name: impl Into<String>, value: f64) {
        self.set(name, Value::Number(value));
    }

    /// Set a boolean variable.
    pub fn set_bool(&mut self, name: impl Into<String>, value: bool) {
        self.set(name, Value::Bool(value));
    }

    /// Whether the variable has been stored.
    pub fn contains(&self, name: &str) -> bool {
        self.variables.contains_key(name)
    }

    /// Iterate over `(name, value)` pairs in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.variables.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of stored variables.
    pub fn len(&self) -> usize {
        self.variables.len()
    }

    /// Whether no variables are stored.
    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }

    /// Remove every variable.
    pub fn clear(&mut self) {
        self.variables.clear();
    }
}
