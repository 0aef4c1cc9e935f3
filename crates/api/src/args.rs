//! Loosely-typed tool/prompt arguments.

use serde_json::{Map, Value};

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ToolError {
    #[error("required argument \"{0}\" not found")]
    Missing(String),
    #[error("argument \"{name}\" must be {expected}")]
    Type { name: String, expected: &'static str },
}

/// View over the `arguments` object of a call. Non-object inputs behave as empty.
#[derive(Debug, Clone, Default)]
pub struct ToolArgs {
    map: Map<String, Value>,
}

impl ToolArgs {
    pub fn new(v: &Value) -> Self {
        Self { map: v.as_object().cloned().unwrap_or_default() }
    }

    /// A present, non-empty string.
    pub fn require_str(&self, name: &str) -> Result<String, ToolError> {
        match self.map.get(name) {
            None | Some(Value::Null) => Err(ToolError::Missing(name.into())),
            Some(Value::String(s)) if s.is_empty() => Err(ToolError::Missing(name.into())),
            Some(Value::String(s)) => Ok(s.clone()),
            Some(_) => Err(ToolError::Type { name: name.into(), expected: "a string" }),
        }
    }

    pub fn str_or(&self, name: &str, default: &str) -> String {
        match self.map.get(name) {
            Some(Value::String(s)) => s.clone(),
            _ => default.to_string(),
        }
    }

    /// Integers may arrive as JSON numbers (possibly float) or numeric strings.
    pub fn i64_or(&self, name: &str, default: i64) -> i64 {
        match self.map.get(name) {
            Some(Value::Number(n)) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)).unwrap_or(default),
            Some(Value::String(s)) => s.trim().parse().unwrap_or(default),
            _ => default,
        }
    }

    pub fn bool_or(&self, name: &str, default: bool) -> bool {
        match self.map.get(name) {
            Some(Value::Bool(b)) => *b,
            Some(Value::String(s)) => s.parse().unwrap_or(default),
            _ => default,
        }
    }
}
