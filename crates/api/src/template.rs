//! Field-path output templates: literal text interleaved with `{{.a.b}}`
//! lookups against a JSON object. `{{.}}` renders the whole value.

use serde_json::Value;

const NO_VALUE: &str = "<no value>";

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum TemplateError {
    #[error("unclosed action at offset {0}")]
    Unclosed(usize),
    #[error("unsupported action \"{0}\": only field paths like {{{{.metadata.name}}}} are allowed")]
    Unsupported(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Text(String),
    Path(Vec<String>),
}

/// A parsed template, reusable across objects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    segments: Vec<Segment>,
}

impl Template {
    pub fn parse(src: &str) -> Result<Self, TemplateError> {
        let mut segments = Vec::new();
        let mut rest = src;
        let mut offset = 0;
        while let Some(open) = rest.find("{{") {
            if open > 0 { segments.push(Segment::Text(rest[..open].to_string())); }
            let after = &rest[open + 2..];
            let close = after.find("}}").ok_or(TemplateError::Unclosed(offset + open))?;
            segments.push(Segment::Path(parse_action(&after[..close])?));
            let consumed = open + 2 + close + 2;
            offset += consumed;
            rest = &rest[consumed..];
        }
        if !rest.is_empty() { segments.push(Segment::Text(rest.to_string())); }
        Ok(Self { segments })
    }

    pub fn render(&self, data: &Value) -> String {
        let mut out = String::new();
        for seg in &self.segments {
            match seg {
                Segment::Text(t) => out.push_str(t),
                Segment::Path(path) => out.push_str(&render_value(lookup(data, path))),
            }
        }
        out
    }
}

fn parse_action(raw: &str) -> Result<Vec<String>, TemplateError> {
    let action = raw.trim_start_matches('-').trim_end_matches('-').trim();
    if action == "." { return Ok(Vec::new()); }
    let path = action.strip_prefix('.').ok_or_else(|| TemplateError::Unsupported(action.to_string()))?;
    let fields: Vec<String> = path.split('.').map(str::to_string).collect();
    let valid = |f: &String| !f.is_empty() && f.chars().all(|c| c.is_alphanumeric() || c == '_' || c == '-');
    if !fields.iter().all(valid) { return Err(TemplateError::Unsupported(action.to_string())); }
    Ok(fields)
}

fn lookup<'a>(data: &'a Value, path: &[String]) -> Option<&'a Value> {
    path.iter().try_fold(data, |cur, field| cur.as_object()?.get(field))
}

fn render_value(v: Option<&Value>) -> String {
    match v {
        None | Some(Value::Null) => NO_VALUE.to_string(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}
