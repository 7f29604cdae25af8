//! `{{path}}` placeholder substitution
//!
//! Paths beginning with `boilerplate.` are looked up in the resolved content
//! library and never fall through to the data record. Everything else is
//! resolved against the data record. A placeholder that does not resolve is
//! left in the output exactly as written.

use lazy_static::lazy_static;
use regex::{Captures, Regex};
use serde_json::Value;

use crate::resolver::resolve;

const BOILERPLATE_PREFIX: &str = "boilerplate.";

lazy_static! {
    static ref PLACEHOLDER: Regex = Regex::new(r"\{\{([^{}]*)\}\}").unwrap();
}

/// Render `template`, leaving unresolved placeholders verbatim
pub fn render(template: &str, data: &Value, boilerplate: &Value) -> String {
    let mut unresolved = Vec::new();
    render_collect(template, data, boilerplate, &mut unresolved)
}

/// Render `template` and append every unresolved path to `unresolved`
pub fn render_collect(
    template: &str,
    data: &Value,
    boilerplate: &Value,
    unresolved: &mut Vec<String>,
) -> String {
    if !template.contains("{{") {
        return template.to_string();
    }
    PLACEHOLDER
        .replace_all(template, |caps: &Captures<'_>| {
            let path = caps[1].trim();
            match lookup(path, data, boilerplate) {
                Some(value) => stringify(value),
                None => {
                    unresolved.push(path.to_string());
                    caps[0].to_string()
                }
            }
        })
        .into_owned()
}

/// Render a JSON cell: strings are templates, anything else passes through
pub fn render_value(
    value: &Value,
    data: &Value,
    boilerplate: &Value,
    unresolved: &mut Vec<String>,
) -> Value {
    match value {
        Value::String(template) => {
            Value::String(render_collect(template, data, boilerplate, unresolved))
        }
        other => other.clone(),
    }
}

/// Resolve a placeholder path to its value
pub fn lookup<'a>(path: &str, data: &'a Value, boilerplate: &'a Value) -> Option<&'a Value> {
    match path.strip_prefix(BOILERPLATE_PREFIX) {
        Some(rest) => resolve(boilerplate, rest),
        None => resolve(data, path),
    }
}

/// Text form of a resolved value as it appears in a document
pub fn stringify(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::Array(items) => items
            .iter()
            .map(|item| match item {
                Value::Array(_) | Value::Object(_) => item.to_string(),
                scalar => stringify(scalar),
            })
            .collect::<Vec<_>>()
            .join(", "),
        Value::Object(_) => value.to_string(),
    }
}
