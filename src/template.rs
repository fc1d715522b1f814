//! Template interpolation for request paths
//!
//! Handles `{{ variable }}` interpolation in stream path templates.
//! Supports nested access like `{{ parent.id }}` and `{{ config.page_size }}`.

use crate::error::{Error, Result};
use regex::Regex;
use serde_json::Value;
use std::sync::LazyLock;

/// Regex for matching template variables: {{ variable.path }}
static TEMPLATE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{\{\s*([a-zA-Z_][a-zA-Z0-9_]*(?:\.[a-zA-Z_][a-zA-Z0-9_]*)*)\s*\}\}")
        .expect("template regex is valid")
});

/// Context for template interpolation
#[derive(Debug, Clone, Default)]
pub struct TemplateContext {
    /// Connector configuration values (secrets already stripped)
    pub config: Value,
    /// Current stream slice, `{"parent": ..., "sub_parent": ...}` for child streams
    pub slice: Value,
}

impl TemplateContext {
    /// Create a new empty context
    pub fn new() -> Self {
        Self::default()
    }

    /// Set config values
    pub fn set_config(&mut self, config: Value) -> &mut Self {
        self.config = config;
        self
    }

    /// Set slice values
    pub fn set_slice(&mut self, slice: Value) -> &mut Self {
        self.slice = slice;
        self
    }

    /// Get a value by path (e.g., "parent.id")
    pub fn get(&self, path: &str) -> Option<&Value> {
        let parts: Vec<&str> = path.split('.').collect();

        match parts[0] {
            "config" => get_nested_value(&self.config, &parts[1..]),
            "slice" => get_nested_value(&self.slice, &parts[1..]),
            // `parent` and `sub_parent` are shorthands into the slice
            _ => get_nested_value(&self.slice, &parts),
        }
    }
}

/// Get a nested value from a JSON value by path
fn get_nested_value<'a>(value: &'a Value, path: &[&str]) -> Option<&'a Value> {
    let mut current = value;
    for part in path {
        match current {
            Value::Object(map) => {
                current = map.get(*part)?;
            }
            _ => return None,
        }
    }
    Some(current)
}

/// Render a template string with the given context
///
/// A variable that is missing or `null` is an error: substituting an empty
/// string into a request path would silently address the wrong resource.
/// Each substituted value is percent-encoded as exactly one path segment.
pub fn render(template: &str, ctx: &TemplateContext) -> Result<String> {
    let mut result = template.to_string();
    let mut errors = Vec::new();

    for cap in TEMPLATE_REGEX.captures_iter(template) {
        let full_match = &cap[0];
        let var_path = &cap[1];

        match ctx.get(var_path) {
            Some(value) if !value.is_null() => {
                let replacement = path_segment(var_path, value)?;
                result = result.replace(full_match, &replacement);
            }
            _ => errors.push(var_path.to_string()),
        }
    }

    if errors.is_empty() {
        Ok(result)
    } else {
        Err(Error::undefined_var(errors.join(", ")))
    }
}

/// Check if a string contains template variables
pub fn has_templates(s: &str) -> bool {
    TEMPLATE_REGEX.is_match(s)
}

/// Encode a value as a single path segment
///
/// `.` and `..` are rejected since URL resolution would still treat them
/// as dot segments after encoding.
fn path_segment(var_path: &str, value: &Value) -> Result<String> {
    let raw = value_to_string(value);
    if raw.is_empty() || raw == "." || raw == ".." {
        return Err(Error::template(format!(
            "'{var_path}' resolves to '{raw}', which is not a usable path segment"
        )));
    }
    Ok(urlencoding::encode(&raw).into_owned())
}

/// Convert a JSON value to a string for template substitution
fn value_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        _ => serde_json::to_string(value).unwrap_or_default(),
    }
}
