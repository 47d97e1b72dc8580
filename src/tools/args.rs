//! Argument coercion for tool calls.
//!
//! Models hand over tool input in several shapes. Accepted forms, tried in
//! this order:
//!
//! 1. a JSON object (`{"phone": "0555..."}`), the structured fast path
//! 2. `key=value, key=value` pairs; a value runs up to the next comma
//! 3. a single positional value, bound to the first required parameter
//!
//! Surrounding quotes and backticks are stripped from values.

use std::sync::OnceLock;

use regex::Regex;
use serde_json::{Map, Value};
use thiserror::Error;

use super::{ParamKind, ParamSpec};

/// Named string arguments after coercion, in schema order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ToolArgs {
    values: Vec<(String, String)>,
}

impl ToolArgs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.values.iter_mut().find(|(k, _)| *k == name) {
            Some(slot) => slot.1 = value,
            None => self.values.push((name, value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.values
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Value of `name`, or the empty string when absent.
    pub fn text(&self, name: &str) -> &str {
        self.get(name).unwrap_or("")
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ArgumentError {
    #[error("missing required argument '{0}'")]
    Missing(String),

    #[error("argument '{name}' must be {expected}, got '{value}'")]
    InvalidKind {
        name: String,
        expected: &'static str,
        value: String,
    },

    #[error("could not read '{0}' as key=value")]
    Malformed(String),

    #[error("expected named arguments ({0}), got a single value")]
    Unstructured(String),
}

fn key_value_start() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\s*[A-Za-z_][A-Za-z0-9_]*\s*=").expect("static regex"))
}

/// Parse the `key=value, key=value` grammar.
///
/// Empty segments (trailing commas) are skipped. A segment without `=` is an
/// error rather than being glued onto the previous value.
pub fn parse_key_values(text: &str) -> Result<Vec<(String, String)>, ArgumentError> {
    let mut pairs = Vec::new();
    for segment in text.split(',') {
        if segment.trim().is_empty() {
            continue;
        }
        let Some((key, value)) = segment.split_once('=') else {
            return Err(ArgumentError::Malformed(segment.trim().to_string()));
        };
        let key = unquote(key.trim());
        if key.is_empty() {
            return Err(ArgumentError::Malformed(segment.trim().to_string()));
        }
        pairs.push((key.to_string(), unquote(value.trim()).to_string()));
    }
    Ok(pairs)
}

/// Coerce raw model text into the declared argument shape.
pub fn coerce_arguments(raw: &str, params: &[ParamSpec]) -> Result<ToolArgs, ArgumentError> {
    if params.is_empty() {
        return Ok(ToolArgs::new());
    }

    let text = strip_fences(raw.trim());

    if text.starts_with('{') {
        if let Ok(Value::Object(map)) = serde_json::from_str::<Value>(text) {
            return structured_arguments(&map, params);
        }
    }

    let mut args = ToolArgs::new();
    if let [only] = params {
        // One parameter: `name=` is optional and the value may contain commas.
        // A lone `key=value` under some other key still binds to the parameter.
        let value = match text.split_once('=') {
            Some((key, rest))
                if key_value_start().is_match(text)
                    && (only.name.eq_ignore_ascii_case(key.trim())
                        || (!rest.contains('=') && !text.contains('\n'))) =>
            {
                if !only.name.eq_ignore_ascii_case(key.trim()) {
                    tracing::debug!(key = %key.trim(), param = only.name, "Rebinding argument key");
                }
                unquote(rest.trim()).to_string()
            }
            _ => positional_value(text),
        };
        if !value.is_empty() {
            args.insert(only.name, value);
        }
    } else if key_value_start().is_match(text) && names_a_parameter(text, params) {
        for (key, value) in parse_key_values(text)? {
            if let Some(param) = lookup(params, &key) {
                args.insert(param.name, value);
            } else {
                tracing::debug!(key = %key, "Ignoring unknown tool argument");
            }
        }
    } else {
        let value = positional_value(text);
        let required: Vec<&ParamSpec> = params.iter().filter(|p| !p.optional).collect();
        let target = match required.as_slice() {
            [] => &params[0],
            [only] => *only,
            _ => {
                let names: Vec<&str> = required.iter().map(|p| p.name).collect();
                return Err(ArgumentError::Unstructured(names.join(", ")));
            }
        };
        if !value.is_empty() {
            args.insert(target.name, value);
        }
    }

    validate(args, params)
}

/// Bind an already-structured object to the declared parameters.
pub(crate) fn structured_arguments(
    map: &Map<String, Value>,
    params: &[ParamSpec],
) -> Result<ToolArgs, ArgumentError> {
    let mut args = ToolArgs::new();
    for (key, value) in map {
        let Some(param) = lookup(params, key) else {
            continue;
        };
        let text = match value {
            Value::Null => continue,
            Value::String(s) => s.trim().to_string(),
            other => other.to_string(),
        };
        args.insert(param.name, text);
    }
    validate(args, params)
}

fn validate(args: ToolArgs, params: &[ParamSpec]) -> Result<ToolArgs, ArgumentError> {
    for param in params {
        match args.get(param.name) {
            None | Some("") if !param.optional => {
                return Err(ArgumentError::Missing(param.name.to_string()));
            }
            Some(value) if !value.is_empty() => check_kind(param, value)?,
            _ => {}
        }
    }
    Ok(args)
}

fn check_kind(param: &ParamSpec, value: &str) -> Result<(), ArgumentError> {
    let ok = match param.kind {
        ParamKind::String => true,
        ParamKind::Integer => value.parse::<i64>().is_ok(),
        ParamKind::Boolean => matches!(
            value.to_ascii_lowercase().as_str(),
            "true" | "false" | "1" | "0" | "yes" | "no"
        ),
    };
    if ok {
        Ok(())
    } else {
        Err(ArgumentError::InvalidKind {
            name: param.name.to_string(),
            expected: param.kind.json_type(),
            value: value.to_string(),
        })
    }
}

fn lookup<'a>(params: &'a [ParamSpec], key: &str) -> Option<&'a ParamSpec> {
    params.iter().find(|p| p.name.eq_ignore_ascii_case(key))
}

fn names_a_parameter(text: &str, params: &[ParamSpec]) -> bool {
    text.split(',')
        .filter_map(|segment| segment.split_once('='))
        .any(|(key, _)| lookup(params, unquote(key.trim())).is_some())
}

fn positional_value(text: &str) -> String {
    if text.starts_with('"') {
        if let Ok(s) = serde_json::from_str::<String>(text) {
            return s.trim().to_string();
        }
    }
    unquote(text).to_string()
}

fn strip_fences(text: &str) -> &str {
    let text = text.trim();
    let Some(inner) = text.strip_prefix("```") else {
        return text;
    };
    let inner = inner.strip_suffix("```").unwrap_or(inner);
    // Drop an info string such as ```json
    match inner.split_once('\n') {
        Some((first, rest)) if !first.trim().contains(['{', '=', ' ']) => rest.trim(),
        _ => inner.trim(),
    }
}

fn unquote(value: &str) -> &str {
    let value = value.trim();
    for quote in ['"', '\'', '`'] {
        if value.len() >= 2 && value.starts_with(quote) && value.ends_with(quote) {
            return value[1..value.len() - 1].trim();
        }
    }
    value
}
