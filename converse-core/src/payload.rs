// converse-core/src/payload.rs

//! Loads a conversation payload from disk and runs the shallow checks that must
//! pass before any request is made.

use crate::errors::{ConverseError, Result};
use crate::models::payload::Payload;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::fs;
use std::io::{self, ErrorKind};
use std::path::Path;
use tracing::{debug, warn};

/// Default payload file name, resolved against the working directory.
pub const DEFAULT_PAYLOAD_FILE: &str = "payload.json";

const KNOWN_KEYS: &[&str] = &[
    "system",
    "messages",
    "toolConfig",
    "inferenceConfig",
    "additionalModelRequestFields",
];

/// Reads, parses and validates the payload at `path`.
pub fn load_payload(path: &Path) -> Result<Payload> {
    let text = fs::read_to_string(path).map_err(|e| read_error(path, e))?;
    debug!(path = %path.display(), bytes = text.len(), "Read payload file");
    parse_payload(&text, path)
}

fn read_error(path: &Path, e: io::Error) -> ConverseError {
    match e.kind() {
        ErrorKind::NotFound => ConverseError::PayloadNotFound {
            path: path.to_path_buf(),
        },
        ErrorKind::PermissionDenied => ConverseError::PayloadPermissionDenied {
            path: path.to_path_buf(),
            source: e,
        },
        _ => ConverseError::PayloadRead {
            path: path.to_path_buf(),
            source: e,
        },
    }
}

/// Parses payload text. `path` is only used in error messages.
pub fn parse_payload(text: &str, path: &Path) -> Result<Payload> {
    let value: Value = serde_json::from_str(text).map_err(|e| ConverseError::InvalidJson {
        path: path.to_path_buf(),
        line: e.line(),
        column: e.column(),
        source: e,
    })?;

    let mut root = match value {
        Value::Object(root) => root,
        other => {
            return Err(ConverseError::invalid_field(
                path,
                "<root>",
                format!("expected a JSON object, found {}", type_name(&other)),
            ));
        }
    };

    check_top_level(&root, path)?;

    for key in root.keys().filter(|k| !KNOWN_KEYS.contains(&k.as_str())) {
        warn!(key = %key, "Ignoring unrecognised top-level payload key");
    }
    root.retain(|k, v| KNOWN_KEYS.contains(&k.as_str()) && !v.is_null());

    check_messages(&root, path)?;

    Ok(Payload {
        system: take_section(&mut root, "system", path)?.unwrap_or_default(),
        messages: take_section(&mut root, "messages", path)?.unwrap_or_default(),
        tool_config: take_section(&mut root, "toolConfig", path)?,
        inference_config: take_section(&mut root, "inferenceConfig", path)?,
        additional_model_request_fields: take_section(&mut root, "additionalModelRequestFields", path)?,
    })
}

/// Decodes one top-level key so a type error names the key it came from.
fn take_section<T: DeserializeOwned>(
    root: &mut Map<String, Value>,
    key: &str,
    path: &Path,
) -> Result<Option<T>> {
    root.remove(key)
        .map(|value| {
            serde_json::from_value(value)
                .map_err(|e| ConverseError::invalid_field(path, key, e.to_string()))
        })
        .transpose()
}

/// Presence and type checks on the top-level keys only.
fn check_top_level(root: &Map<String, Value>, path: &Path) -> Result<()> {
    let messages = root.get("messages").ok_or_else(|| ConverseError::MissingField {
        path: path.to_path_buf(),
        field: "messages",
    })?;
    let Some(messages) = messages.as_array() else {
        return Err(ConverseError::invalid_field(
            path,
            "messages",
            format!("expected an array, found {}", type_name(messages)),
        ));
    };
    if messages.is_empty() {
        return Err(ConverseError::EmptyMessages {
            path: path.to_path_buf(),
        });
    }

    expect_kind(root, "system", path, Value::is_array, "an array")?;
    expect_kind(root, "toolConfig", path, Value::is_object, "an object")?;
    expect_kind(root, "inferenceConfig", path, Value::is_object, "an object")?;
    Ok(())
}

fn expect_kind(
    root: &Map<String, Value>,
    key: &str,
    path: &Path,
    check: fn(&Value) -> bool,
    expected: &str,
) -> Result<()> {
    match root.get(key) {
        Some(value) if !value.is_null() && !check(value) => Err(ConverseError::invalid_field(
            path,
            key,
            format!("expected {}, found {}", expected, type_name(value)),
        )),
        _ => Ok(()),
    }
}

/// Each turn needs a `user`/`assistant` role and a `content` array. Block
/// contents are left to the service.
fn check_messages(root: &Map<String, Value>, path: &Path) -> Result<()> {
    let messages = root
        .get("messages")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or(&[]);
    for (i, message) in messages.iter().enumerate() {
        let field = format!("messages[{}]", i);
        let Some(message) = message.as_object() else {
            return Err(ConverseError::invalid_field(
                path,
                field,
                format!("expected an object, found {}", type_name(message)),
            ));
        };
        match message.get("role").and_then(Value::as_str) {
            Some("user") | Some("assistant") => {}
            Some(other) => {
                return Err(ConverseError::invalid_field(
                    path,
                    format!("{}.role", field),
                    format!("expected 'user' or 'assistant', found '{}'", other),
                ));
            }
            None => {
                return Err(ConverseError::invalid_field(
                    path,
                    format!("{}.role", field),
                    "missing or not a string",
                ));
            }
        }
        if !message.get("content").is_some_and(Value::is_array) {
            return Err(ConverseError::invalid_field(
                path,
                format!("{}.content", field),
                "missing or not an array",
            ));
        }
    }
    Ok(())
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Names of the `*.json` files in `dir`, sorted. Unreadable directories yield an
/// empty list.
pub fn list_json_files(dir: &Path) -> Vec<String> {
    let Ok(entries) = fs::read_dir(dir) else {
        return Vec::new();
    };
    let mut names: Vec<String> = entries
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.path().is_file())
        .filter_map(|entry| entry.file_name().into_string().ok())
        .filter(|name| name.ends_with(".json"))
        .collect();
    names.sort();
    names
}
