//! Building context data from files and `KEY=VALUE` assignments

use std::{fs, path::Path};

use errors::ContextError;
use tracing::debug;
use types::{Map, Value};

enum Format {
    Json,
    Toml,
}

/// Load a mapping from a JSON or TOML file, chosen by extension
pub fn load_file(path: impl AsRef<Path>) -> Result<Map, ContextError> {
    let path = path.as_ref();
    let shown = path.display().to_string();

    let format = match path.extension().and_then(|ext| ext.to_str()) {
        Some("json") => Format::Json,
        Some("toml") => Format::Toml,
        _ => return Err(ContextError::UnsupportedFormat(shown)),
    };

    let source = fs::read_to_string(path).map_err(|err| ContextError::UnreadableFile {
        path: shown.clone(),
        message: err.to_string(),
    })?;

    let value: Result<Value, String> = match format {
        Format::Json => serde_json::from_str(&source).map_err(|err| err.to_string()),
        Format::Toml => toml::from_str(&source).map_err(|err| err.to_string()),
    };

    let value = value.map_err(|message| ContextError::InvalidData {
        path: shown.clone(),
        message,
    })?;

    debug!(path = %shown, "loaded context data");

    match value {
        Value::Map(map) => Ok(map),
        _ => Err(ContextError::NotAMapping(shown)),
    }
}

/// Deep merge mappings in order, later keys win
pub fn merge(maps: impl IntoIterator<Item = Map>) -> Map {
    let mut merged = Map::new();

    for map in maps {
        for (key, value) in map {
            match merged.get_mut(&key) {
                Some(existing) => existing.merge(value),
                None => {
                    merged.insert(key, value);
                }
            }
        }
    }

    merged
}

/// Parse a single `KEY=VALUE` pair
pub fn parse_assignment(s: &str) -> Result<(String, String), ContextError> {
    match s.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
        _ => Err(ContextError::InvalidAssignment(s.to_string())),
    }
}

/// Apply assignments on top of `data`
///
/// Dotted keys assign in to nested mappings. A key given more than once
/// collects its values in to a list, in the order they were given.
pub fn assign(data: &mut Map, assignments: &[(String, String)]) {
    let mut grouped: Vec<(&str, Vec<&str>)> = vec![];

    for (key, value) in assignments {
        match grouped.iter_mut().find(|(existing, _)| *existing == key.as_str()) {
            Some((_, values)) => values.push(value.as_str()),
            None => grouped.push((key.as_str(), vec![value.as_str()])),
        }
    }

    for (key, mut values) in grouped {
        let value = if values.len() == 1 {
            Value::from(values.remove(0))
        } else {
            Value::from(values)
        };

        let segments: Vec<&str> = key.split('.').collect();
        let Some((first, rest)) = segments.split_first() else {
            continue;
        };

        data.entry(first.to_string())
            .or_default()
            .insert_segments(rest, value);
    }
}
