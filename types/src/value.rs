use std::collections::BTreeMap;
use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};

/// String keyed mapping at the heart of every context
pub type Map = BTreeMap<String, Value>;

/// A value a template can be rendered against
///
/// Any serde format can be deserialized in to a [Value]. Absence is never
/// represented explicitly: a path that can't be resolved renders as the
/// empty string, same as [Value::Null].
#[derive(Clone, Debug, PartialEq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Integer(i64),
    Unsigned(u64),
    Float(f64),
    String(String),
    List(Vec<Value>),
    Map(Map),
}

impl Value {
    /// Truthiness as seen by `if`: anything that doesn't stringify to `""`
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Null => false,
            Value::Bool(b) => *b,
            Value::Integer(_) | Value::Unsigned(_) | Value::Float(_) => true,
            Value::String(s) => !s.is_empty(),
            Value::List(items) => items.iter().any(Value::is_truthy),
            Value::Map(_) => true,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&Map> {
        match self {
            Value::Map(map) => Some(map),
            _ => None,
        }
    }

    /// Descend through nested maps, one key per segment
    ///
    /// Returns `None` if a key is missing or an intermediate value isn't a map.
    pub fn get_path(&self, segments: &[&str]) -> Option<&Value> {
        segments
            .iter()
            .try_fold(self, |current, key| current.as_map()?.get(*key))
    }

    /// Assign `value` at a dotted `path`
    ///
    /// Intermediate values that aren't maps are replaced with empty maps.
    pub fn insert_path(&mut self, path: &str, value: Value) {
        let segments: Vec<&str> = path.split('.').collect();
        self.insert_segments(&segments, value);
    }

    pub fn insert_segments(&mut self, segments: &[&str], value: Value) {
        let Some((last, parents)) = segments.split_last() else {
            *self = value;
            return;
        };

        let mut current = self.ensure_map();

        for key in parents {
            current = current
                .entry(key.to_string())
                .or_insert(Value::Null)
                .ensure_map();
        }

        current.insert(last.to_string(), value);
    }

    /// Deep merge `other` in to this value, `other` wins on conflicts
    pub fn merge(&mut self, other: Value) {
        match (self, other) {
            (Value::Map(base), Value::Map(overlay)) => {
                for (key, value) in overlay {
                    match base.get_mut(&key) {
                        Some(existing) => existing.merge(value),
                        None => {
                            base.insert(key, value);
                        }
                    }
                }
            }
            (slot, other) => *slot = other,
        }
    }

    fn ensure_map(&mut self) -> &mut Map {
        if !matches!(self, Value::Map(_)) {
            *self = Value::Map(Map::new());
        }

        let Value::Map(map) = self else {
            unreachable!("value was replaced with a map above")
        };

        map
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null | Value::Bool(false) => Ok(()),
            Value::Bool(true) | Value::Map(_) => f.write_str("true"),
            Value::Integer(n) => write!(f, "{n}"),
            Value::Unsigned(n) => write!(f, "{n}"),
            // Integral floats keep their fraction, `1.0` not `1`
            Value::Float(n) => write!(f, "{n:?}"),
            Value::String(s) => f.write_str(s),
            Value::List(items) => items.iter().try_for_each(|item| write!(f, "{item}")),
        }
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Integer(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(values: Vec<T>) -> Self {
        Value::List(values.into_iter().map(Into::into).collect())
    }
}

impl From<Map> for Value {
    fn from(map: Map) -> Self {
        Value::Map(map)
    }
}

impl From<serde_json::Value> for Value {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => match (n.as_i64(), n.as_u64()) {
                (Some(i), _) => Value::Integer(i),
                (None, Some(u)) => Value::Unsigned(u),
                _ => Value::Float(n.as_f64().unwrap_or_default()),
            },
            serde_json::Value::String(s) => Value::String(s),
            serde_json::Value::Array(items) => Value::List(items.into_iter().map(Value::from).collect()),
            serde_json::Value::Object(entries) => Value::Map(
                entries
                    .into_iter()
                    .map(|(key, value)| (key, Value::from(value)))
                    .collect(),
            ),
        }
    }
}
