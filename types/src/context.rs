use std::borrow::Cow;

use crate::value::{Map, Value};

static EMPTY: Map = Map::new();

/// Data a template is applied against
///
/// A context is a chain of scopes. The root borrows the caller's [Map] and
/// every [Context::bind] call adds a frame on top that assigns one dotted
/// path. Frames borrow their parent, so extending a context never copies or
/// mutates it and sibling scopes can't observe each other's bindings.
///
/// Lookups behave as if each frame had deep copied its parent and assigned
/// the path in to the copy, replacing intermediate values that aren't maps.
#[derive(Debug, Clone, Copy)]
pub struct Context<'a> {
    frame: Frame<'a>,
}

#[derive(Debug, Clone, Copy)]
enum Frame<'a> {
    Root(&'a Map),
    Bound {
        parent: &'a Context<'a>,
        path: &'a str,
        value: &'a Value,
    },
}

impl<'a> Context<'a> {
    pub fn new(data: &'a Map) -> Self {
        Self {
            frame: Frame::Root(data),
        }
    }

    /// Extend this context with `value` bound at the dotted `path`
    pub fn bind<'b>(&'b self, path: &'b str, value: &'b Value) -> Context<'b> {
        Context {
            frame: Frame::Bound {
                parent: self,
                path,
                value,
            },
        }
    }

    /// Resolve a dotted path, `None` if it doesn't exist
    pub fn lookup(&self, path: &str) -> Option<Cow<'_, Value>> {
        let segments: Vec<&str> = path.split('.').collect();

        self.resolve(&segments)
    }

    /// Resolve a dotted path and stringify it, missing paths become `""`
    pub fn stringify(&self, path: &str) -> String {
        self.lookup(path)
            .map(|value| value.to_string())
            .unwrap_or_default()
    }

    /// If the path resolves to something that doesn't stringify to `""`
    pub fn is_truthy(&self, path: &str) -> bool {
        self.lookup(path).is_some_and(|value| value.is_truthy())
    }

    fn resolve(&self, segments: &[&str]) -> Option<Cow<'_, Value>> {
        match self.frame {
            Frame::Root(data) => {
                let (first, rest) = segments.split_first()?;

                data.get(*first)?.get_path(rest).map(Cow::Borrowed)
            }
            Frame::Bound {
                parent,
                path,
                value,
            } => {
                let bound: Vec<&str> = path.split('.').collect();

                // The lookup goes through the bound value
                if segments.len() >= bound.len() && segments[..bound.len()] == bound[..] {
                    return value.get_path(&segments[bound.len()..]).map(Cow::Borrowed);
                }

                // The lookup stops at a map that contains the bound value
                if bound.len() > segments.len() && bound[..segments.len()] == *segments {
                    let mut base = match parent.resolve(segments) {
                        Some(existing) if existing.as_map().is_some() => existing.into_owned(),
                        _ => Value::Map(Map::new()),
                    };

                    base.insert_segments(&bound[segments.len()..], value.clone());

                    return Some(Cow::Owned(base));
                }

                parent.resolve(segments)
            }
        }
    }
}

impl Context<'static> {
    /// A context where every lookup misses
    pub fn empty() -> Self {
        Context::new(&EMPTY)
    }
}
