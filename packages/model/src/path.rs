//! # Content Paths
//!
//! Dot-delimited key chains into section content, e.g. `headline.text` or
//! `items.0.quote`.
//!
//! ## Semantics
//!
//! - Missing intermediate keys are created as empty objects
//! - A scalar sitting where an intermediate container is needed is replaced
//!   by an empty object
//! - Numeric segments index into lists; the index must already exist
//! - Only the leaf is replaced, sibling keys are never touched

use crate::error::{ModelResult, PathError};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

/// Parsed content path
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ContentPath {
    segments: Vec<String>,
}

impl ContentPath {
    /// Parse a dot-delimited path
    pub fn parse(path: &str) -> ModelResult<Self> {
        if path.trim().is_empty() {
            return Err(PathError::Empty);
        }

        let segments: Vec<String> = path.split('.').map(|s| s.trim().to_string()).collect();
        if segments.iter().any(|s| s.is_empty()) {
            return Err(PathError::EmptySegment {
                path: path.to_string(),
            });
        }

        Ok(Self { segments })
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Read the value at this path, if every segment resolves
    pub fn get<'a>(&self, root: &'a Value) -> Option<&'a Value> {
        let mut current = root;
        for segment in &self.segments {
            current = match current {
                Value::Object(map) => map.get(segment)?,
                Value::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
                _ => return None,
            };
        }
        Some(current)
    }

    /// Replace the value at this path, creating intermediate objects as needed.
    ///
    /// Returns the previous leaf value, if there was one.
    pub fn set(&self, root: &mut Value, value: Value) -> ModelResult<Option<Value>> {
        if !root.is_object() {
            return Err(PathError::RootNotObject);
        }

        let (leaf, parents) = self
            .segments
            .split_last()
            .ok_or(PathError::Empty)?;

        let mut current = root;
        for segment in parents {
            ensure_container(current);
            current = match current {
                Value::Object(map) => map
                    .entry(segment.clone())
                    .or_insert_with(|| Value::Object(Map::new())),
                Value::Array(items) => {
                    let index = parse_index(segment, items.len())?;
                    &mut items[index]
                }
                _ => return Err(PathError::RootNotObject),
            };
        }

        ensure_container(current);
        match current {
            Value::Object(map) => Ok(map.insert(leaf.clone(), value)),
            Value::Array(items) => {
                let index = parse_index(leaf, items.len())?;
                Ok(Some(std::mem::replace(&mut items[index], value)))
            }
            _ => Err(PathError::RootNotObject),
        }
    }
}

impl FromStr for ContentPath {
    type Err = PathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for ContentPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.segments.join("."))
    }
}

/// Read `path` from `root`
pub fn get_path<'a>(root: &'a Value, path: &str) -> ModelResult<Option<&'a Value>> {
    Ok(ContentPath::parse(path)?.get(root))
}

/// Write `value` at `path` inside `root`
pub fn set_path(root: &mut Value, path: &str, value: Value) -> ModelResult<Option<Value>> {
    ContentPath::parse(path)?.set(root, value)
}

fn ensure_container(value: &mut Value) {
    if !(value.is_object() || value.is_array()) {
        *value = Value::Object(Map::new());
    }
}

fn parse_index(segment: &str, len: usize) -> ModelResult<usize> {
    let index = segment
        .parse::<usize>()
        .map_err(|_| PathError::InvalidIndex {
            segment: segment.to_string(),
        })?;

    if index >= len {
        return Err(PathError::IndexOutOfBounds { index, len });
    }

    Ok(index)
}
