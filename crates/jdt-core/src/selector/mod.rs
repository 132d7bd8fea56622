//! Path selectors for attributed directive calls
//!
//! An attributed directive (`{"@jdt.path": "...", ...}`) names the nodes it
//! operates on with a small JSONPath subset: child steps (`$.a.b`, or the
//! relative form `a.b`), bracket indices including negative indices and
//! unions (`[0]`, `[-1]`, `[0, 2]`), and element filters (`[?(@.name)]`,
//! `[?(@.id == 3)]`).
//!
//! Selection resolves to the *locations* of the matched nodes rather than
//! the nodes themselves, so the merge engine can delete, replace, rename or
//! merge at each match.

mod parser;

use crate::path::Segment;
use serde_json::Value;
use std::fmt;
use thiserror::Error;

/// Segment cap per selector. Keeps pathological transform inputs from
/// recursing the resolver arbitrarily deep.
const MAX_SEGMENTS: usize = 256;

/// A parsed selector expression.
#[derive(Debug, Clone, PartialEq)]
pub struct Selector {
    segments: Vec<SelectorSegment>,
    text: String,
}

#[derive(Debug, Clone, PartialEq)]
enum SelectorSegment {
    /// `.name` — a single object property.
    Child(String),
    /// `[i]` or `[i, j, ...]` — array elements; negative counts from the end.
    Indices(Vec<i64>),
    /// `[?(...)]` — every child passing the filter.
    Filter(Filter),
}

#[derive(Debug, Clone, PartialEq)]
enum Filter {
    /// `@.field` — the field exists and is not null.
    Exists(String),
    /// `@.field == literal`.
    Equals(String, Value),
}

/// Errors from selector text that does not parse.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SelectorError {
    #[error("empty selector")]
    Empty,
    #[error("invalid selector at byte {at}: {message}")]
    Invalid { at: usize, message: &'static str },
    #[error("unsupported selector feature: {0}")]
    Unsupported(&'static str),
    #[error("selector exceeds {MAX_SEGMENTS} segments")]
    TooDeep,
}

impl Selector {
    /// Parse a selector expression.
    pub fn parse(input: &str) -> Result<Self, SelectorError> {
        let trimmed = crate::document::strip_bom(input).trim();
        if trimmed.is_empty() {
            return Err(SelectorError::Empty);
        }
        let segments = parser::Parser::new(trimmed).parse()?;
        Ok(Self {
            segments,
            text: trimmed.to_string(),
        })
    }

    /// Resolve the selector against `root`, returning the path of every
    /// matched node relative to `root`. An empty path means `root` itself
    /// matched (the selector was just `$`). Matching nothing is not an
    /// error; the result is simply empty.
    pub fn select(&self, root: &Value) -> Vec<Vec<Segment>> {
        let mut matches: Vec<Vec<Segment>> = vec![Vec::new()];

        for segment in &self.segments {
            let mut next = Vec::new();
            for path in matches {
                let Some(node) = value_at(root, &path) else {
                    continue;
                };
                match segment {
                    SelectorSegment::Child(name) => {
                        if node.as_object().is_some_and(|o| o.contains_key(name)) {
                            next.push(extended(&path, Segment::Key(name.clone())));
                        }
                    }
                    SelectorSegment::Indices(indices) => {
                        if let Some(array) = node.as_array() {
                            for index in indices {
                                if let Some(i) = resolve_index(*index, array.len()) {
                                    next.push(extended(&path, Segment::Index(i)));
                                }
                            }
                        }
                    }
                    SelectorSegment::Filter(filter) => match node {
                        Value::Array(array) => {
                            for (i, element) in array.iter().enumerate() {
                                if filter.matches(element) {
                                    next.push(extended(&path, Segment::Index(i)));
                                }
                            }
                        }
                        Value::Object(object) => {
                            for (key, value) in object {
                                if filter.matches(value) {
                                    next.push(extended(&path, Segment::Key(key.clone())));
                                }
                            }
                        }
                        _ => {}
                    },
                }
            }
            matches = next;
        }

        matches
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

impl Filter {
    fn matches(&self, candidate: &Value) -> bool {
        let Some(object) = candidate.as_object() else {
            return false;
        };
        match self {
            Filter::Exists(field) => object.get(field).is_some_and(|v| !v.is_null()),
            Filter::Equals(field, literal) => object.get(field).is_some_and(|v| v == literal),
        }
    }
}

/// Walk `root` down a resolved path.
pub(crate) fn value_at<'a>(root: &'a Value, path: &[Segment]) -> Option<&'a Value> {
    let mut current = root;
    for segment in path {
        current = match segment {
            Segment::Key(key) => current.as_object()?.get(key)?,
            Segment::Index(index) => current.as_array()?.get(*index)?,
        };
    }
    Some(current)
}

fn extended(path: &[Segment], segment: Segment) -> Vec<Segment> {
    let mut out = path.to_vec();
    out.push(segment);
    out
}

fn resolve_index(index: i64, len: usize) -> Option<usize> {
    if index >= 0 {
        let i = index as usize;
        (i < len).then_some(i)
    } else {
        let back = index.unsigned_abs() as usize;
        (back <= len).then(|| len - back)
    }
}
