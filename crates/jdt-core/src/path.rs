//! Merge-path tracking and JSON Pointer rendering
//!
//! Every failure the engine reports carries the location of the offending
//! node as an RFC 6901 JSON Pointer. Paths are built incrementally during
//! the merge walk and rendered only when an error is produced.

use std::fmt;

/// One step from a node to one of its children.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Segment {
    /// An object property name.
    Key(String),
    /// An array element index.
    Index(usize),
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Segment::Key(k) => write!(f, "/{}", escape(k)),
            Segment::Index(i) => write!(f, "/{}", i),
        }
    }
}

/// Location of a node in a document, from the root down.
///
/// Renders as an RFC 6901 JSON Pointer: the empty string for the root,
/// `/a/0/b` below it, with `~` and `/` in property names escaped as `~0`
/// and `~1`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NodePath {
    segments: Vec<Segment>,
}

impl NodePath {
    /// The document root.
    pub fn root() -> Self {
        Self::default()
    }

    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// Path of the property `key` under this node.
    pub fn child_key(&self, key: &str) -> Self {
        let mut segments = self.segments.clone();
        segments.push(Segment::Key(key.to_string()));
        Self { segments }
    }

    /// Path of the array element `index` under this node.
    pub fn child_index(&self, index: usize) -> Self {
        let mut segments = self.segments.clone();
        segments.push(Segment::Index(index));
        Self { segments }
    }

    /// Path extended by a resolved selector path relative to this node.
    pub fn join(&self, relative: &[Segment]) -> Self {
        let mut segments = self.segments.clone();
        segments.extend(relative.iter().cloned());
        Self { segments }
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// The JSON Pointer text for this location.
    pub fn pointer(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for NodePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.segments.is_empty() {
            // RFC 6901 renders the root as the empty string; show something
            // readable in error messages instead.
            return write!(f, "(document root)");
        }
        for segment in &self.segments {
            write!(f, "{segment}")?;
        }
        Ok(())
    }
}

/// Escape a property name per RFC 6901. `~` must be rewritten before `/`.
fn escape(component: &str) -> String {
    if !component.contains(['~', '/']) {
        return component.to_string();
    }
    component.replace('~', "~0").replace('/', "~1")
}
