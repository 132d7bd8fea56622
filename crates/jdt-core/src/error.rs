//! Error types for the JDT core library
//!
//! One closed taxonomy covers everything the engine can reject, using
//! thiserror for the enum and serde for the boundary-facing report record.
//! Every variant that concerns a document node carries its JSON Pointer.

use crate::validator::ValidationError;
use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// Which of the two input documents an error originated from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum InputDocument {
    Source,
    Transform,
}

impl fmt::Display for InputDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InputDocument::Source => write!(f, "source"),
            InputDocument::Transform => write!(f, "transform"),
        }
    }
}

/// Main error type for JDT operations
#[derive(Error, Debug)]
pub enum Error {
    /// Malformed JSON text in either input document
    #[error("{document} document is not valid JSON at line {line}, column {column}: {message}")]
    Parse {
        document: InputDocument,
        /// Byte offset of the failure within the (BOM-stripped) input text.
        offset: usize,
        line: usize,
        column: usize,
        message: String,
    },

    /// A reserved-prefixed key that names no known directive
    #[error("unknown directive '{name}' at {path}")]
    UnknownDirective { name: String, path: String },

    /// Two mutually exclusive directives on one transform node
    #[error("conflicting directives '{first}' and '{second}' at {path}")]
    ConflictingDirectives {
        first: &'static str,
        second: &'static str,
        path: String,
    },

    /// A directive argument with the wrong shape
    #[error("malformed argument for '{directive}' at {path}: {message}")]
    MalformedDirectiveArgument {
        directive: &'static str,
        path: String,
        message: String,
    },

    /// A directive applied where the source value has the wrong kind
    #[error("'{directive}' at {path} expects the source value to be {expected}, found {found}")]
    MergeTypeMismatch {
        directive: &'static str,
        path: String,
        expected: &'static str,
        found: &'static str,
    },

    /// Aggregate failure raised by [`crate::validate_transform`]
    #[error("transform failed validation with {} error(s)", .errors.len())]
    InvalidTransform { errors: Vec<ValidationError> },
}

/// Convenience type alias for Results using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Discriminant of an [`Error`], stable across the binding boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ErrorKind {
    Parse,
    UnknownDirective,
    ConflictingDirectives,
    MalformedDirectiveArgument,
    MergeTypeMismatch,
    InvalidTransform,
}

/// Structured `{kind, path, message}` record for the binding layer.
///
/// The binding layer maps this into whatever error convention its host
/// environment uses; the core only guarantees the three fields.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorReport {
    pub kind: ErrorKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    pub message: String,
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Parse { .. } => ErrorKind::Parse,
            Error::UnknownDirective { .. } => ErrorKind::UnknownDirective,
            Error::ConflictingDirectives { .. } => ErrorKind::ConflictingDirectives,
            Error::MalformedDirectiveArgument { .. } => ErrorKind::MalformedDirectiveArgument,
            Error::MergeTypeMismatch { .. } => ErrorKind::MergeTypeMismatch,
            Error::InvalidTransform { .. } => ErrorKind::InvalidTransform,
        }
    }

    /// JSON Pointer of the offending node, where one applies.
    pub fn path(&self) -> Option<&str> {
        match self {
            Error::Parse { .. } => None,
            Error::UnknownDirective { path, .. }
            | Error::ConflictingDirectives { path, .. }
            | Error::MalformedDirectiveArgument { path, .. }
            | Error::MergeTypeMismatch { path, .. } => Some(path),
            Error::InvalidTransform { errors } => errors.first().map(|e| e.path.as_str()),
        }
    }

    /// Build the boundary-facing record for this error.
    pub fn report(&self) -> ErrorReport {
        ErrorReport {
            kind: self.kind(),
            path: self.path().map(str::to_string),
            message: self.to_string(),
        }
    }
}
