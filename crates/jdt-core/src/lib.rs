//! JDT Core - engine for JSON Document Transforms
//!
//! This crate applies a JDT transform document to a source JSON document:
//! the transform is merged recursively into the source, steered by
//! `@jdt.`-prefixed directive keys (`remove`, `replace`, `rename`, `merge`,
//! `value`, `default`, `attributes`, `add`) embedded in the transform.
//!
//! # Main Components
//!
//! - **Document Model**: ordered-key JSON trees with a text boundary in
//!   [`document`]
//! - **Merge Engine**: the recursive, directive-driven tree merge behind
//!   [`transform`] and [`apply`]
//! - **Validator**: static directive checking via [`validate_transform`]
//!   and [`validate`]
//! - **Error Handling**: one closed taxonomy in [`error`], with
//!   JSON-Pointer paths on every node-level failure
//!
//! # Example
//!
//! ```
//! use jdt_core::transform;
//!
//! let source = r#"{"name":"example","version":"1.0.0"}"#;
//! let result = transform(source, r#"{"version":"2.0.0"}"#)?;
//! assert_eq!(result, r#"{"name":"example","version":"2.0.0"}"#);
//!
//! let result = transform(source, r#"{"@jdt.remove":"version"}"#)?;
//! assert_eq!(result, r#"{"name":"example"}"#);
//! # Ok::<(), jdt_core::Error>(())
//! ```

pub mod document;
pub mod error;
pub mod path;
pub mod selector;
pub mod validator;

mod directive;
mod merge;

pub use error::{Error, ErrorKind, ErrorReport, InputDocument, Result};
pub use path::{NodePath, Segment};
pub use selector::{Selector, SelectorError};
pub use validator::{validate, ValidationError};

use serde_json::Value;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// The crate's semantic version string. Never fails.
pub fn version() -> &'static str {
    VERSION
}

/// Apply a transform to a source document, both given as JSON text, and
/// return the result as compact JSON text.
///
/// # Errors
///
/// Returns an error if either input fails to parse, or if the transform
/// carries an unknown directive, conflicting directives, a malformed
/// directive argument, or a directive that does not fit the source value
/// it is applied to. Failures carry the JSON Pointer of the offending
/// node; no partial output is ever produced.
pub fn transform(source: &str, transform: &str) -> Result<String> {
    let output = transform_to_value(source, transform)?;
    Ok(document::serialize(&output, false))
}

/// Same as [`transform`], with indented output.
pub fn transform_pretty(source: &str, transform: &str) -> Result<String> {
    let output = transform_to_value(source, transform)?;
    Ok(document::serialize(&output, true))
}

/// Apply a transform tree to a source tree. The value-level counterpart of
/// [`transform`] for embedders that already hold parsed documents.
///
/// # Errors
///
/// Same directive and merge failures as [`transform`]; parsing is the
/// caller's concern here.
pub fn apply(source: &Value, transform: &Value) -> Result<Value> {
    merge::apply(source, transform)
}

/// Statically check a transform document, given as JSON text, without a
/// source document.
///
/// # Errors
///
/// Returns [`Error::Parse`] for malformed JSON and
/// [`Error::InvalidTransform`] carrying every [`ValidationError`] the
/// validator collected.
pub fn validate_transform(transform: &str) -> Result<()> {
    let tree = document::parse(transform, InputDocument::Transform)?;
    let errors = validator::validate(&tree);
    if errors.is_empty() {
        Ok(())
    } else {
        Err(Error::InvalidTransform { errors })
    }
}

/// Check whether `text` is valid JSON. Never raises; the cheap pre-check
/// counterpart of the structured parse errors elsewhere.
pub fn is_valid_json(text: &str) -> bool {
    document::is_valid_json(text)
}

fn transform_to_value(source: &str, transform: &str) -> Result<Value> {
    let source = document::parse(source, InputDocument::Source)?;
    let transform = document::parse(transform, InputDocument::Transform)?;
    merge::apply(&source, &transform)
}
