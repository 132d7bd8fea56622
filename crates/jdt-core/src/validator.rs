//! Static validation of transform documents
//!
//! Runs the directive recognizer over every object node of a transform
//! without a source document, collecting every problem instead of stopping
//! at the first: unknown directives, misplaced attribute keys, malformed
//! argument shapes, and conflicting directive pairs. Paths point into the
//! transform document.
//!
//! What the validator cannot check without a source — whether a merge key
//! field actually exists in the source arrays — is deferred to merge time.

use crate::directive::{self, BaseDirective, Decoded, MergeSpec};
use crate::path::NodePath;
use serde::Serialize;
use serde_json::{Map, Value};
use std::fmt;

/// One problem found in a transform document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationError {
    /// JSON Pointer of the offending node within the transform document.
    pub path: String,
    pub message: String,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Check a transform tree. An empty result means the transform is valid.
pub fn validate(transform: &Value) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    check_transform_position(transform, &NodePath::root(), &mut errors);
    errors
}

/// A value sitting where the engine would interpret it as a transform.
/// Only objects carry directives; scalars and arrays are literal overlays.
fn check_transform_position(value: &Value, path: &NodePath, errors: &mut Vec<ValidationError>) {
    if let Value::Object(node) = value {
        check_object(node, path, errors);
    }
}

fn check_object(node: &Map<String, Value>, path: &NodePath, errors: &mut Vec<ValidationError>) {
    let mut base_seen: Option<&'static str> = None;

    for (key, arg) in node {
        match directive::decode_key(key, arg, path) {
            Err(err) => errors.push(ValidationError {
                path: path.pointer(),
                message: err.to_string(),
            }),
            Ok(None) => {
                // Plain data: object values are nested transforms.
                check_transform_position(arg, &path.child_key(key), errors);
            }
            Ok(Some(decoded)) => {
                if let Decoded::Base(base) = &decoded {
                    match base_seen {
                        Some(first) => errors.push(ValidationError {
                            path: path.pointer(),
                            message: format!(
                                "conflicting directives '{first}' and '{}' at {path}",
                                base.name()
                            ),
                        }),
                        None => base_seen = Some(base.name()),
                    }
                }
                // Merge payloads are themselves transforms; every other
                // directive payload is verbatim and stays unchecked.
                if let Decoded::Base(BaseDirective::Merge(specs)) = decoded {
                    let payload_path = path.child_key(key);
                    for spec in specs {
                        check_merge_payload(&spec, &payload_path, errors);
                    }
                }
            }
        }
    }
}

fn check_merge_payload(spec: &MergeSpec, path: &NodePath, errors: &mut Vec<ValidationError>) {
    match spec {
        MergeSpec::Positional(elements) => {
            for (index, element) in elements.iter().enumerate() {
                check_transform_position(element, &path.child_index(index), errors);
            }
        }
        MergeSpec::Nested(node) => check_object(node, path, errors),
        // Whether an attributed call's payload is interpreted at all
        // depends on the kind of the node its selector lands on, which
        // only the source can tell. Checking it here would reject
        // transforms that merge cleanly, so it stays a merge-time concern.
        MergeSpec::Selected { .. } => {}
    }
}
