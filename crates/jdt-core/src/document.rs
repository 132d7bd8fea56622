//! Text boundary: parsing and serialization of JSON documents
//!
//! The document model itself is `serde_json::Value` built with the
//! `preserve_order` feature, so object keys keep their insertion order from
//! the input text through every merge operation. This module only owns the
//! text edges: BOM-aware parsing with structured failure positions, and
//! compact/pretty serialization.

use crate::error::{Error, InputDocument, Result};
use serde_json::Value;

/// Strip a leading UTF-8 BOM (U+FEFF) from a string, if present.
///
/// Transform files written by Windows tooling routinely carry one; the JSON
/// codec rejects it.
pub fn strip_bom(text: &str) -> &str {
    text.strip_prefix('\u{feff}').unwrap_or(text)
}

/// Parse one input document, labeling failures with its role.
pub fn parse(text: &str, document: InputDocument) -> Result<Value> {
    let clean = strip_bom(text);
    serde_json::from_str(clean).map_err(|err| {
        let line = err.line();
        let column = err.column();
        Error::Parse {
            document,
            offset: byte_offset(clean, line, column),
            line,
            column,
            message: err.to_string(),
        }
    })
}

/// Serialize a tree to text. Pretty mode uses the codec's stable two-space
/// indent; compact mode has no insignificant whitespace.
///
/// Serialization of a `Value` cannot fail; the fallback only guards the
/// signature.
pub fn serialize(value: &Value, pretty: bool) -> String {
    if pretty {
        serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
    } else {
        value.to_string()
    }
}

/// Cheap validity pre-check: parse and discard, never raise.
///
/// Uses `IgnoredAny` so no tree is built for the check.
pub fn is_valid_json(text: &str) -> bool {
    serde_json::from_str::<serde::de::IgnoredAny>(strip_bom(text)).is_ok()
}

/// Translate the codec's 1-based line/column into a byte offset.
fn byte_offset(text: &str, line: usize, column: usize) -> usize {
    if line == 0 {
        return 0;
    }
    let mut offset = 0;
    for (n, l) in text.split('\n').enumerate() {
        if n + 1 == line {
            return offset + column.saturating_sub(1).min(l.len());
        }
        offset += l.len() + 1;
    }
    text.len()
}
