//! Array pairing strategies for the merge directive
//!
//! Two arrays only ever merge element-wise under an explicit `@jdt.merge`;
//! the default overlay replaces arrays wholesale. Pairing is positional
//! unless the call names a key field, in which case elements pair by
//! equality of that field's value.

use super::{merge_node, Merged};
use crate::directive;
use crate::error::{Error, Result};
use crate::path::NodePath;
use serde_json::Value;

/// Pair elements by index. Merged pairs recurse; whichever side is longer
/// keeps its trailing elements unmodified.
pub(super) fn merge_positional(
    source: Vec<Value>,
    overlay: &[Value],
    path: &NodePath,
) -> Result<Vec<Value>> {
    let mut out = Vec::with_capacity(source.len().max(overlay.len()));
    let mut source = source.into_iter();
    for (index, element) in overlay.iter().enumerate() {
        let merged = merge_node(source.next(), element, &path.child_index(index))?;
        push_element(&mut out, merged, &path.child_index(index))?;
    }
    out.extend(source);
    Ok(out)
}

/// Pair elements by equality of `key_field`. Source order is retained,
/// unmatched transform elements append in document order, and unmatched
/// source elements survive untouched. Elements lacking the key field never
/// pair.
pub(super) fn merge_keyed(
    source: Vec<Value>,
    overlay: &[Value],
    key_field: &str,
    path: &NodePath,
) -> Result<Vec<Value>> {
    // Option slots so a removal mid-merge cannot shift later pairings.
    let mut slots: Vec<Option<Value>> = source.into_iter().map(Some).collect();
    let mut appended = Vec::new();

    for element in overlay {
        let key = element.as_object().and_then(|o| o.get(key_field));
        let position = key.and_then(|key| {
            slots.iter().position(|slot| {
                slot.as_ref()
                    .and_then(|v| v.as_object())
                    .and_then(|o| o.get(key_field))
                    == Some(key)
            })
        });
        match position {
            Some(index) => {
                let merged = merge_node(slots[index].take(), element, &path.child_index(index))?;
                reject_rename(&merged, &path.child_index(index))?;
                slots[index] = merged.value;
            }
            None => {
                let index = slots.len() + appended.len();
                let merged = merge_node(None, element, &path.child_index(index))?;
                push_element(&mut appended, merged, &path.child_index(index))?;
            }
        }
    }

    let mut out: Vec<Value> = slots.into_iter().flatten().collect();
    out.append(&mut appended);
    Ok(out)
}

fn push_element(out: &mut Vec<Value>, merged: Merged, path: &NodePath) -> Result<()> {
    reject_rename(&merged, path)?;
    if let Some(value) = merged.value {
        out.push(value);
    }
    Ok(())
}

fn reject_rename(merged: &Merged, path: &NodePath) -> Result<()> {
    if merged.renamed.is_some() {
        return Err(Error::MalformedDirectiveArgument {
            directive: directive::RENAME,
            path: path.to_string(),
            message: "an array element has no key to rename".to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn array(value: Value) -> Vec<Value> {
        value.as_array().cloned().unwrap_or_default()
    }

    #[test]
    fn positional_merges_pairwise() {
        let out = merge_positional(
            array(json!([{"a": 1}, {"b": 2}])),
            &array(json!([{"a": 10}, {"c": 3}])),
            &NodePath::root(),
        )
        .unwrap();
        assert_eq!(Value::Array(out), json!([{"a": 10}, {"b": 2, "c": 3}]));
    }

    #[test]
    fn positional_keeps_the_longer_tail() {
        let out = merge_positional(
            array(json!([1, 2, 3])),
            &array(json!([9])),
            &NodePath::root(),
        )
        .unwrap();
        assert_eq!(Value::Array(out), json!([9, 2, 3]));

        let out = merge_positional(array(json!([1])), &array(json!([9, 8, 7])), &NodePath::root())
            .unwrap();
        assert_eq!(Value::Array(out), json!([9, 8, 7]));
    }

    #[test]
    fn keyed_pairs_by_field_equality() {
        let out = merge_keyed(
            array(json!([{"id": 1, "v": "a"}, {"id": 2, "v": "b"}])),
            &array(json!([{"id": 2, "v": "B"}])),
            "id",
            &NodePath::root(),
        )
        .unwrap();
        assert_eq!(
            Value::Array(out),
            json!([{"id": 1, "v": "a"}, {"id": 2, "v": "B"}])
        );
    }

    #[test]
    fn keyed_appends_unmatched_transform_elements() {
        let out = merge_keyed(
            array(json!([{"id": 1}])),
            &array(json!([{"id": 3, "v": "new"}, {"no_key": true}])),
            "id",
            &NodePath::root(),
        )
        .unwrap();
        assert_eq!(
            Value::Array(out),
            json!([{"id": 1}, {"id": 3, "v": "new"}, {"no_key": true}])
        );
    }

    #[test]
    fn keyed_removal_drops_the_paired_element() {
        let out = merge_keyed(
            array(json!([{"id": 1}, {"id": 2}])),
            &array(json!([{"id": 1, "@jdt.remove": true}])),
            "id",
            &NodePath::root(),
        )
        .unwrap();
        assert_eq!(Value::Array(out), json!([{"id": 2}]));
    }
}
