//! The merge engine
//!
//! Recursively walks the transform and source trees in parallel and builds
//! the output tree. Per transform node the engine decodes the directive set
//! once, then applies the tiers in fixed precedence — remove, rename, base
//! value (replace/value/default/merge), attributes, add, and finally the
//! plain-key overlay — so the outcome never depends on key order in the
//! transform text. A removed node short-circuits: nothing later merges into
//! it.

mod arrays;

use crate::directive::{
    self, BaseDirective, DirectiveSet, MergeSpec, RemoveSpec, RenameSpec, ReplaceSpec,
};
use crate::error::{Error, Result};
use crate::path::{NodePath, Segment};
use crate::selector::Selector;
use log::{debug, trace};
use serde_json::{Map, Value};
use std::cmp::Ordering;
use std::collections::HashSet;

/// Apply a transform tree to a source tree, producing the output tree.
pub(crate) fn apply(source: &Value, transform: &Value) -> Result<Value> {
    debug!("applying transform to document");
    let merged = merge_node(Some(source.clone()), transform, &NodePath::root())?;
    if merged.renamed.is_some() {
        return Err(Error::MalformedDirectiveArgument {
            directive: directive::RENAME,
            path: NodePath::root().to_string(),
            message: "the document root has no key to rename".to_string(),
        });
    }
    // Root removal errors inside the remove tier, so a value is always left.
    Ok(merged.value.unwrap_or(Value::Null))
}

/// What merging one node produced.
pub(super) struct Merged {
    /// The merged value; `None` means the node was removed and its parent
    /// must drop the entry.
    pub value: Option<Value>,
    /// New key for the entry in the parent object, if the node renamed
    /// itself.
    pub renamed: Option<String>,
}

impl Merged {
    fn kept(value: Value) -> Self {
        Self {
            value: Some(value),
            renamed: None,
        }
    }

    fn removed() -> Self {
        Self {
            value: None,
            renamed: None,
        }
    }
}

pub(super) fn merge_node(
    source: Option<Value>,
    transform: &Value,
    path: &NodePath,
) -> Result<Merged> {
    let Value::Object(tnode) = transform else {
        // Plain overlay: a non-object transform value replaces the source
        // value wholesale, arrays included.
        trace!("overlay at {path}");
        return Ok(Merged::kept(transform.clone()));
    };

    let set = DirectiveSet::classify(tnode, path)?;
    let plain: Vec<(&String, &Value)> = tnode
        .iter()
        .filter(|(key, _)| !directive::is_reserved(key))
        .collect();

    if set.is_empty() {
        return merge_plain_object(source, &plain, path);
    }

    let mut base = source;
    let mut renamed = None;

    // Tier 1: remove. A removed node halts; nothing later applies to it.
    for spec in &set.remove {
        trace!("remove at {path}");
        match spec {
            RemoveSpec::Name(name) => match &mut base {
                Some(Value::Object(map)) => {
                    // Absent keys are a no-op: remove is idempotent.
                    map.shift_remove(name);
                }
                Some(other) => return Err(type_mismatch(directive::REMOVE, path, "an object", other)),
                None => {}
            },
            RemoveSpec::Node => {
                if path.is_root() {
                    return Err(root_violation(directive::REMOVE, "cannot remove the document root"));
                }
                return Ok(Merged::removed());
            }
            RemoveSpec::Noop => {}
            RemoveSpec::Selected(selector) => {
                if let Some(value) = &mut base {
                    if remove_selected(value, selector, path)? {
                        return Ok(Merged::removed());
                    }
                }
            }
        }
    }

    // Tier 2: rename. Self-renames are recorded for the parent to apply.
    for spec in &set.rename {
        trace!("rename at {path}");
        match spec {
            RenameSpec::Node(new_name) => {
                if path.is_root() {
                    return Err(root_violation(
                        directive::RENAME,
                        "the document root has no key to rename",
                    ));
                }
                renamed = Some(new_name.clone());
            }
            RenameSpec::Names(pairs) => match &mut base {
                Some(Value::Object(map)) => {
                    let owned = std::mem::take(map);
                    *map = rename_keys(owned, pairs);
                }
                Some(other) => return Err(type_mismatch(directive::RENAME, path, "an object", other)),
                None => {}
            },
            RenameSpec::Selected { selector, new_name } => {
                if let Some(value) = &mut base {
                    rename_selected(value, selector, new_name, path)?;
                }
            }
        }
    }

    // Tier 3: base value.
    match &set.base {
        None => {}
        Some(BaseDirective::Replace(specs)) => {
            for spec in specs {
                trace!("replace at {path}");
                match spec {
                    ReplaceSpec::Literal(value) => base = Some(value.clone()),
                    ReplaceSpec::Selected { selector, value } => {
                        if let Some(current) = &mut base {
                            replace_selected(current, selector, value);
                        }
                    }
                }
            }
        }
        Some(BaseDirective::Value(value)) => {
            trace!("value at {path}");
            base = Some(value.clone());
        }
        Some(BaseDirective::Default(value)) => {
            if base.is_none() {
                trace!("default applied at {path}");
                base = Some(value.clone());
            }
        }
        Some(BaseDirective::Merge(specs)) => {
            for spec in specs {
                trace!("merge at {path}");
                match spec {
                    MergeSpec::Positional(overlay) => {
                        match base.take().unwrap_or_else(|| Value::Array(Vec::new())) {
                            Value::Array(elements) => {
                                base = Some(Value::Array(arrays::merge_positional(
                                    elements, overlay, path,
                                )?));
                            }
                            other => {
                                return Err(type_mismatch(directive::MERGE, path, "an array", &other))
                            }
                        }
                    }
                    MergeSpec::Nested(node) => {
                        let merged = merge_node(base.take(), &Value::Object(node.clone()), path)?;
                        if merged.value.is_none() {
                            return Ok(Merged::removed());
                        }
                        if merged.renamed.is_some() {
                            renamed = merged.renamed;
                        }
                        base = merged.value;
                    }
                    MergeSpec::Selected {
                        selector,
                        key_field,
                        value,
                    } => {
                        if merge_selected(&mut base, selector.as_ref(), key_field.as_deref(), value, path)? {
                            return Ok(Merged::removed());
                        }
                    }
                }
            }
        }
    }

    // Tier 4: attributes — a shallow overlay onto the base object.
    for attributes in &set.attributes {
        match base.get_or_insert_with(|| Value::Object(Map::new())) {
            Value::Object(map) => {
                for (name, value) in attributes {
                    map.insert(name.clone(), value.clone());
                }
            }
            other => return Err(type_mismatch(directive::ATTRIBUTES, path, "an object", other)),
        }
    }

    // Tier 5: add — append to the base array.
    for elements in &set.add {
        match base.get_or_insert_with(|| Value::Array(Vec::new())) {
            Value::Array(array) => array.extend(elements.iter().cloned()),
            other => return Err(type_mismatch(directive::ADD, path, "an array", other)),
        }
    }

    // Tier 6: remaining plain keys merge into whatever the directives left.
    if !plain.is_empty() {
        let merged = merge_plain_object(base, &plain, path)?;
        base = merged.value;
    }

    Ok(Merged {
        // A node that produced nothing (e.g. only no-op removes against an
        // absent source) still stands as an empty object.
        value: Some(base.unwrap_or_else(|| Value::Object(Map::new()))),
        renamed,
    })
}

/// The directive-free overlay for an object transform node.
fn merge_plain_object(
    source: Option<Value>,
    plain: &[(&String, &Value)],
    path: &NodePath,
) -> Result<Merged> {
    match source {
        Some(Value::Object(map)) => Ok(Merged::kept(Value::Object(merge_objects(
            map, plain, path,
        )?))),
        // An empty object is an identity overlay: it asserts nothing, so
        // any source value passes through unchanged.
        Some(other) if plain.is_empty() => Ok(Merged::kept(other)),
        _ => Ok(Merged::kept(Value::Object(merge_objects(
            Map::new(),
            plain,
            path,
        )?))),
    }
}

/// Key-by-key union merge of two objects: source key order is preserved,
/// new transform keys append in transform document order.
fn merge_objects(
    source: Map<String, Value>,
    plain: &[(&String, &Value)],
    path: &NodePath,
) -> Result<Map<String, Value>> {
    let source_keys: HashSet<String> = source.keys().cloned().collect();
    let mut out = Map::new();

    for (key, source_value) in source {
        let overlay = plain.iter().copied().find(|(k, _)| k.as_str() == key);
        match overlay {
            Some((_, transform_value)) => {
                let merged = merge_node(Some(source_value), transform_value, &path.child_key(&key))?;
                if let Some(value) = merged.value {
                    out.insert(merged.renamed.unwrap_or(key), value);
                }
            }
            None => {
                out.insert(key, source_value);
            }
        }
    }

    for (key, transform_value) in plain.iter().copied() {
        if source_keys.contains(key) {
            continue;
        }
        let merged = merge_node(None, transform_value, &path.child_key(key))?;
        if let Some(value) = merged.value {
            out.insert(merged.renamed.unwrap_or_else(|| key.clone()), value);
        }
    }

    Ok(out)
}

/// Delete every node the selector matches. Returns true when the current
/// node itself matched, i.e. the caller must remove the whole entry.
fn remove_selected(value: &mut Value, selector: &Selector, path: &NodePath) -> Result<bool> {
    let mut targets = selector.select(value);
    if targets.iter().any(|t| t.is_empty()) {
        if path.is_root() {
            return Err(root_violation(
                directive::REMOVE,
                "cannot remove the document root",
            ));
        }
        return Ok(true);
    }
    // Deeper paths first, descending order among siblings, so earlier
    // removals cannot shift later targets. The full-path tiebreak makes
    // duplicate matches (e.g. `[0, 0]` unions) adjacent for dedup.
    targets.sort_by(|a, b| removal_order(a, b).then_with(|| b.cmp(a)));
    targets.dedup();
    for target in targets {
        remove_at(value, &target);
    }
    Ok(false)
}

fn removal_order(a: &[Segment], b: &[Segment]) -> Ordering {
    b.len()
        .cmp(&a.len())
        .then_with(|| match (a.last(), b.last()) {
            (Some(Segment::Index(x)), Some(Segment::Index(y))) => y.cmp(x),
            (Some(Segment::Key(x)), Some(Segment::Key(y))) => y.cmp(x),
            _ => Ordering::Equal,
        })
}

/// Rename keys of one object in place, preserving every entry's position.
fn rename_keys(source: Map<String, Value>, pairs: &[(String, String)]) -> Map<String, Value> {
    let mut out = Map::new();
    for (key, value) in source {
        let name = pairs
            .iter()
            .find(|(old, _)| *old == key)
            .map(|(_, new)| new.clone())
            .unwrap_or(key);
        out.insert(name, value);
    }
    out
}

fn rename_selected(
    value: &mut Value,
    selector: &Selector,
    new_name: &str,
    path: &NodePath,
) -> Result<()> {
    for target in selector.select(value) {
        let Some((Segment::Key(key), parent_path)) = target.split_last() else {
            return Err(Error::MalformedDirectiveArgument {
                directive: directive::RENAME,
                path: path.join(&target).to_string(),
                message: "rename target must be an object property".to_string(),
            });
        };
        let Some(Value::Object(parent)) = value_at_mut(value, parent_path) else {
            continue;
        };
        let owned = std::mem::take(parent);
        *parent = rename_keys(owned, &[(key.clone(), new_name.to_string())]);
    }
    Ok(())
}

/// Overwrite every selected node with `replacement` verbatim.
fn replace_selected(current: &mut Value, selector: &Selector, replacement: &Value) {
    for target in selector.select(current) {
        if let Some(node) = value_at_mut(current, &target) {
            *node = replacement.clone();
        }
    }
}

/// Apply an attributed merge call. Returns true when the merge removed the
/// current node outright.
fn merge_selected(
    base: &mut Option<Value>,
    selector: Option<&Selector>,
    key_field: Option<&str>,
    payload: &Value,
    path: &NodePath,
) -> Result<bool> {
    let mut removed_self = false;
    {
        let Some(current) = base.as_mut() else {
            // Nothing to merge into; selectors against an absent node match
            // nothing, which is a no-op by the same rule as remove-of-absent.
            return Ok(false);
        };
        let targets = match selector {
            Some(selector) => selector.select(current),
            None => vec![Vec::new()],
        };
        for target in targets {
            let node_path = path.join(&target);
            let Some(node) = value_at_mut(current, &target) else {
                continue;
            };
            if node.is_object() && payload.is_object() {
                // Object payloads act as a nested transform at the target.
                let merged = merge_node(Some(node.take()), payload, &node_path)?;
                if merged.renamed.is_some() {
                    return Err(Error::MalformedDirectiveArgument {
                        directive: directive::RENAME,
                        path: node_path.to_string(),
                        message: "a merge target cannot rename itself".to_string(),
                    });
                }
                match merged.value {
                    Some(value) => *node = value,
                    None => {
                        if target.is_empty() {
                            removed_self = true;
                            break;
                        }
                        remove_at(current, &target);
                    }
                }
            } else if node.is_array() && payload.is_array() {
                let overlay = payload.as_array().map(Vec::as_slice).unwrap_or(&[]);
                let Value::Array(elements) = node.take() else {
                    continue;
                };
                let merged = match key_field {
                    Some(field) => arrays::merge_keyed(elements, overlay, field, &node_path)?,
                    None => arrays::merge_positional(elements, overlay, &node_path)?,
                };
                *node = Value::Array(merged);
            } else {
                // Mismatched kinds replace, like the plain overlay.
                *node = payload.clone();
            }
        }
    }
    if removed_self {
        *base = None;
        return Ok(true);
    }
    Ok(false)
}

/// Walk to a node by resolved path, mutably.
fn value_at_mut<'a>(root: &'a mut Value, path: &[Segment]) -> Option<&'a mut Value> {
    let mut current = root;
    for segment in path {
        current = match segment {
            Segment::Key(key) => current.as_object_mut()?.get_mut(key)?,
            Segment::Index(index) => current.as_array_mut()?.get_mut(*index)?,
        };
    }
    Some(current)
}

/// Drop the entry a resolved path points at; absent targets are a no-op.
fn remove_at(root: &mut Value, target: &[Segment]) {
    let Some((last, parent_path)) = target.split_last() else {
        return;
    };
    let Some(parent) = value_at_mut(root, parent_path) else {
        return;
    };
    match (parent, last) {
        (Value::Object(map), Segment::Key(key)) => {
            map.shift_remove(key);
        }
        (Value::Array(array), Segment::Index(index)) => {
            if *index < array.len() {
                array.remove(*index);
            }
        }
        _ => {}
    }
}

fn type_mismatch(
    directive: &'static str,
    path: &NodePath,
    expected: &'static str,
    found: &Value,
) -> Error {
    Error::MergeTypeMismatch {
        directive,
        path: path.to_string(),
        expected,
        found: kind_of(found),
    }
}

fn root_violation(directive: &'static str, message: &str) -> Error {
    Error::MalformedDirectiveArgument {
        directive,
        path: NodePath::root().to_string(),
        message: message.to_string(),
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn run(source: Value, transform: Value) -> Result<Value> {
        apply(&source, &transform)
    }

    #[test]
    fn empty_transform_is_identity() {
        for doc in [
            json!({"a": 1, "b": [1, 2]}),
            json!([1, 2, 3]),
            json!("text"),
            json!(42),
            json!(null),
        ] {
            assert_eq!(run(doc.clone(), json!({})).unwrap(), doc);
        }
    }

    #[test]
    fn overlay_replaces_scalars_and_inserts_new_keys() {
        let out = run(
            json!({"name": "example", "version": "1.0.0"}),
            json!({"version": "2.0.0", "debug": true}),
        )
        .unwrap();
        assert_eq!(
            out,
            json!({"name": "example", "version": "2.0.0", "debug": true})
        );
    }

    #[test]
    fn overlay_replaces_arrays_wholesale() {
        let out = run(json!({"arr": [1, 2, 3]}), json!({"arr": [9]})).unwrap();
        assert_eq!(out, json!({"arr": [9]}));
    }

    #[test]
    fn overlay_preserves_source_key_order_and_appends_new_keys() {
        let out = run(
            json!({"z": 1, "a": 2, "m": 3}),
            json!({"new1": 1, "a": 20, "new2": 2}),
        )
        .unwrap();
        let keys: Vec<&String> = out.as_object().unwrap().keys().collect();
        assert_eq!(keys, ["z", "a", "m", "new1", "new2"]);
        assert_eq!(out["a"], json!(20));
    }

    #[test]
    fn nested_objects_merge_recursively() {
        let out = run(
            json!({"outer": {"inner": {"a": 1}}}),
            json!({"outer": {"inner": {"b": 2}}}),
        )
        .unwrap();
        assert_eq!(out, json!({"outer": {"inner": {"a": 1, "b": 2}}}));
    }

    #[test]
    fn remove_by_name_and_list() {
        let out = run(json!({"a": 1, "b": 2}), json!({"@jdt.remove": "a"})).unwrap();
        assert_eq!(out, json!({"b": 2}));

        let out = run(
            json!({"a": 1, "b": 2, "c": 3}),
            json!({"@jdt.remove": ["a", "c"]}),
        )
        .unwrap();
        assert_eq!(out, json!({"b": 2}));
    }

    #[test]
    fn remove_of_absent_key_is_a_noop() {
        let out = run(json!({"a": 1}), json!({"@jdt.remove": "missing"})).unwrap();
        assert_eq!(out, json!({"a": 1}));
    }

    #[test]
    fn remove_node_deletes_the_entry() {
        let out = run(
            json!({"keep": 1, "drop": {"x": 1}}),
            json!({"drop": {"@jdt.remove": true}}),
        )
        .unwrap();
        assert_eq!(out, json!({"keep": 1}));
    }

    #[test]
    fn remove_false_keeps_everything() {
        let out = run(json!({"a": 1}), json!({"@jdt.remove": false})).unwrap();
        assert_eq!(out, json!({"a": 1}));
    }

    #[test]
    fn remove_root_errors() {
        let err = run(json!({"a": 1}), json!({"@jdt.remove": true})).unwrap_err();
        assert!(err.to_string().contains("document root"));
    }

    #[test]
    fn remove_selected_deletes_descending_indices() {
        let out = run(
            json!({"arr": [0, 1, 2, 3]}),
            json!({"@jdt.remove": {"@jdt.path": "$.arr[0, 2]"}}),
        )
        .unwrap();
        assert_eq!(out, json!({"arr": [1, 3]}));
    }

    #[test]
    fn remove_selected_with_filter() {
        let out = run(
            json!({"items": [{"id": 1}, {"tmp": true}, {"id": 2}]}),
            json!({"@jdt.remove": {"@jdt.path": "$.items[?(@.tmp)]"}}),
        )
        .unwrap();
        assert_eq!(out, json!({"items": [{"id": 1}, {"id": 2}]}));
    }

    #[test]
    fn rename_children_in_place() {
        let out = run(
            json!({"a": 1, "b": 2, "c": 3}),
            json!({"@jdt.rename": {"b": "beta"}}),
        )
        .unwrap();
        let keys: Vec<&String> = out.as_object().unwrap().keys().collect();
        assert_eq!(keys, ["a", "beta", "c"]);
        assert_eq!(out["beta"], json!(2));
    }

    #[test]
    fn rename_self_moves_the_subtree_key() {
        let out = run(
            json!({"old": {"x": 1}, "other": 2}),
            json!({"old": {"@jdt.rename": "new"}}),
        )
        .unwrap();
        let keys: Vec<&String> = out.as_object().unwrap().keys().collect();
        assert_eq!(keys, ["new", "other"]);
        assert_eq!(out["new"], json!({"x": 1}));
    }

    #[test]
    fn rename_self_merges_before_renaming() {
        let out = run(
            json!({"old": {"x": 1}}),
            json!({"old": {"@jdt.rename": "new", "y": 2}}),
        )
        .unwrap();
        assert_eq!(out, json!({"new": {"x": 1, "y": 2}}));
    }

    #[test]
    fn rename_selected_property() {
        let out = run(
            json!({"a": 1, "b": 2}),
            json!({"@jdt.rename": {"@jdt.path": "$.a", "@jdt.value": "alpha"}}),
        )
        .unwrap();
        assert_eq!(out, json!({"alpha": 1, "b": 2}));
    }

    #[test]
    fn rename_root_errors() {
        let err = run(
            json!({"a": 1}),
            json!({"@jdt.rename": {"@jdt.path": "$", "@jdt.value": "new"}}),
        )
        .unwrap_err();
        assert!(err.to_string().contains("object property"));
    }

    #[test]
    fn replace_literal_and_selected() {
        let out = run(json!({"a": 1}), json!({"@jdt.replace": {"x": 99}})).unwrap();
        assert_eq!(out, json!({"x": 99}));

        let out = run(
            json!({"a": 1, "b": 2}),
            json!({"@jdt.replace": {"@jdt.path": "$.a", "@jdt.value": 99}}),
        )
        .unwrap();
        assert_eq!(out, json!({"a": 99, "b": 2}));
    }

    #[test]
    fn replace_then_plain_keys_overlay_the_replacement() {
        let out = run(
            json!({"cfg": {"a": 1}}),
            json!({"cfg": {"@jdt.replace": {"x": 1}, "y": 2}}),
        )
        .unwrap();
        assert_eq!(out, json!({"cfg": {"x": 1, "y": 2}}));
    }

    #[test]
    fn value_directive_is_verbatim() {
        let out = run(
            json!({"k": {"a": 1}}),
            json!({"k": {"@jdt.value": {"@literal": true}}}),
        )
        .unwrap();
        assert_eq!(out, json!({"k": {"@literal": true}}));
    }

    #[test]
    fn default_applies_only_when_source_lacks_the_path() {
        let out = run(json!({"a": 1}), json!({"a": {"@jdt.default": 9}})).unwrap();
        assert_eq!(out, json!({"a": 1}));

        let out = run(json!({}), json!({"a": {"@jdt.default": 9}})).unwrap();
        assert_eq!(out, json!({"a": 9}));
    }

    #[test]
    fn attributes_overlay_scalars_without_touching_others() {
        let out = run(
            json!({"svc": {"name": "s", "port": 80}}),
            json!({"svc": {"@jdt.attributes": {"port": 8080, "tls": true}}}),
        )
        .unwrap();
        assert_eq!(out, json!({"svc": {"name": "s", "port": 8080, "tls": true}}));
    }

    #[test]
    fn attributes_on_non_object_is_a_type_mismatch() {
        let err = run(
            json!({"svc": [1]}),
            json!({"svc": {"@jdt.attributes": {"a": 1}}}),
        )
        .unwrap_err();
        assert!(matches!(err, Error::MergeTypeMismatch { .. }));
    }

    #[test]
    fn add_appends_to_arrays() {
        let out = run(json!({"arr": [1, 2]}), json!({"arr": {"@jdt.add": [3, 4]}})).unwrap();
        assert_eq!(out, json!({"arr": [1, 2, 3, 4]}));
    }

    #[test]
    fn add_creates_the_array_when_absent() {
        let out = run(json!({}), json!({"arr": {"@jdt.add": [1]}})).unwrap();
        assert_eq!(out, json!({"arr": [1]}));
    }

    #[test]
    fn add_on_non_array_is_a_type_mismatch() {
        let err = run(json!({"arr": {}}), json!({"arr": {"@jdt.add": [1]}})).unwrap_err();
        assert!(matches!(err, Error::MergeTypeMismatch { .. }));
    }

    #[test]
    fn merge_positional_at_node() {
        let out = run(
            json!({"arr": [{"a": 1}, {"b": 2}]}),
            json!({"arr": {"@jdt.merge": [{"a": 9}]}}),
        )
        .unwrap();
        assert_eq!(out, json!({"arr": [{"a": 9}, {"b": 2}]}));
    }

    #[test]
    fn merge_keyed_at_node() {
        let out = run(
            json!({"items": [{"id": 1, "v": "a"}, {"id": 2, "v": "b"}]}),
            json!({"items": {"@jdt.merge": {"@jdt.key": "id", "@jdt.value": [{"id": 2, "v": "B"}]}}}),
        )
        .unwrap();
        assert_eq!(out, json!({"items": [{"id": 1, "v": "a"}, {"id": 2, "v": "B"}]}));
    }

    #[test]
    fn merge_selected_object_payload() {
        let out = run(
            json!({"items": {"x": 1}}),
            json!({"@jdt.merge": {"@jdt.path": "$.items", "@jdt.value": {"y": 2}}}),
        )
        .unwrap();
        assert_eq!(out, json!({"items": {"x": 1, "y": 2}}));
    }

    #[test]
    fn merge_scalar_payload_replaces_the_target() {
        let out = run(
            json!({"a": {"x": 1}, "b": 2}),
            json!({"@jdt.merge": {"@jdt.path": "$.b", "@jdt.value": "replaced"}}),
        )
        .unwrap();
        assert_eq!(out, json!({"a": {"x": 1}, "b": "replaced"}));
    }

    #[test]
    fn merge_nested_transform_runs_directives() {
        let out = run(
            json!({"a": 1, "b": 2}),
            json!({"@jdt.merge": {"@jdt.remove": "a", "c": 3}}),
        )
        .unwrap();
        assert_eq!(out, json!({"b": 2, "c": 3}));
    }

    #[test]
    fn merge_positional_on_non_array_is_a_type_mismatch() {
        let err = run(json!({"a": {}}), json!({"a": {"@jdt.merge": [1]}})).unwrap_err();
        assert!(matches!(err, Error::MergeTypeMismatch { .. }));
    }

    #[test]
    fn directives_run_before_the_plain_overlay() {
        // remove runs first, so "a" is gone before "b" merges in
        let out = run(json!({"a": 1}), json!({"@jdt.remove": "a", "b": 2})).unwrap();
        assert_eq!(out, json!({"b": 2}));
    }

    #[test]
    fn transform_under_absent_key_builds_from_nothing() {
        let out = run(json!({}), json!({"k": {"@jdt.remove": "x", "a": 1}})).unwrap();
        assert_eq!(out, json!({"k": {"a": 1}}));
    }

    #[test]
    fn non_object_roots_follow_overlay_rules() {
        assert_eq!(run(json!([1, 2]), json!({})).unwrap(), json!([1, 2]));
        assert_eq!(run(json!(5), json!({"a": 1})).unwrap(), json!({"a": 1}));
        assert_eq!(run(json!({"a": 1}), json!(7)).unwrap(), json!(7));
    }
}
