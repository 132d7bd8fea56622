//! Directive recognition
//!
//! A transform node's reserved keys (`@jdt.*`) are decoded exactly once
//! into a closed [`DirectiveSet`] before the merge engine touches the node.
//! Unknown reserved keys error rather than pass through as data, and the
//! mutually exclusive base-value directives are rejected here, so the
//! engine itself only ever sees well-formed directive sets.

use crate::error::{Error, Result};
use crate::path::NodePath;
use crate::selector::Selector;
use serde_json::{Map, Value};

/// The reserved key namespace.
pub(crate) const PREFIX: &str = "@jdt.";

pub(crate) const REMOVE: &str = "@jdt.remove";
pub(crate) const REPLACE: &str = "@jdt.replace";
pub(crate) const RENAME: &str = "@jdt.rename";
pub(crate) const MERGE: &str = "@jdt.merge";
pub(crate) const VALUE: &str = "@jdt.value";
pub(crate) const DEFAULT: &str = "@jdt.default";
pub(crate) const ATTRIBUTES: &str = "@jdt.attributes";
pub(crate) const ADD: &str = "@jdt.add";

/// Attribute keys, legal only inside a directive's argument object.
pub(crate) const ATTR_PATH: &str = "@jdt.path";
pub(crate) const ATTR_KEY: &str = "@jdt.key";

/// True for any key in the reserved namespace, known or not.
pub(crate) fn is_reserved(key: &str) -> bool {
    key.starts_with(PREFIX)
}

/// One form of the remove directive's argument.
#[derive(Debug, Clone)]
pub(crate) enum RemoveSpec {
    /// `"name"` — delete that key from the current object.
    Name(String),
    /// `true` — delete the current node from its parent.
    Node,
    /// `false` — keep the node.
    Noop,
    /// `{"@jdt.path": ...}` — delete every matched node.
    Selected(Selector),
}

/// One form of the rename directive's argument.
#[derive(Debug, Clone)]
pub(crate) enum RenameSpec {
    /// `"name"` — rename the key the current node lives under.
    Node(String),
    /// `{"old": "new", ...}` — rename child keys in place.
    Names(Vec<(String, String)>),
    /// `{"@jdt.path": ..., "@jdt.value": "new"}` — rename matched properties.
    Selected {
        selector: Selector,
        new_name: String,
    },
}

/// One form of the replace directive's argument.
#[derive(Debug, Clone)]
pub(crate) enum ReplaceSpec {
    /// Replace the current node with this value verbatim.
    Literal(Value),
    /// Replace every matched node with `value` verbatim.
    Selected { selector: Selector, value: Value },
}

/// One form of the merge directive's argument.
#[derive(Debug, Clone)]
pub(crate) enum MergeSpec {
    /// A plain array: positional pairing with the current array value.
    Positional(Vec<Value>),
    /// A plain object: a nested transform applied at the current node.
    Nested(Map<String, Value>),
    /// An attributed call; `selector` defaults to the current node and
    /// `key_field` switches array pairing from positional to keyed.
    Selected {
        selector: Option<Selector>,
        key_field: Option<String>,
        value: Value,
    },
}

/// The directives that nominate a node's base value. At most one per node.
#[derive(Debug, Clone)]
pub(crate) enum BaseDirective {
    Replace(Vec<ReplaceSpec>),
    Value(Value),
    Default(Value),
    Merge(Vec<MergeSpec>),
}

impl BaseDirective {
    pub(crate) fn name(&self) -> &'static str {
        match self {
            BaseDirective::Replace(_) => REPLACE,
            BaseDirective::Value(_) => VALUE,
            BaseDirective::Default(_) => DEFAULT,
            BaseDirective::Merge(_) => MERGE,
        }
    }
}

/// A single decoded directive key.
pub(crate) enum Decoded {
    Remove(Vec<RemoveSpec>),
    Rename(Vec<RenameSpec>),
    Base(BaseDirective),
    Attributes(Map<String, Value>),
    Add(Vec<Value>),
}

/// Everything one transform node instructs, decoded and shape-checked.
#[derive(Debug, Default)]
pub(crate) struct DirectiveSet {
    pub remove: Vec<RemoveSpec>,
    pub rename: Vec<RenameSpec>,
    pub base: Option<BaseDirective>,
    pub attributes: Vec<Map<String, Value>>,
    pub add: Vec<Vec<Value>>,
}

impl DirectiveSet {
    /// Decode every reserved key of `node`. Fails on the first unknown
    /// directive, misplaced attribute, malformed argument, or conflicting
    /// pair; the validator uses [`decode_key`] directly to collect all of
    /// them instead.
    pub(crate) fn classify(node: &Map<String, Value>, path: &NodePath) -> Result<Self> {
        let mut set = Self::default();
        for (key, arg) in node {
            match decode_key(key, arg, path)? {
                None => {}
                Some(Decoded::Remove(specs)) => set.remove.extend(specs),
                Some(Decoded::Rename(specs)) => set.rename.extend(specs),
                Some(Decoded::Base(base)) => set.set_base(base, path)?,
                Some(Decoded::Attributes(map)) => set.attributes.push(map),
                Some(Decoded::Add(elements)) => set.add.push(elements),
            }
        }
        Ok(set)
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.remove.is_empty()
            && self.rename.is_empty()
            && self.base.is_none()
            && self.attributes.is_empty()
            && self.add.is_empty()
    }

    fn set_base(&mut self, base: BaseDirective, path: &NodePath) -> Result<()> {
        if let Some(existing) = &self.base {
            return Err(Error::ConflictingDirectives {
                first: existing.name(),
                second: base.name(),
                path: path.to_string(),
            });
        }
        self.base = Some(base);
        Ok(())
    }
}

/// Decode one key of a transform node. `Ok(None)` means the key is plain
/// data; reserved keys either decode or error.
pub(crate) fn decode_key(key: &str, arg: &Value, path: &NodePath) -> Result<Option<Decoded>> {
    if !is_reserved(key) {
        return Ok(None);
    }
    let decoded = match key {
        REMOVE => Decoded::Remove(decode_remove(arg, path)?),
        RENAME => Decoded::Rename(decode_rename(arg, path)?),
        REPLACE => Decoded::Base(BaseDirective::Replace(decode_replace(arg, path)?)),
        VALUE => Decoded::Base(BaseDirective::Value(arg.clone())),
        DEFAULT => Decoded::Base(BaseDirective::Default(arg.clone())),
        MERGE => Decoded::Base(BaseDirective::Merge(vec![decode_merge(arg, path)?])),
        ATTRIBUTES => Decoded::Attributes(decode_attributes(arg, path)?),
        ADD => Decoded::Add(decode_add(arg, path)?),
        ATTR_PATH => {
            return Err(malformed(
                ATTR_PATH,
                path,
                "attribute key is only legal inside a directive argument",
            ))
        }
        ATTR_KEY => {
            return Err(malformed(
                ATTR_KEY,
                path,
                "attribute key is only legal inside a directive argument",
            ))
        }
        unknown => {
            return Err(Error::UnknownDirective {
                name: unknown.to_string(),
                path: path.to_string(),
            })
        }
    };
    Ok(Some(decoded))
}

fn decode_remove(arg: &Value, path: &NodePath) -> Result<Vec<RemoveSpec>> {
    if let Value::Array(forms) = arg {
        return forms.iter().map(|f| decode_remove_form(f, path)).collect();
    }
    Ok(vec![decode_remove_form(arg, path)?])
}

fn decode_remove_form(form: &Value, path: &NodePath) -> Result<RemoveSpec> {
    match form {
        Value::String(name) => Ok(RemoveSpec::Name(name.clone())),
        Value::Bool(true) => Ok(RemoveSpec::Node),
        Value::Bool(false) => Ok(RemoveSpec::Noop),
        Value::Object(call) => Ok(RemoveSpec::Selected(required_selector(call, REMOVE, path)?)),
        _ => Err(malformed(
            REMOVE,
            path,
            "selector must be a string, a boolean, or an attributed object",
        )),
    }
}

fn decode_rename(arg: &Value, path: &NodePath) -> Result<Vec<RenameSpec>> {
    if let Value::Array(forms) = arg {
        return forms.iter().map(|f| decode_rename_form(f, path)).collect();
    }
    Ok(vec![decode_rename_form(arg, path)?])
}

fn decode_rename_form(form: &Value, path: &NodePath) -> Result<RenameSpec> {
    match form {
        Value::String(new_name) => Ok(RenameSpec::Node(new_name.clone())),
        Value::Object(call) if is_attributed(call) => Ok(RenameSpec::Selected {
            selector: required_selector(call, RENAME, path)?,
            new_name: required_string_value(call, RENAME, path)?,
        }),
        Value::Object(names) => {
            let mut pairs = Vec::with_capacity(names.len());
            for (old, new) in names {
                let Some(new_name) = new.as_str() else {
                    return Err(malformed(
                        RENAME,
                        path,
                        &format!("new name for '{old}' must be a string"),
                    ));
                };
                pairs.push((old.clone(), new_name.to_string()));
            }
            Ok(RenameSpec::Names(pairs))
        }
        _ => Err(malformed(
            RENAME,
            path,
            "argument must be a string or an object",
        )),
    }
}

fn decode_replace(arg: &Value, path: &NodePath) -> Result<Vec<ReplaceSpec>> {
    if let Value::Array(forms) = arg {
        return forms.iter().map(|f| decode_replace_form(f, path)).collect();
    }
    Ok(vec![decode_replace_form(arg, path)?])
}

fn decode_replace_form(form: &Value, path: &NodePath) -> Result<ReplaceSpec> {
    match form {
        Value::Object(call) if is_attributed(call) => Ok(ReplaceSpec::Selected {
            selector: required_selector(call, REPLACE, path)?,
            value: required_value(call, REPLACE, path)?,
        }),
        literal => Ok(ReplaceSpec::Literal(literal.clone())),
    }
}

fn decode_merge(arg: &Value, path: &NodePath) -> Result<MergeSpec> {
    match arg {
        Value::Array(overlay) => Ok(MergeSpec::Positional(overlay.clone())),
        Value::Object(call) if is_attributed(call) => {
            let selector = match call.get(ATTR_PATH) {
                Some(_) => Some(required_selector(call, MERGE, path)?),
                None => None,
            };
            let key_field = match call.get(ATTR_KEY) {
                Some(Value::String(field)) => Some(field.clone()),
                Some(_) => {
                    return Err(malformed(MERGE, path, "'@jdt.key' must be a string"));
                }
                None => None,
            };
            Ok(MergeSpec::Selected {
                selector,
                key_field,
                value: required_value(call, MERGE, path)?,
            })
        }
        Value::Object(nested) => Ok(MergeSpec::Nested(nested.clone())),
        _ => Err(malformed(
            MERGE,
            path,
            "argument must be an array, an object, or an attributed object",
        )),
    }
}

fn decode_attributes(arg: &Value, path: &NodePath) -> Result<Map<String, Value>> {
    let Value::Object(map) = arg else {
        return Err(malformed(ATTRIBUTES, path, "argument must be an object"));
    };
    if let Some(reserved) = map.keys().find(|k| is_reserved(k)) {
        return Err(malformed(
            ATTRIBUTES,
            path,
            &format!("attribute name '{reserved}' is in the reserved namespace"),
        ));
    }
    Ok(map.clone())
}

fn decode_add(arg: &Value, path: &NodePath) -> Result<Vec<Value>> {
    match arg {
        Value::Array(elements) => Ok(elements.clone()),
        _ => Err(malformed(ADD, path, "argument must be an array")),
    }
}

/// An argument object is an attributed call iff it uses any attribute key.
fn is_attributed(call: &Map<String, Value>) -> bool {
    call.contains_key(ATTR_PATH) || call.contains_key(VALUE) || call.contains_key(ATTR_KEY)
}

fn required_selector(
    call: &Map<String, Value>,
    directive: &'static str,
    path: &NodePath,
) -> Result<Selector> {
    let Some(raw) = call.get(ATTR_PATH) else {
        return Err(malformed(directive, path, "missing required '@jdt.path'"));
    };
    let Some(text) = raw.as_str() else {
        return Err(malformed(directive, path, "'@jdt.path' must be a string"));
    };
    Selector::parse(text)
        .map_err(|err| malformed(directive, path, &format!("invalid '@jdt.path': {err}")))
}

fn required_value(
    call: &Map<String, Value>,
    directive: &'static str,
    path: &NodePath,
) -> Result<Value> {
    call.get(VALUE)
        .cloned()
        .ok_or_else(|| malformed(directive, path, "missing required '@jdt.value'"))
}

fn required_string_value(
    call: &Map<String, Value>,
    directive: &'static str,
    path: &NodePath,
) -> Result<String> {
    match required_value(call, directive, path)? {
        Value::String(text) => Ok(text),
        _ => Err(malformed(directive, path, "'@jdt.value' must be a string")),
    }
}

fn malformed(directive: &'static str, path: &NodePath, message: &str) -> Error {
    Error::MalformedDirectiveArgument {
        directive,
        path: path.to_string(),
        message: message.to_string(),
    }
}
