//! Validator behavior over the public text-level API.

use jdt_core::{transform, validate, validate_transform, Error, ErrorKind};
use serde_json::json;

#[test]
fn accepts_every_transform_the_engine_accepts() {
    // each of these merges cleanly against at least one source
    let transforms = [
        r#"{}"#,
        r#"{"version": "2.0.0"}"#,
        r#"{"@jdt.remove": ["password"]}"#,
        r#"{"@jdt.rename": {"a": "b"}}"#,
        r#"{"@jdt.replace": {"@jdt.path": "$.a", "@jdt.value": 1}}"#,
        r#"{"@jdt.merge": {"@jdt.key": "id", "@jdt.value": [{"id": 1}]}}"#,
        r#"{"cfg": {"@jdt.default": {"timeout": 30}}}"#,
        r#"{"cfg": {"@jdt.attributes": {"owner": "ops"}}}"#,
        r#"{"list": {"@jdt.add": [1]}}"#,
        r#"5"#,
        r#"[1, 2]"#,
    ];
    for text in transforms {
        validate_transform(text).unwrap_or_else(|e| panic!("rejected {text}: {e}"));
    }
}

#[test]
fn rejects_unknown_prefixed_keys() {
    let err = validate_transform(r#"{"@jdt.frobnicate": 1}"#).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidTransform);
}

#[test]
fn rejects_malformed_transform_json() {
    let err = validate_transform(r#"{"a": }"#).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Parse);
}

#[test]
fn reports_every_problem_with_its_path() {
    let err = validate_transform(
        r#"{
            "good": {"x": 1},
            "bad1": {"@jdt.unknown": 1},
            "bad2": {"@jdt.add": "scalar"},
            "bad3": {"@jdt.value": 1, "@jdt.merge": {}}
        }"#,
    )
    .unwrap_err();
    let Error::InvalidTransform { errors } = err else {
        panic!("expected InvalidTransform");
    };
    assert_eq!(errors.len(), 3);
    let paths: Vec<&str> = errors.iter().map(|e| e.path.as_str()).collect();
    assert_eq!(paths, ["/bad1", "/bad2", "/bad3"]);
}

#[test]
fn validation_agrees_with_the_engine_on_directive_shape() {
    // every transform the validator rejects must also fail to merge
    let rejected = [
        r#"{"@jdt.unknown": 1}"#,
        r#"{"@jdt.remove": 42}"#,
        r#"{"@jdt.rename": {"a": 1}}"#,
        r#"{"@jdt.replace": {"@jdt.path": "$.a"}}"#,
        r#"{"@jdt.value": 1, "@jdt.default": 2}"#,
        r#"{"x": {"@jdt.path": "$.a"}}"#,
    ];
    for text in rejected {
        assert!(validate_transform(text).is_err(), "validator accepted {text}");
        assert!(
            transform(r#"{"a": 1, "x": {}}"#, text).is_err(),
            "engine accepted {text}"
        );
    }
}

#[test]
fn value_level_validate_returns_the_error_list() {
    let errors = validate(&json!({"@jdt.explode": true}));
    assert_eq!(errors.len(), 1);
    assert!(errors[0].message.contains("@jdt.explode"));
    assert_eq!(errors[0].path, "(document root)");

    assert!(validate(&json!({"a": 1})).is_empty());
}

#[test]
fn merge_key_fields_are_not_checked_statically() {
    // the key field may or may not exist in a source array; only merge
    // time can tell, so the validator accepts it either way
    validate_transform(
        r#"{"items": {"@jdt.merge": {"@jdt.key": "no_such_field", "@jdt.value": [{"id": 1}]}}}"#,
    )
    .unwrap();
}
