//! Edge case tests for patchform-paved.

use patchform_paved::{path, MergeOptions, Paved, PavedError, Path, Segment, MAX_INDEX_PADDING};
use serde_json::json;

fn p(text: &str) -> Path {
    Path::parse(text).unwrap()
}

// ============================================================================
// get_value
// ============================================================================

#[test]
fn test_get_bracketed_key() {
    let doc = json!({"metadata": {"labels": {"app.kubernetes.io/name": "web"}}});
    let value = doc
        .get_value(&p("metadata.labels[app.kubernetes.io/name]"))
        .unwrap();
    assert_eq!(value, "web");
}

#[test]
fn test_get_index_on_object_is_type_mismatch() {
    let doc = json!({"spec": {"a": 1}});
    let err = doc.get_value(&p("spec[0]")).unwrap_err();
    assert!(matches!(err, PavedError::TypeMismatch { expected: "array", .. }));
}

#[test]
fn test_get_wildcard_is_invalid() {
    let doc = json!({"xs": [1]});
    let err = doc.get_value(&p("xs[*]")).unwrap_err();
    assert!(matches!(err, PavedError::InvalidPath { .. }));
}

#[test]
fn test_not_found_reports_prefix() {
    let doc = json!({"spec": {}});
    let err = doc.get_value(&p("spec.forProvider.region")).unwrap_err();
    assert_eq!(err.to_string(), "spec.forProvider: no such field");
}

// ============================================================================
// set_value
// ============================================================================

#[test]
fn test_set_replaces_entire_value() {
    let mut doc = json!({"user": {"name": "Alice", "age": 30}});
    doc.set_value(&p("user"), json!({"name": "Bob"})).unwrap();
    assert_eq!(doc["user"], json!({"name": "Bob"}));
}

#[test]
fn test_set_pads_sequence_with_null() {
    let mut doc = json!({"xs": [1]});
    doc.set_value(&p("xs[3]"), json!(4)).unwrap();
    assert_eq!(doc["xs"], json!([1, null, null, 4]));
}

#[test]
fn test_set_index_at_usize_max_is_out_of_bounds() {
    let mut doc = json!({"items": [1, 2]});
    let err = doc
        .set_value(&p("items[18446744073709551615]"), json!(1))
        .unwrap_err();
    assert_eq!(
        err,
        PavedError::index_out_of_bounds(path!("items"), usize::MAX, 2)
    );
    assert_eq!(doc["items"], json!([1, 2]));
}

#[test]
fn test_set_index_padding_limit() {
    let mut doc = json!({"items": []});
    let err = doc
        .set_value(&p("items[4000000000]"), json!(1))
        .unwrap_err();
    assert!(matches!(err, PavedError::IndexOutOfBounds { index: 4000000000, len: 0, .. }));

    let last = MAX_INDEX_PADDING - 1;
    doc.set_value(&Path::root().field("items").index(last), json!(1))
        .unwrap();
    assert_eq!(doc["items"].as_array().unwrap().len(), MAX_INDEX_PADDING);
    assert_eq!(doc["items"][last], 1);
}

#[test]
fn test_set_into_null_root() {
    let mut doc = serde_json::Value::Null;
    doc.set_value(&p("a[0]"), json!("x")).unwrap();
    assert_eq!(doc, json!({"a": ["x"]}));
}

#[test]
fn test_set_root_replaces_document() {
    let mut doc = json!({"a": 1});
    doc.set_value(&Path::root(), json!([1, 2])).unwrap();
    assert_eq!(doc, json!([1, 2]));
}

#[test]
fn test_set_index_into_object_fails() {
    let mut doc = json!({"spec": {"a": 1}});
    let err = doc.set_value(&p("spec[0]"), json!(1)).unwrap_err();
    assert_eq!(err, PavedError::type_mismatch(path!("spec"), "array", "object"));
}

// ============================================================================
// expand_wildcards
// ============================================================================

#[test]
fn test_expand_nested_wildcards() {
    let doc = json!({
        "spec": {"containers": [
            {"ports": [{"port": 80}, {"port": 443}]},
            {"ports": [{"port": 8080}]}
        ]}
    });
    let paths = doc
        .expand_wildcards(&p("spec.containers[*].ports[*].port"))
        .unwrap();
    let rendered: Vec<String> = paths.iter().map(ToString::to_string).collect();
    assert_eq!(
        rendered,
        vec![
            "spec.containers[0].ports[0].port",
            "spec.containers[0].ports[1].port",
            "spec.containers[1].ports[0].port",
        ]
    );
}

#[test]
fn test_expand_wildcard_over_map_entries() {
    let doc = json!({"labels": {"a": "1", "b": "2"}});
    let paths = doc.expand_wildcards(&p("labels[*]")).unwrap();
    assert_eq!(paths, vec![path!("labels", "a"), path!("labels", "b")]);
}

#[test]
fn test_expand_missing_base_is_empty() {
    let doc = json!({"metadata": {}});
    let paths = doc
        .expand_wildcards(&p("metadata.ownerReferences[*].name"))
        .unwrap();
    assert!(paths.is_empty());
}

#[test]
fn test_expand_without_wildcards_returns_existing_path() {
    let doc = json!({"a": {"b": 1}});
    assert_eq!(doc.expand_wildcards(&p("a.b")).unwrap(), vec![p("a.b")]);
    assert!(doc.expand_wildcards(&p("a.c")).unwrap().is_empty());
}

#[test]
fn test_expanded_paths_have_no_wildcards() {
    let doc = json!({"xs": [{"v": 1}, {"v": 2}]});
    for path in doc.expand_wildcards(&p("xs[*].v")).unwrap() {
        assert!(!path.has_wildcards());
        assert!(matches!(path[1], Segment::Index(_)));
    }
}

// ============================================================================
// merge_value
// ============================================================================

#[test]
fn test_merge_value_missing_destination_sets() {
    let mut doc = json!({});
    doc.merge_value(&p("spec.tags"), json!(["a"]), &MergeOptions::default())
        .unwrap();
    assert_eq!(doc, json!({"spec": {"tags": ["a"]}}));
}

#[test]
fn test_merge_value_append_slice() {
    let mut doc = json!({"spec": {"tags": ["a"]}});
    let options = MergeOptions {
        append_slice: Some(true),
        ..Default::default()
    };
    doc.merge_value(&p("spec.tags"), json!(["b"]), &options)
        .unwrap();
    assert_eq!(doc["spec"]["tags"], json!(["a", "b"]));
}

#[test]
fn test_merge_value_propagates_type_mismatch() {
    let mut doc = json!({"spec": "scalar"});
    let err = doc
        .merge_value(&p("spec.tags"), json!(["b"]), &MergeOptions::default())
        .unwrap_err();
    assert!(matches!(err, PavedError::TypeMismatch { .. }));
}
