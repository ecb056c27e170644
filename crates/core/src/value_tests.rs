// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use proptest::prelude::*;
use serde_json::json;

fn path(raw: &str) -> Path {
    Path::from_url_path(raw)
}

#[test]
fn get_root_returns_whole_document() {
    let doc = json!({"a": 1});
    assert_eq!(get(&doc, &Path::root()), Some(&doc));
}

#[test]
fn get_descends_object_keys() {
    let doc = json!({"users": {"1": {"name": "Alice"}}});
    assert_eq!(get(&doc, &path("/users/1/name")), Some(&json!("Alice")));
    assert_eq!(get(&doc, &path("/users/2")), None);
}

#[test]
fn get_does_not_descend_into_arrays() {
    let doc = json!({"xs": [1, 2, 3]});
    assert_eq!(get(&doc, &path("/xs")), Some(&json!([1, 2, 3])));
    assert_eq!(get(&doc, &path("/xs/0")), None);
}

#[test]
fn get_on_scalar_intermediate_is_none() {
    let doc = json!({"x": 5});
    assert_eq!(get(&doc, &path("/x/y")), None);
}

#[test]
fn put_at_root_replaces_document() {
    assert_eq!(put(json!({"old": true}), &Path::root(), json!(42)), json!(42));
}

#[test]
fn put_creates_missing_intermediates() {
    let doc = put(Value::Null, &path("/a/b/c"), json!(1));
    assert_eq!(doc, json!({"a": {"b": {"c": 1}}}));
}

#[test]
fn put_overwrites_non_object_intermediate() {
    let doc = put(json!({"x": 5}), &path("/x/y"), json!(7));
    assert_eq!(doc, json!({"x": {"y": 7}}));
}

#[test]
fn put_preserves_sibling_keys() {
    let doc = put(json!({"a": 1, "b": 2}), &path("/b"), json!(3));
    assert_eq!(doc, json!({"a": 1, "b": 3}));
}

#[test]
fn put_existing_key_keeps_insertion_order() {
    let doc = json!({"a": 1, "b": 2, "c": 3});
    let doc = put(doc, &path("/b"), json!(9));
    assert_eq!(serde_json::to_string(&doc).unwrap(), r#"{"a":1,"b":9,"c":3}"#);
}

#[test]
fn delete_removes_final_key() {
    let doc = delete(json!({"a": {"b": 1, "c": 2}}), &path("/a/b"));
    assert_eq!(doc, json!({"a": {"c": 2}}));
}

#[test]
fn delete_root_yields_null() {
    assert_eq!(delete(json!({"a": 1}), &Path::root()), Value::Null);
}

#[test]
fn delete_missing_key_is_noop() {
    let doc = json!({"a": {"b": 1}});
    assert_eq!(delete(doc.clone(), &path("/a/x")), doc);
    assert_eq!(delete(doc.clone(), &path("/x/y")), doc);
}

#[test]
fn delete_through_scalar_is_noop() {
    let doc = json!({"a": 5});
    assert_eq!(delete(doc.clone(), &path("/a/b")), doc);
}

#[test]
fn delete_preserves_insertion_order() {
    let doc = json!({"a": 1, "b": 2, "c": 3});
    let doc = delete(doc, &path("/b"));
    assert_eq!(serde_json::to_string(&doc).unwrap(), r#"{"a":1,"c":3}"#);
}

#[test]
fn numbers_round_trip_without_precision_loss() {
    let raw = r#"{"big":9007199254740993,"dec":0.30000000000000004}"#;
    let doc: Value = serde_json::from_str(raw).unwrap();
    assert_eq!(serde_json::to_string(&doc).unwrap(), raw);
}

fn arb_value() -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(|n| json!(n)),
        "[a-z]{0,6}".prop_map(Value::String),
    ];
    leaf.prop_recursive(3, 24, 4, |inner| {
        prop_oneof![
            proptest::collection::vec(inner.clone(), 0..4).prop_map(Value::Array),
            proptest::collection::vec(("[a-z]{1,3}", inner), 0..4)
                .prop_map(|entries| Value::Object(entries.into_iter().collect())),
        ]
    })
}

fn arb_path() -> impl Strategy<Value = Path> {
    proptest::collection::vec("[a-z]{1,3}", 0..4).prop_map(Path::new)
}

fn arb_nonroot_path() -> impl Strategy<Value = Path> {
    proptest::collection::vec("[a-z]{1,3}", 1..4).prop_map(Path::new)
}

proptest! {
    #[test]
    fn reading_back_a_put_returns_the_value(
        doc in arb_value(),
        p in arb_path(),
        new in arb_value(),
    ) {
        let doc = put(doc, &p, new.clone());
        prop_assert_eq!(get(&doc, &p), Some(&new));
    }

    #[test]
    fn deleting_a_put_removes_it(
        doc in arb_value(),
        p in arb_nonroot_path(),
        new in arb_value(),
    ) {
        let doc = delete(put(doc, &p, new), &p);
        prop_assert_eq!(get(&doc, &p), None);
    }

    #[test]
    fn deleting_an_absent_path_changes_nothing(
        doc in arb_value(),
        p in arb_nonroot_path(),
    ) {
        prop_assume!(get(&doc, &p).is_none());
        prop_assert_eq!(delete(doc.clone(), &p), doc);
    }

    #[test]
    fn disjoint_puts_commute(
        doc in arb_value(),
        a in arb_nonroot_path(),
        b in arb_nonroot_path(),
        x in arb_value(),
        y in arb_value(),
    ) {
        prop_assume!(!a.starts_with(b.segments()) && !b.starts_with(a.segments()));
        let ab = put(put(doc.clone(), &a, x.clone()), &b, y.clone());
        let ba = put(put(doc, &b, y), &a, x);
        prop_assert_eq!(get(&ab, &a), get(&ba, &a));
        prop_assert_eq!(get(&ab, &b), get(&ba, &b));
    }
}
