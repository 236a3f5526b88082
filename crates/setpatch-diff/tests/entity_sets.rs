// SPDX-License-Identifier: MIT OR Apache-2.0
//! Entity-set reconciliation.

use serde_json::{Value, json};
use setpatch_diff::{Collections, DiffOptions, JsonPatch, PatchOperation, Strategy, json_diff_with_options};

fn simple() -> Value {
    json!({"a": 100, "t": [{"k": 1, "v": 1}, {"k": 2, "v": 2}]})
}

fn nested() -> Value {
    json!({
        "a": 100,
        "t": [
            {"k": 1, "v": [
                {"nk": 11, "c": "x", "d": [1, 2]},
                {"nk": 22, "c": "y", "d": [3, 4]}
            ]},
            {"k": 2, "v": [
                {"nk": 33, "c": "z", "d": [5, 6]}
            ]}
        ]
    })
}

fn collections() -> Collections {
    Collections::new()
        .with_entity_set("$.t", "k")
        .unwrap()
        .with_entity_set("$.t[*].v", "nk")
        .unwrap()
}

fn diff(source: &Value, target: &Value, strategy: Strategy) -> JsonPatch {
    let options = DiffOptions::new()
        .with_strategy(strategy)
        .with_collections(collections());
    json_diff_with_options(source, target, &options).unwrap()
}

fn apply(source: &Value, patch: &JsonPatch) -> Value {
    let ops: json_patch::Patch = serde_json::from_value(serde_json::to_value(patch).unwrap()).unwrap();
    let mut doc = source.clone();
    json_patch::patch(&mut doc, &ops.0).unwrap();
    doc
}

#[test]
fn test_add_item_ensure_exists_appends() {
    let patch = diff(&simple(), &json!({"t": [{"k": 3, "v": 3}]}), Strategy::EnsureExists);
    assert_eq!(
        patch.operations,
        vec![PatchOperation::add("/t/2", json!({"k": 3, "v": 3}))]
    );
}

#[test]
fn test_add_item_exact_match_replaces_membership() {
    let patch = diff(&simple(), &json!({"t": [{"k": 3, "v": 3}]}), Strategy::exact_match());
    assert_eq!(
        patch.operations,
        vec![
            PatchOperation::remove("/t/1"),
            PatchOperation::remove("/t/0"),
            PatchOperation::add("/t/0", json!({"k": 3, "v": 3})),
            PatchOperation::remove("/a"),
        ]
    );
}

#[test]
fn test_modify_item_ensure_exists_updates_in_place() {
    let patch = diff(&simple(), &json!({"t": [{"k": 2, "v": 3}]}), Strategy::EnsureExists);
    assert_eq!(patch.operations, vec![PatchOperation::replace("/t/1/v", json!(3))]);
}

#[test]
fn test_modify_item_exact_match_updates_before_removing() {
    let patch = diff(&simple(), &json!({"t": [{"k": 2, "v": 3}]}), Strategy::exact_match());
    assert_eq!(
        patch.operations,
        vec![
            PatchOperation::replace("/t/1/v", json!(3)),
            PatchOperation::remove("/t/0"),
            PatchOperation::remove("/a"),
        ]
    );
}

#[test]
fn test_existing_item_ensure_exists_is_noop() {
    let patch = diff(&simple(), &json!({"t": [{"k": 2, "v": 2}]}), Strategy::EnsureExists);
    assert!(patch.is_empty());
}

#[test]
fn test_existing_item_exact_match_removes_the_rest() {
    let patch = diff(&simple(), &json!({"t": [{"k": 2, "v": 2}]}), Strategy::exact_match());
    assert_eq!(
        patch.operations,
        vec![PatchOperation::remove("/t/0"), PatchOperation::remove("/a")]
    );
}

#[test]
fn test_reordered_entities_produce_nothing() {
    let target = json!({"a": 100, "t": [{"v": 2, "k": 2}, {"k": 1, "v": 1}]});
    assert!(diff(&simple(), &target, Strategy::exact_match()).is_empty());
    assert!(diff(&simple(), &target, Strategy::EnsureExists).is_empty());
}

#[test]
fn test_nested_entity_set_ensure_exists() {
    let target = json!({"t": [{"k": 2, "v": [{"nk": 33, "c": "zz", "d": [7, 8]}]}]});
    let patch = diff(&nested(), &target, Strategy::EnsureExists);
    assert_eq!(
        patch.operations,
        vec![
            PatchOperation::replace("/t/1/v/0/c", json!("zz")),
            PatchOperation::add("/t/1/v/0/d/2", json!(7)),
            PatchOperation::add("/t/1/v/0/d/3", json!(8)),
        ]
    );
}

#[test]
fn test_nested_entity_set_exact_match_reaches_target() {
    let target = json!({"t": [{"k": 2, "v": [{"nk": 33, "c": "zz", "d": [7, 8]}]}]});
    let patch = diff(&nested(), &target, Strategy::exact_match());
    assert_eq!(patch.count_op("remove"), 2);
    assert_eq!(apply(&nested(), &patch), target);
}

#[test]
fn test_new_nested_entity_is_appended() {
    let target = json!({"t": [{"k": 1, "v": [{"nk": 44, "c": "w", "d": []}]}]});
    let patch = diff(&nested(), &target, Strategy::EnsureExists);
    assert_eq!(
        patch.operations,
        vec![PatchOperation::add(
            "/t/0/v/2",
            json!({"nk": 44, "c": "w", "d": []})
        )]
    );
}

#[test]
fn test_identity_compares_numbers_by_value() {
    let target = json!({"a": 100, "t": [{"k": 1.0, "v": 1}, {"k": 2, "v": 2}]});
    assert!(diff(&simple(), &target, Strategy::exact_match()).is_empty());
}

#[test]
fn test_elements_without_identity_match_by_value() {
    let source = json!({"t": [{"v": 1}, 5, {"k": 1}]});
    let target = json!({"t": [5, {"v": 1}, {"k": 1}, {"v": 2}]});
    let patch = diff(&source, &target, Strategy::EnsureExists);
    assert_eq!(patch.operations, vec![PatchOperation::add("/t/3", json!({"v": 2}))]);
    assert!(diff(&source, &source, Strategy::exact_match()).is_empty());
}

#[test]
fn test_duplicate_identities_pair_in_order() {
    let source = json!({"t": [{"k": 1, "v": "a"}, {"k": 1, "v": "b"}]});
    let target = json!({"t": [{"k": 1, "v": "b"}]});
    let patch = diff(&source, &target, Strategy::exact_match());
    assert_eq!(
        patch.operations,
        vec![
            PatchOperation::replace("/t/0/v", json!("b")),
            PatchOperation::remove("/t/1"),
        ]
    );
    assert_eq!(apply(&source, &patch), target);
}

#[test]
fn test_ignored_field_inside_entities() {
    let collections = collections().with_ignored_field("$.t[*].seen").unwrap();
    let options = DiffOptions::ensure_exists(collections);
    let source = json!({"t": [{"k": 1, "v": 1, "seen": "mon"}]});
    let target = json!({"t": [{"k": 1, "v": 2, "seen": "tue"}]});
    let patch = json_diff_with_options(&source, &target, &options).unwrap();
    assert_eq!(patch.operations, vec![PatchOperation::replace("/t/0/v", json!(2))]);
}

#[test]
fn test_rule_path_must_match_exactly() {
    // `$.t` does not cover an array stored under another member
    let source = json!({"u": [{"k": 1, "v": 1}]});
    let target = json!({"u": [{"k": 1, "v": 2}, {"k": 2, "v": 2}]});
    let patch = diff(&source, &target, Strategy::EnsureExists);
    assert_eq!(
        patch.operations,
        vec![
            PatchOperation::add("/u/1", json!({"k": 1, "v": 2})),
            PatchOperation::add("/u/2", json!({"k": 2, "v": 2})),
        ]
    );
}
