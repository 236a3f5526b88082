// SPDX-License-Identifier: MIT OR Apache-2.0
//! Patch computation.

use std::mem;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use setpatch_core::{DiffError, Result, Side, pointer};
use tracing::{debug, trace};

use crate::collections::{Collections, NodeRule, RuleCursor};
use crate::compare::values_equal;
use crate::document::{DocumentFormat, parse_document};
use crate::patch::{JsonPatch, PatchOperation};
use crate::reconcile::{MatchKey, MatchMode, Reconciliation, element_keys, multiset_equal};
use crate::strategy::Strategy;

/// Options for patch computation.
///
/// ```
/// use setpatch_diff::{DiffOptions, Strategy};
///
/// let options = DiffOptions::from_json_str(
///     r#"{"strategy": {"kind": "ensure_exists"}, "collections": {"entitySets": {"$.t": "k"}}}"#,
/// )?;
/// assert_eq!(options.strategy, Strategy::EnsureExists);
/// # Ok::<(), setpatch_diff::DiffError>(())
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DiffOptions {
    /// Treatment of source-only content.
    pub strategy: Strategy,
    /// Array rules.
    pub collections: Collections,
}

impl DiffOptions {
    /// Ordered `ExactMatch` with no collection rules.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// `ExactMatch` with no collection rules, optionally treating every
    /// array as unordered.
    #[must_use]
    pub fn exact_match(ignore_array_order: bool) -> Self {
        Self::new().with_strategy(Strategy::ExactMatch { ignore_array_order })
    }

    /// `EnsureExists` over the given rules.
    #[must_use]
    pub fn ensure_exists(collections: Collections) -> Self {
        Self {
            strategy: Strategy::EnsureExists,
            collections,
        }
    }

    /// Replace the strategy.
    #[must_use]
    pub fn with_strategy(mut self, strategy: Strategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Replace the collection rules.
    #[must_use]
    pub fn with_collections(mut self, collections: Collections) -> Self {
        self.collections = collections;
        self
    }

    /// Parse options from JSON.
    ///
    /// # Errors
    ///
    /// Returns [`DiffError::InvalidConfig`] if the text is not valid options
    /// JSON, including malformed patterns inside `collections`.
    pub fn from_json_str(text: &str) -> Result<Self> {
        serde_json::from_str(text).map_err(DiffError::invalid_config)
    }
}

/// Compute a patch with ordered `ExactMatch` semantics.
///
/// Applying the result to `source` yields a document structurally equal to
/// `target`.
///
/// ```
/// use serde_json::json;
/// use setpatch_diff::json_diff;
///
/// let patch = json_diff(&json!({"a": 1, "b": 2}), &json!({"a": 1, "c": 3}));
/// assert_eq!(
///     patch.to_json_string().unwrap(),
///     r#"[{"op":"add","path":"/c","value":3},{"op":"remove","path":"/b"}]"#
/// );
/// ```
#[must_use]
pub fn json_diff(source: &Value, target: &Value) -> JsonPatch {
    let collections = Collections::new();
    Differ::new(Strategy::exact_match(), &collections).run(source, target)
}

/// Compute a patch under the given options.
///
/// # Errors
///
/// Returns [`DiffError::UnsupportedStrategy`] before examining the
/// documents if the strategy has no defined semantics.
pub fn json_diff_with_options(source: &Value, target: &Value, options: &DiffOptions) -> Result<JsonPatch> {
    let strategy = options.strategy.ensure_supported()?;
    Ok(Differ::new(strategy, &options.collections).run(source, target))
}

/// Parse two JSON texts and compute the patch between them.
///
/// # Errors
///
/// Returns [`DiffError::Parse`] naming the side that failed to parse, or
/// any error of [`json_diff_with_options`].
pub fn json_diff_str(source: &str, target: &str, options: &DiffOptions) -> Result<JsonPatch> {
    let strategy = options.strategy.ensure_supported()?;
    let source = parse_document(source, DocumentFormat::Json, Side::Source)?;
    let target = parse_document(target, DocumentFormat::Json, Side::Target)?;
    Ok(Differ::new(strategy, &options.collections).run(&source, &target))
}

/// Recursive walker accumulating operations.
///
/// Paths are built as the walk descends; the rule cursor travels alongside
/// so that collection rules are resolved without rendering patterns.
struct Differ<'c> {
    strategy: Strategy,
    collections: &'c Collections,
    patch: JsonPatch,
}

impl<'c> Differ<'c> {
    const fn new(strategy: Strategy, collections: &'c Collections) -> Self {
        Self {
            strategy,
            collections,
            patch: JsonPatch::new(),
        }
    }

    fn run(mut self, source: &Value, target: &Value) -> JsonPatch {
        debug!(
            strategy = self.strategy.name(),
            rules = self.collections.len(),
            "computing patch"
        );
        let collections = self.collections;
        self.diff_value(source, target, "", &collections.cursor());
        let patch = self.patch;
        debug!(operations = patch.len(), "patch computed");
        patch
    }

    fn diff_value(&mut self, source: &Value, target: &Value, path: &str, cursor: &RuleCursor<'_>) {
        match (source, target) {
            (Value::Object(s), Value::Object(t)) => self.diff_object(s, t, path, cursor),
            (Value::Array(s), Value::Array(t)) => self.diff_array(s, t, path, cursor),
            (Value::Null, Value::Null) => {}
            // `add` at the root swaps the whole document; below it, `add`
            // would insert into an array rather than overwrite
            (Value::Null, _) if path.is_empty() => {
                self.patch.push(PatchOperation::add(path, target.clone()));
            }
            _ => {
                if !values_equal(source, target, false) {
                    self.patch.push(PatchOperation::replace(path, target.clone()));
                }
            }
        }
    }

    fn diff_object(
        &mut self,
        source: &Map<String, Value>,
        target: &Map<String, Value>,
        path: &str,
        cursor: &RuleCursor<'_>,
    ) {
        for (key, target_value) in target {
            let child = descend(cursor, key);
            if is_ignored(&child) {
                continue;
            }
            let child_path = pointer::extend(path, key);
            match source.get(key) {
                None => self.patch.push(PatchOperation::add(child_path, target_value.clone())),
                Some(source_value) if !same_kind(source_value, target_value) => {
                    self.patch
                        .push(PatchOperation::replace(child_path, target_value.clone()));
                }
                Some(source_value) => self.diff_value(source_value, target_value, &child_path, &child),
            }
        }

        if self.strategy.emits_removals() {
            for key in source.keys() {
                if !target.contains_key(key) && !is_ignored(&descend(cursor, key)) {
                    self.patch.push(PatchOperation::remove(pointer::extend(path, key)));
                }
            }
        }
    }

    fn diff_array(&mut self, source: &[Value], target: &[Value], path: &str, cursor: &RuleCursor<'_>) {
        let rule = cursor.matched();
        let elements = cursor.index();

        if let Some(identity) = rule.and_then(NodeRule::identity) {
            trace!(path, identity, "reconciling entity set");
            let mode = MatchMode::Identity(identity);
            let source_keys = element_keys(source, mode, &elements);
            let target_keys = element_keys(target, mode, &elements);
            let plan = Reconciliation::plan(&source_keys, &target_keys, self.strategy);
            for &(s, t) in &plan.matched {
                self.diff_value(&source[s], &target[t], &pointer::extend_index(path, s), &elements);
            }
            plan.emit(path, target, &mut self.patch);
        } else if rule.is_some_and(NodeRule::is_unordered) || self.strategy.ignore_array_order() {
            trace!(path, "reconciling value set");
            self.diff_value_set(source, target, path, &elements);
        } else if source.len() == target.len() && self.strategy.emits_removals() {
            self.diff_positional(source, target, path, &elements);
        } else {
            // lengths differ, or EnsureExists, which never overwrites source elements
            trace!(
                path,
                source = source.len(),
                target = target.len(),
                "reconciling by value"
            );
            let source_keys = element_keys(source, MatchMode::Value, &elements);
            let target_keys = element_keys(target, MatchMode::Value, &elements);
            self.reconcile_values(&source_keys, &target_keys, path, target);
        }
    }

    fn diff_positional(&mut self, source: &[Value], target: &[Value], path: &str, elements: &RuleCursor<'_>) {
        for (index, (s, t)) in source.iter().zip(target).enumerate() {
            self.diff_value(s, t, &pointer::extend_index(path, index), elements);
        }
    }

    fn diff_value_set(&mut self, source: &[Value], target: &[Value], path: &str, elements: &RuleCursor<'_>) {
        let source_keys = element_keys(source, MatchMode::Value, elements);
        let target_keys = element_keys(target, MatchMode::Value, elements);
        if multiset_equal(&source_keys, &target_keys) {
            return;
        }
        if self.strategy.emits_removals() && source.len() == target.len() {
            // same size but different content: rewrite in place
            self.diff_positional(source, target, path, elements);
            return;
        }
        self.reconcile_values(&source_keys, &target_keys, path, target);
    }

    fn reconcile_values(
        &mut self,
        source_keys: &[Option<MatchKey>],
        target_keys: &[Option<MatchKey>],
        path: &str,
        target: &[Value],
    ) {
        let plan = Reconciliation::plan(source_keys, target_keys, self.strategy);
        plan.emit(path, target, &mut self.patch);
    }
}

/// Cursor for an object member; an exhausted cursor stays exhausted.
fn descend<'r>(cursor: &RuleCursor<'r>, key: &str) -> RuleCursor<'r> {
    if cursor.is_exhausted() {
        cursor.clone()
    } else {
        cursor.member(key)
    }
}

fn is_ignored(cursor: &RuleCursor<'_>) -> bool {
    cursor.matched().is_some_and(NodeRule::is_ignored)
}

fn same_kind(a: &Value, b: &Value) -> bool {
    mem::discriminant(a) == mem::discriminant(b)
}
