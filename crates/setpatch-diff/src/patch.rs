// SPDX-License-Identifier: MIT OR Apache-2.0
//! Patch operations in RFC 6902 shape.
//!
//! Only the three operations the generator produces are modelled. Each
//! variant carries exactly the members it serializes, so a `remove` can
//! never carry a value and an `add` can never lack one.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A single patch operation.
///
/// Serializes as `{"op": "add", "path": "/a", "value": 1}`; `remove` has no
/// `value` member. `add` and `replace` always carry one, even when it is
/// `null`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "lowercase")]
pub enum PatchOperation {
    /// Insert `value` at `path`.
    Add {
        /// Escaped JSON Pointer.
        path: String,
        /// Value to insert.
        value: Value,
    },
    /// Delete the node at `path`.
    Remove {
        /// Escaped JSON Pointer.
        path: String,
    },
    /// Overwrite the node at `path`.
    Replace {
        /// Escaped JSON Pointer.
        path: String,
        /// Replacement value.
        value: Value,
    },
}

impl PatchOperation {
    /// Build an `add` operation.
    #[must_use]
    pub fn add(path: impl Into<String>, value: Value) -> Self {
        Self::Add {
            path: path.into(),
            value,
        }
    }

    /// Build a `remove` operation.
    #[must_use]
    pub fn remove(path: impl Into<String>) -> Self {
        Self::Remove { path: path.into() }
    }

    /// Build a `replace` operation.
    #[must_use]
    pub fn replace(path: impl Into<String>, value: Value) -> Self {
        Self::Replace {
            path: path.into(),
            value,
        }
    }

    /// The operation name as serialized (`"add"`, `"remove"`, `"replace"`).
    #[must_use]
    pub const fn op(&self) -> &'static str {
        match self {
            Self::Add { .. } => "add",
            Self::Remove { .. } => "remove",
            Self::Replace { .. } => "replace",
        }
    }

    /// The target pointer.
    #[must_use]
    pub fn path(&self) -> &str {
        match self {
            Self::Add { path, .. } | Self::Remove { path } | Self::Replace { path, .. } => path,
        }
    }

    /// The payload, if the operation carries one.
    #[must_use]
    pub const fn value(&self) -> Option<&Value> {
        match self {
            Self::Add { value, .. } | Self::Replace { value, .. } => Some(value),
            Self::Remove { .. } => None,
        }
    }

    /// True for `remove`.
    #[must_use]
    pub const fn is_remove(&self) -> bool {
        matches!(self, Self::Remove { .. })
    }
}

/// An ordered list of operations.
///
/// Order is significant: operations are meant to be applied front to back.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JsonPatch {
    /// The operations, in application order.
    pub operations: Vec<PatchOperation>,
}

impl JsonPatch {
    /// Create an empty patch.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            operations: Vec::new(),
        }
    }

    /// Append an operation.
    pub fn push(&mut self, operation: PatchOperation) {
        self.operations.push(operation);
    }

    /// Number of operations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.operations.len()
    }

    /// True if the patch is a no-op.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    /// Iterate over the operations in order.
    pub fn iter(&self) -> std::slice::Iter<'_, PatchOperation> {
        self.operations.iter()
    }

    /// Stable sort by pointer string.
    ///
    /// Sorting discards application order; it is meant for presentation and
    /// comparisons where order does not matter.
    pub fn sort_by_path(&mut self) {
        self.operations.sort_by(|a, b| a.path().cmp(b.path()));
    }

    /// Number of operations of the given kind (`"add"`, `"remove"`, `"replace"`).
    #[must_use]
    pub fn count_op(&self, op: &str) -> usize {
        self.operations.iter().filter(|o| o.op() == op).count()
    }

    /// Serialize to a JSON string.
    ///
    /// # Errors
    ///
    /// Propagates `serde_json` serialization errors.
    pub fn to_json_string(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

impl From<Vec<PatchOperation>> for JsonPatch {
    fn from(operations: Vec<PatchOperation>) -> Self {
        Self { operations }
    }
}

impl IntoIterator for JsonPatch {
    type Item = PatchOperation;
    type IntoIter = std::vec::IntoIter<PatchOperation>;

    fn into_iter(self) -> Self::IntoIter {
        self.operations.into_iter()
    }
}

impl<'a> IntoIterator for &'a JsonPatch {
    type Item = &'a PatchOperation;
    type IntoIter = std::slice::Iter<'a, PatchOperation>;

    fn into_iter(self) -> Self::IntoIter {
        self.operations.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_replace_serializes_value() {
        let op = PatchOperation::replace("/a2", json!("v2"));
        assert_eq!(
            serde_json::to_value(&op).unwrap(),
            json!({"op": "replace", "path": "/a2", "value": "v2"})
        );
    }

    #[test]
    fn test_replace_with_null_keeps_value_member() {
        let op = PatchOperation::replace("/a1", Value::Null);
        assert_eq!(
            serde_json::to_value(&op).unwrap(),
            json!({"op": "replace", "path": "/a1", "value": null})
        );
    }

    #[test]
    fn test_remove_omits_value() {
        let op = PatchOperation::remove("/a1");
        assert_eq!(
            serde_json::to_string(&op).unwrap(),
            r#"{"op":"remove","path":"/a1"}"#
        );
    }

    #[test]
    fn test_patch_serializes_as_array() {
        let patch = JsonPatch::from(vec![
            PatchOperation::add("/b", json!(1)),
            PatchOperation::remove("/a"),
        ]);
        assert_eq!(
            patch.to_json_string().unwrap(),
            r#"[{"op":"add","path":"/b","value":1},{"op":"remove","path":"/a"}]"#
        );
    }

    #[test]
    fn test_deserialize_roundtrip_shape() {
        let patch: JsonPatch =
            serde_json::from_str(r#"[{"op":"replace","path":"/x","value":[1,2]}]"#).unwrap();
        assert_eq!(patch.len(), 1);
        assert_eq!(patch.operations[0].op(), "replace");
        assert_eq!(patch.operations[0].value(), Some(&json!([1, 2])));
    }

    #[test]
    fn test_sort_by_path_is_stable() {
        let mut patch = JsonPatch::from(vec![
            PatchOperation::replace("/type", json!("x")),
            PatchOperation::remove("/coordinates/1"),
            PatchOperation::add("/coordinates/1", json!(2)),
            PatchOperation::replace("/coordinates/0", json!(1)),
        ]);
        patch.sort_by_path();
        let ordered: Vec<_> = patch.iter().map(|op| (op.op(), op.path())).collect();
        assert_eq!(
            ordered,
            vec![
                ("replace", "/coordinates/0"),
                ("remove", "/coordinates/1"),
                ("add", "/coordinates/1"),
                ("replace", "/type"),
            ]
        );
    }

    #[test]
    fn test_count_op() {
        let patch = JsonPatch::from(vec![
            PatchOperation::remove("/a"),
            PatchOperation::remove("/b"),
            PatchOperation::add("/c", json!(null)),
        ]);
        assert_eq!(patch.count_op("remove"), 2);
        assert_eq!(patch.count_op("add"), 1);
        assert_eq!(patch.count_op("replace"), 0);
        assert!(patch.operations.iter().any(PatchOperation::is_remove));
    }
}
