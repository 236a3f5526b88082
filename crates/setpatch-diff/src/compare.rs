// SPDX-License-Identifier: MIT OR Apache-2.0
//! Structural equality and canonical serialization.
//!
//! Set reconciliation matches elements by a canonical text form: object
//! members sorted by key, numbers normalized so that `1` and `1.0` agree,
//! and no insignificant whitespace. Two structurally equal values always
//! canonicalize identically regardless of member order, which makes the
//! canonical string usable as a hash key.

use std::collections::HashMap;

use serde_json::{Map, Number, Value};

use crate::collections::{Collections, NodeRule, RuleCursor};

/// Largest magnitude below which every integral `f64` is exact.
const EXACT_F64_INTEGER_LIMIT: f64 = 9_007_199_254_740_992.0;

/// Structural equality.
///
/// Values of different kinds are never equal. An object key present on one
/// side only makes the objects unequal, whatever the other side holds; a
/// missing key is not the same as an explicit `null`, `false` or `0`.
///
/// With `ignore_array_order`, arrays of equal length compare as multisets
/// of canonical forms.
///
/// ```
/// use serde_json::json;
/// use setpatch_diff::values_equal;
///
/// assert!(values_equal(&json!([1, 2, 2]), &json!([2, 1, 2]), true));
/// assert!(!values_equal(&json!([1, 2, 2]), &json!([2, 1, 1]), true));
/// assert!(!values_equal(&json!({"a": false}), &json!({}), false));
/// ```
#[must_use]
pub fn values_equal(a: &Value, b: &Value, ignore_array_order: bool) -> bool {
    match (a, b) {
        (Value::Null, Value::Null) => true,
        (Value::Bool(x), Value::Bool(y)) => x == y,
        (Value::Number(x), Value::Number(y)) => numbers_equal(x, y),
        (Value::String(x), Value::String(y)) => x == y,
        (Value::Object(x), Value::Object(y)) => objects_equal(x, y, ignore_array_order),
        (Value::Array(x), Value::Array(y)) => {
            if x.len() != y.len() {
                return false;
            }
            if ignore_array_order {
                multiset_equal(x, y)
            } else {
                x.iter()
                    .zip(y)
                    .all(|(l, r)| values_equal(l, r, ignore_array_order))
            }
        }
        _ => false,
    }
}

fn objects_equal(a: &Map<String, Value>, b: &Map<String, Value>, ignore_array_order: bool) -> bool {
    // keys are unique, so equal sizes plus a ⊆ b covers keys present in either
    a.len() == b.len()
        && a.iter().all(|(key, left)| {
            b.get(key)
                .is_some_and(|right| values_equal(left, right, ignore_array_order))
        })
}

fn multiset_equal(a: &[Value], b: &[Value]) -> bool {
    let mut balance: HashMap<String, isize> = HashMap::with_capacity(a.len());
    for value in a {
        let Ok(key) = canonical_json(value) else {
            return false;
        };
        *balance.entry(key).or_insert(0) += 1;
    }
    for value in b {
        let Ok(key) = canonical_json(value) else {
            return false;
        };
        *balance.entry(key).or_insert(0) -= 1;
    }
    balance.values().all(|&count| count == 0)
}

/// Numeric equality across integer and float representations.
///
/// An integer equals a float only when the float is integral and exactly
/// representable, which is the rule the canonical form uses too.
#[must_use]
#[allow(clippy::float_cmp)] // exact comparison is the contract
pub fn numbers_equal(a: &Number, b: &Number) -> bool {
    match (integer(a), integer(b)) {
        (Some(x), Some(y)) => x == y,
        (Some(x), None) => integral_float(b) == Some(x),
        (None, Some(y)) => integral_float(a) == Some(y),
        (None, None) => match (a.as_f64(), b.as_f64()) {
            (Some(x), Some(y)) => x == y,
            _ => false,
        },
    }
}

fn integer(n: &Number) -> Option<i128> {
    n.as_i64()
        .map(i128::from)
        .or_else(|| n.as_u64().map(i128::from))
}

#[allow(clippy::cast_possible_truncation)] // guarded by EXACT_F64_INTEGER_LIMIT
fn integral_float(n: &Number) -> Option<i128> {
    n.as_f64()
        .filter(|f| n.is_f64() && f.fract() == 0.0 && f.abs() < EXACT_F64_INTEGER_LIMIT)
        .map(|f| f as i128)
}

/// Canonical text form of a value.
///
/// # Errors
///
/// Propagates `serde_json` errors from string escaping.
pub fn canonical_json(value: &Value) -> serde_json::Result<String> {
    let unruled = Collections::new();
    canonical_json_within(value, &unruled.cursor())
}

/// Canonical form with ignored fields stripped.
///
/// `cursor` is positioned at `value`; any member whose rule marks it as
/// ignored is left out, at any depth.
pub(crate) fn canonical_json_within(
    value: &Value,
    cursor: &RuleCursor<'_>,
) -> serde_json::Result<String> {
    let mut out = String::with_capacity(32);
    write_canonical(&mut out, value, cursor)?;
    Ok(out)
}

fn write_canonical(out: &mut String, value: &Value, cursor: &RuleCursor<'_>) -> serde_json::Result<()> {
    match value {
        Value::Null => out.push_str("null"),
        Value::Bool(true) => out.push_str("true"),
        Value::Bool(false) => out.push_str("false"),
        Value::Number(n) => write_number(out, n)?,
        Value::String(s) => out.push_str(&serde_json::to_string(s)?),
        Value::Array(items) => {
            let element = cursor.index();
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_canonical(out, item, &element)?;
            }
            out.push(']');
        }
        Value::Object(map) => {
            let mut members: Vec<(&String, &Value, RuleCursor<'_>)> = map
                .iter()
                .map(|(key, member)| {
                    let child = if cursor.is_exhausted() {
                        cursor.clone()
                    } else {
                        cursor.member(key)
                    };
                    (key, member, child)
                })
                .filter(|(_, _, child)| !child.matched().is_some_and(NodeRule::is_ignored))
                .collect();
            members.sort_unstable_by(|a, b| a.0.cmp(b.0));
            out.push('{');
            for (i, (key, member, child)) in members.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                out.push_str(&serde_json::to_string(key)?);
                out.push(':');
                write_canonical(out, member, child)?;
            }
            out.push('}');
        }
    }
    Ok(())
}

fn write_number(out: &mut String, n: &Number) -> serde_json::Result<()> {
    if let Some(i) = integral_float(n) {
        out.push_str(&i.to_string());
        return Ok(());
    }
    out.push_str(&serde_json::to_string(n)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_kinds_never_equal() {
        assert!(!values_equal(&json!(0), &json!(false), false));
        assert!(!values_equal(&json!(null), &json!({}), false));
        assert!(!values_equal(&json!([]), &json!({}), true));
        assert!(!values_equal(&json!("1"), &json!(1), false));
    }

    #[test]
    fn test_scalars() {
        assert!(values_equal(&json!("zzz"), &json!("zzz"), false));
        assert!(!values_equal(&json!("zzz"), &json!("qwerty"), false));
        assert!(values_equal(&json!(true), &json!(true), false));
        assert!(values_equal(&json!(null), &json!(null), false));
    }

    #[test]
    fn test_numbers_across_representations() {
        assert!(values_equal(&json!(1), &json!(1.0), false));
        assert!(values_equal(&json!(-3), &json!(-3.0), false));
        assert!(!values_equal(&json!(1), &json!(1.5), false));
        assert!(values_equal(&json!(u64::MAX), &json!(u64::MAX), false));
    }

    #[test]
    fn test_equality_agrees_with_canonical_form() {
        let pairs = [
            (json!(9_007_199_254_740_993_u64), json!(9_007_199_254_740_992.0)),
            (json!(9_007_199_254_740_992_u64), json!(9_007_199_254_740_992.0)),
            (json!(9_007_199_254_740_991_u64), json!(9_007_199_254_740_991.0)),
            (json!(-7), json!(-7.0)),
            (json!(0), json!(-0.0)),
            (json!(u64::MAX), json!(i64::MAX)),
            (json!(2.5), json!(2.5)),
        ];
        for (a, b) in pairs {
            let canonical = canonical_json(&a).unwrap() == canonical_json(&b).unwrap();
            assert_eq!(values_equal(&a, &b, false), canonical, "{a} vs {b}");
        }
        assert!(!values_equal(
            &json!(9_007_199_254_740_993_u64),
            &json!(9_007_199_254_740_992.0),
            false
        ));
    }

    #[test]
    fn test_absent_key_is_not_default() {
        assert!(!values_equal(&json!({"a": false}), &json!({}), false));
        assert!(!values_equal(&json!({}), &json!({"a": 0}), false));
        assert!(!values_equal(&json!({"a": null}), &json!({"b": null}), false));
        assert!(values_equal(
            &json!({"a": 1, "b": [1]}),
            &json!({"b": [1], "a": 1}),
            false
        ));
    }

    #[test]
    fn test_arrays_ordered() {
        assert!(values_equal(&json!([1, 2]), &json!([1, 2]), false));
        assert!(!values_equal(&json!([1, 2]), &json!([2, 1]), false));
        assert!(!values_equal(&json!([1]), &json!([1, 1]), true));
    }

    #[test]
    fn test_arrays_as_multisets() {
        assert!(values_equal(&json!([1, 2, 2]), &json!([2, 1, 2]), true));
        assert!(!values_equal(&json!([1, 1, 2]), &json!([1, 2, 2]), true));
        assert!(values_equal(
            &json!([{"a": 1, "b": 2}, 3]),
            &json!([3, {"b": 2, "a": 1}]),
            true
        ));
    }

    #[test]
    fn test_canonical_sorts_keys_and_normalizes_numbers() {
        let a = canonical_json(&json!({"b": [1.0, "x"], "a": {"d": null, "c": true}})).unwrap();
        assert_eq!(a, r#"{"a":{"c":true,"d":null},"b":[1,"x"]}"#);
        let b = canonical_json(&json!({"a": {"c": true, "d": null}, "b": [1, "x"]})).unwrap();
        assert_eq!(a, b);
        assert_eq!(canonical_json(&json!(2.5)).unwrap(), "2.5");
        assert_eq!(canonical_json(&json!("a\"b")).unwrap(), r#""a\"b""#);
    }

    #[test]
    fn test_canonical_strips_ignored_fields() {
        let collections = Collections::new().with_ignored_field("$.b[*].d").unwrap();
        let element = collections.cursor().member("b").index();
        let value = json!({"c": 1, "d": "ignored", "e": {"d": 1}});
        assert_eq!(
            canonical_json_within(&value, &element).unwrap(),
            r#"{"c":1,"e":{"d":1}}"#
        );
    }
}
