// SPDX-License-Identifier: MIT OR Apache-2.0
//! Array reconciliation by key.
//!
//! Each element is reduced to a [`MatchKey`]. Source and target elements
//! with equal keys are paired greedily: every source element, in order,
//! takes the lowest-indexed target element with the same key that is still
//! free. Whatever is left over becomes `remove` (source side) or `add`
//! (target side) operations.

use std::collections::HashMap;

use serde_json::Value;
use setpatch_core::pointer;
use smallvec::SmallVec;
use tracing::warn;

use crate::collections::RuleCursor;
use crate::compare::canonical_json_within;
use crate::patch::{JsonPatch, PatchOperation};
use crate::strategy::Strategy;

/// How array elements are matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchMode<'a> {
    /// By canonical form of the whole element.
    Value,
    /// By canonical form of the named field.
    Identity(&'a str),
}

/// The key an element is matched by.
///
/// The variants never compare equal to each other, so an element matched
/// by identity can only pair with another element carrying the same
/// identity value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum MatchKey {
    /// Canonical form of the identity field.
    Identity(String),
    /// Canonical form of the whole element, with ignored fields stripped.
    Whole(String),
}

/// Key for one element.
///
/// In identity mode an element that is not an object, or lacks the field,
/// falls back to its whole value. `None` means the element could not be
/// canonicalized and matches nothing.
pub(crate) fn element_key(element: &Value, mode: MatchMode<'_>, cursor: &RuleCursor<'_>) -> Option<MatchKey> {
    let keyed = match mode {
        MatchMode::Identity(field) => match element.get(field) {
            Some(identity) => canonical_json_within(identity, &cursor.member(field)).map(MatchKey::Identity),
            None => canonical_json_within(element, cursor).map(MatchKey::Whole),
        },
        MatchMode::Value => canonical_json_within(element, cursor).map(MatchKey::Whole),
    };
    keyed
        .inspect_err(|err| warn!(error = %err, "element cannot be canonicalized; treating as unmatched"))
        .ok()
}

/// Keys for every element of an array.
pub(crate) fn element_keys(
    elements: &[Value],
    mode: MatchMode<'_>,
    cursor: &RuleCursor<'_>,
) -> Vec<Option<MatchKey>> {
    elements
        .iter()
        .map(|element| element_key(element, mode, cursor))
        .collect()
}

/// True if both key lists hold the same keys with the same multiplicities.
#[must_use]
pub fn multiset_equal(source: &[Option<MatchKey>], target: &[Option<MatchKey>]) -> bool {
    if source.len() != target.len() {
        return false;
    }
    let mut balance: HashMap<&MatchKey, isize> = HashMap::with_capacity(source.len());
    for key in source {
        let Some(key) = key else { return false };
        *balance.entry(key).or_insert(0) += 1;
    }
    for key in target {
        let Some(key) = key else { return false };
        *balance.entry(key).or_insert(0) -= 1;
    }
    balance.values().all(|&count| count == 0)
}

/// Greedy pairing of source elements against target elements.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Matching {
    /// `(source index, target index)`, in source order.
    pub pairs: Vec<(usize, usize)>,
    /// Source indices that found no partner, ascending.
    pub unmatched_source: Vec<usize>,
    /// Target indices that no source element claimed, ascending.
    pub unmatched_target: Vec<usize>,
}

/// Pair `source` keys with `target` keys.
///
/// A target element is consumed by the first source element that claims
/// it, so duplicates pair one-to-one.
///
/// ```
/// use setpatch_diff::reconcile::{find_unmatched, MatchKey};
///
/// let key = |s: &str| Some(MatchKey::Whole(s.to_string()));
/// let matching = find_unmatched(&[key("1"), key("2"), key("2")], &[key("2"), key("3")]);
/// assert_eq!(matching.pairs, vec![(1, 0)]);
/// assert_eq!(matching.unmatched_source, vec![0, 2]);
/// assert_eq!(matching.unmatched_target, vec![1]);
/// ```
#[must_use]
pub fn find_unmatched(source: &[Option<MatchKey>], target: &[Option<MatchKey>]) -> Matching {
    let mut free: HashMap<&MatchKey, SmallVec<[usize; 2]>> = HashMap::with_capacity(target.len());
    for (index, key) in target.iter().enumerate().rev() {
        if let Some(key) = key {
            // pushed in reverse so pop() yields the lowest index first
            free.entry(key).or_default().push(index);
        }
    }

    let mut claimed = vec![false; target.len()];
    let mut matching = Matching::default();
    for (index, key) in source.iter().enumerate() {
        let partner = key
            .as_ref()
            .and_then(|key| free.get_mut(key))
            .and_then(|slots| slots.pop());
        match partner {
            Some(partner) => {
                claimed[partner] = true;
                matching.pairs.push((index, partner));
            }
            None => matching.unmatched_source.push(index),
        }
    }
    matching.unmatched_target = claimed
        .iter()
        .enumerate()
        .filter_map(|(index, &taken)| (!taken).then_some(index))
        .collect();
    matching
}

/// The structural changes that turn one array into another.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Reconciliation {
    /// Matched `(source index, target index)` pairs.
    pub matched: Vec<(usize, usize)>,
    /// Source indices to remove, highest first.
    pub removals: Vec<usize>,
    /// `(insertion index, target index)` for each element to add.
    pub additions: Vec<(usize, usize)>,
}

impl Reconciliation {
    /// Plan the changes for `strategy`.
    ///
    /// Under `ExactMatch`, unmatched source elements are removed from the
    /// highest index down so earlier removals do not shift later ones, and
    /// unmatched target elements are added at their own index. Under
    /// `EnsureExists` nothing is removed and additions are appended after
    /// the existing elements.
    #[must_use]
    pub fn plan(source: &[Option<MatchKey>], target: &[Option<MatchKey>], strategy: Strategy) -> Self {
        let Matching {
            pairs,
            unmatched_source,
            unmatched_target,
        } = find_unmatched(source, target);

        let (removals, additions) = if strategy.emits_removals() {
            (
                unmatched_source.into_iter().rev().collect(),
                unmatched_target.into_iter().map(|t| (t, t)).collect(),
            )
        } else {
            (
                Vec::new(),
                unmatched_target
                    .into_iter()
                    .enumerate()
                    .map(|(rank, t)| (source.len() + rank, t))
                    .collect(),
            )
        };
        Self {
            matched: pairs,
            removals,
            additions,
        }
    }

    /// True if the arrays already agree structurally.
    #[must_use]
    pub fn is_settled(&self) -> bool {
        self.removals.is_empty() && self.additions.is_empty()
    }

    /// Append the removals, then the additions, to `patch`.
    pub fn emit(&self, path: &str, target: &[Value], patch: &mut JsonPatch) {
        for &index in &self.removals {
            patch.push(PatchOperation::remove(pointer::extend_index(path, index)));
        }
        for &(at, index) in &self.additions {
            patch.push(PatchOperation::add(
                pointer::extend_index(path, at),
                target[index].clone(),
            ));
        }
    }
}
