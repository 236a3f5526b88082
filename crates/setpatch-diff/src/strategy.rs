// SPDX-License-Identifier: MIT OR Apache-2.0
//! Reconciliation strategies.

use serde::{Deserialize, Serialize};
use setpatch_core::{DiffError, Result};

/// How the generated patch treats content that exists only in the source.
///
/// Deserializes from `{"kind": "exact_match", "ignore_array_order": true}`,
/// `{"kind": "ensure_exists"}` and so on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Strategy {
    /// Symmetric diff: the patched source equals the target, so content
    /// missing from the target is removed.
    ExactMatch {
        /// Compare every array as an unordered multiset.
        #[serde(default)]
        ignore_array_order: bool,
    },
    /// Asymmetric diff: only add and replace, never remove. New array
    /// elements are appended after existing content.
    EnsureExists,
    /// Reserved. Requesting it fails with
    /// [`DiffError::UnsupportedStrategy`].
    EnsureAbsent,
}

impl Default for Strategy {
    fn default() -> Self {
        Self::exact_match()
    }
}

impl Strategy {
    /// `ExactMatch` honouring array order.
    #[must_use]
    pub const fn exact_match() -> Self {
        Self::ExactMatch {
            ignore_array_order: false,
        }
    }

    /// `ExactMatch` comparing arrays as multisets.
    #[must_use]
    pub const fn exact_match_ignoring_order() -> Self {
        Self::ExactMatch {
            ignore_array_order: true,
        }
    }

    /// Stable snake_case name, matching the serialized `kind`.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::ExactMatch { .. } => "exact_match",
            Self::EnsureExists => "ensure_exists",
            Self::EnsureAbsent => "ensure_absent",
        }
    }

    /// True when every array should be reconciled as a multiset.
    #[must_use]
    pub const fn ignore_array_order(self) -> bool {
        matches!(
            self,
            Self::ExactMatch {
                ignore_array_order: true
            }
        )
    }

    /// True when content absent from the target produces `remove`.
    #[must_use]
    pub const fn emits_removals(self) -> bool {
        matches!(self, Self::ExactMatch { .. })
    }

    /// Reject strategies without defined semantics.
    ///
    /// # Errors
    ///
    /// Returns [`DiffError::UnsupportedStrategy`] for
    /// [`Strategy::EnsureAbsent`].
    pub fn ensure_supported(self) -> Result<Self> {
        match self {
            Self::EnsureAbsent => Err(DiffError::UnsupportedStrategy {
                strategy: self.name(),
            }),
            supported => Ok(supported),
        }
    }
}
