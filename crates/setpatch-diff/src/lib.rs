// SPDX-License-Identifier: MIT OR Apache-2.0
//! # Set-aware JSON Patch generation
//!
//! Computes RFC 6902 patches that turn a source document into a target
//! document. Only `add`, `remove` and `replace` are produced.
//!
//! ## Strategies
//! - `ExactMatch`: the patched source equals the target. Content missing
//!   from the target is removed.
//! - `EnsureExists`: the patched source contains everything in the target.
//!   Nothing is ever removed, and new array elements are appended.
//!
//! ## Collections
//! Arrays are ordered lists by default. [`Collections`] declares, by path
//! pattern (`$.t[*].v`):
//! - entity sets, whose object elements are matched by an identity field
//!   and then diffed member by member;
//! - plain sets, compared as multisets of values;
//! - ignored fields, skipped both when diffing and when matching.
//!
//! ```
//! use serde_json::json;
//! use setpatch_diff::{Collections, DiffOptions, Strategy, json_diff_with_options};
//!
//! let source = json!({"a": 100, "t": [{"k": 1, "v": 1}, {"k": 2, "v": 2}]});
//! let target = json!({"t": [{"k": 2, "v": 3}]});
//! let options = DiffOptions::new()
//!     .with_strategy(Strategy::EnsureExists)
//!     .with_collections(Collections::new().with_entity_set("$.t", "k")?);
//!
//! let patch = json_diff_with_options(&source, &target, &options)?;
//! assert_eq!(
//!     patch.to_json_string()?,
//!     r#"[{"op":"replace","path":"/t/1/v","value":3}]"#
//! );
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Limits
//! The walk recurses once per nesting level, so extremely deep documents
//! are bounded by the thread's stack size. Documents decoded by
//! `serde_json` are already limited to 128 levels unless its recursion
//! limit is disabled.

mod collections;
mod compare;
mod compute;
mod document;
mod patch;
pub mod reconcile;
mod strategy;

pub use collections::{Collections, CollectionsSpec, NodeRule};
pub use compare::{canonical_json, numbers_equal, values_equal};
pub use compute::{DiffOptions, json_diff, json_diff_str, json_diff_with_options};
pub use document::{DocumentFormat, diff_documents, parse_document};
pub use patch::{JsonPatch, PatchOperation};
pub use setpatch_core::{DiffError, PathPattern, Result, Side, pointer};
pub use strategy::Strategy;
