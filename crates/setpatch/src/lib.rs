// SPDX-License-Identifier: MIT OR Apache-2.0
//! # setpatch
//!
//! RFC 6902 JSON Patch generation for documents whose arrays are sets.
//!
//! This crate re-exports the workspace:
//!
//! - [`setpatch_core`] - errors, JSON Pointer helpers and path patterns
//! - [`setpatch_diff`] - strategies, collection rules and the diff engine
//!
//! The most common entry points are available at the top level:
//!
//! ```
//! use serde_json::json;
//! use setpatch::{Collections, DiffOptions, json_diff_with_options};
//!
//! let options = DiffOptions::exact_match(false)
//!     .with_collections(Collections::new().with_array("$.tags")?);
//! let patch = json_diff_with_options(
//!     &json!({"tags": ["a", "b"]}),
//!     &json!({"tags": ["b", "a"]}),
//!     &options,
//! )?;
//! assert!(patch.is_empty());
//! # Ok::<(), setpatch::DiffError>(())
//! ```

#![deny(missing_docs)]
#![deny(rust_2018_idioms)]

pub use setpatch_core;
pub use setpatch_diff;

pub use setpatch_diff::{
    Collections, CollectionsSpec, DiffError, DiffOptions, DocumentFormat, JsonPatch, PatchOperation,
    Result, Side, Strategy, canonical_json, diff_documents, json_diff, json_diff_str,
    json_diff_with_options, parse_document, values_equal,
};
