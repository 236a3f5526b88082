// SPDX-License-Identifier: MIT OR Apache-2.0
//! Core types, error handling, and path utilities for setpatch
//!
//! This crate provides the foundational types used across the setpatch workspace:
//!
//! - [`error`] - Error types and Result alias
//! - [`pointer`] - RFC 6901 JSON Pointer construction and pattern rendering
//! - [`pattern`] - Compiled path patterns with incremental matching

#![deny(missing_docs)]
#![deny(rust_2018_idioms)]
#![deny(clippy::pedantic)]
#![deny(clippy::nursery)]
#![deny(clippy::cargo)]

/// Error types for setpatch operations
pub mod error;
/// Compiled path patterns for per-path configuration rules
pub mod pattern;
/// JSON Pointer (RFC 6901) utilities
pub mod pointer;

// Re-exports for convenience
pub use error::{DiffError, Result, Side};
pub use pattern::{Cursor, PathPattern, PatternTable, PatternToken};
