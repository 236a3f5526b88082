// SPDX-License-Identifier: MIT OR Apache-2.0
use std::fmt;

use thiserror::Error;

/// Which input document an error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    /// The document being transformed.
    Source,
    /// The document the patch should produce.
    Target,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Source => f.write_str("source"),
            Self::Target => f.write_str("target"),
        }
    }
}

/// Errors produced while computing a patch.
///
/// Every error is terminal for the call that produced it: no partial patch is
/// ever returned alongside one.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DiffError {
    /// An input document could not be decoded.
    #[error("invalid {side} document: {message}")]
    Parse {
        /// The offending document.
        side: Side,
        /// Decoder diagnostic.
        message: String,
    },

    /// The requested strategy has no defined semantics.
    #[error("strategy `{strategy}` is not supported")]
    UnsupportedStrategy {
        /// Name of the rejected strategy.
        strategy: &'static str,
    },

    /// A decoded value has a shape that cannot be represented as JSON.
    #[error("unsupported value kind `{kind}` at `{path}`")]
    UnsupportedValueKind {
        /// JSON Pointer of the offending node.
        path: String,
        /// Human readable description of the value.
        kind: String,
    },

    /// A collections pattern could not be compiled.
    #[error("invalid path pattern `{pattern}`: {reason}")]
    InvalidPattern {
        /// The pattern text as written.
        pattern: String,
        /// Why it was rejected.
        reason: String,
    },

    /// Configuration text could not be decoded.
    #[error("invalid configuration: {message}")]
    InvalidConfig {
        /// Decoder diagnostic.
        message: String,
    },
}

impl DiffError {
    /// Build a [`DiffError::Parse`] from any displayable decoder error.
    pub fn parse(side: Side, err: impl fmt::Display) -> Self {
        Self::Parse {
            side,
            message: err.to_string(),
        }
    }

    /// Build a [`DiffError::InvalidPattern`].
    pub fn invalid_pattern(pattern: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidPattern {
            pattern: pattern.into(),
            reason: reason.into(),
        }
    }

    /// Build a [`DiffError::InvalidConfig`] from any displayable decoder error.
    pub fn invalid_config(err: impl fmt::Display) -> Self {
        Self::InvalidConfig {
            message: err.to_string(),
        }
    }
}

/// Result alias for setpatch operations.
pub type Result<T> = std::result::Result<T, DiffError>;
