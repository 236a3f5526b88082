// SPDX-License-Identifier: MIT OR Apache-2.0
//! Path patterns.
//!
//! A pattern addresses every node that shares a shape rather than a single
//! node: `$` is the document root, `.name` selects an object member and
//! `[*]` selects any array element. `$.t[*].v` therefore matches `/t/0/v`,
//! `/t/7/v` and so on.
//!
//! Patterns are compiled once into token sequences and stored in a
//! [`PatternTable`]. A [`Cursor`] walks the table alongside a document,
//! discarding patterns that can no longer match as it descends, so lookups
//! never render the current path into a string.

use std::fmt;
use std::str::FromStr;

use smallvec::SmallVec;

use crate::error::{DiffError, Result};
use crate::pointer::is_index_segment;

/// One step of a compiled pattern.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PatternToken {
    /// `.name` - an object member with exactly this name.
    Member(String),
    /// `[*]` - any array element.
    AnyIndex,
}

/// A compiled path pattern.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct PathPattern {
    tokens: Vec<PatternToken>,
}

impl PathPattern {
    /// The pattern that matches only the document root (`$`).
    #[must_use]
    pub const fn root() -> Self {
        Self { tokens: Vec::new() }
    }

    /// Compile a pattern such as `$.t[*].v`.
    ///
    /// Member names run until the next `.` or `[`. A member name made only
    /// of digits compiles to `[*]`, matching how concrete pointers are
    /// rendered by [`crate::pointer::to_pattern`].
    ///
    /// # Errors
    ///
    /// Returns [`DiffError::InvalidPattern`] if the text does not start with
    /// `$`, contains an empty member name, or uses an index form other than
    /// `[*]`.
    pub fn parse(text: &str) -> Result<Self> {
        let trimmed = text.trim();
        let mut rest = trimmed
            .strip_prefix('$')
            .ok_or_else(|| DiffError::invalid_pattern(text, "must start with `$`"))?;

        let mut tokens = Vec::new();
        while !rest.is_empty() {
            if let Some(after) = rest.strip_prefix("[*]") {
                tokens.push(PatternToken::AnyIndex);
                rest = after;
            } else if let Some(after) = rest.strip_prefix('.') {
                let end = after.find(['.', '[']).unwrap_or(after.len());
                let name = &after[..end];
                if name.is_empty() {
                    return Err(DiffError::invalid_pattern(text, "empty member name"));
                }
                tokens.push(if is_index_segment(name) {
                    PatternToken::AnyIndex
                } else {
                    PatternToken::Member(name.to_string())
                });
                rest = &after[end..];
            } else if rest.starts_with('[') {
                return Err(DiffError::invalid_pattern(
                    text,
                    "only the `[*]` index wildcard is supported",
                ));
            } else {
                return Err(DiffError::invalid_pattern(text, "expected `.name` or `[*]`"));
            }
        }
        Ok(Self { tokens })
    }

    /// The compiled tokens, root first.
    #[must_use]
    pub fn tokens(&self) -> &[PatternToken] {
        &self.tokens
    }

    /// Number of tokens below the root.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.tokens.len()
    }

    /// True for `$`.
    #[must_use]
    pub const fn is_root(&self) -> bool {
        self.tokens.is_empty()
    }
}

impl FromStr for PathPattern {
    type Err = DiffError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for PathPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("$")?;
        for token in &self.tokens {
            match token {
                PatternToken::Member(name) => write!(f, ".{name}")?,
                PatternToken::AnyIndex => f.write_str("[*]")?,
            }
        }
        Ok(())
    }
}

/// Compiled patterns with an attached payload.
///
/// Each distinct pattern appears once; inserting it again returns the
/// existing payload for merging.
#[derive(Debug, Clone)]
pub struct PatternTable<T> {
    entries: Vec<(PathPattern, T)>,
}

impl<T> Default for PatternTable<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> PatternTable<T> {
    /// Create an empty table.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Payload for `pattern`, inserting `T::default()` if it is new.
    pub fn entry(&mut self, pattern: PathPattern) -> &mut T
    where
        T: Default,
    {
        let index = match self.entries.iter().position(|(p, _)| *p == pattern) {
            Some(index) => index,
            None => {
                self.entries.push((pattern, T::default()));
                self.entries.len() - 1
            }
        };
        &mut self.entries[index].1
    }

    /// Payload registered for exactly this pattern.
    #[must_use]
    pub fn get(&self, pattern: &PathPattern) -> Option<&T> {
        self.entries
            .iter()
            .find_map(|(p, value)| (p == pattern).then_some(value))
    }

    /// Number of distinct patterns.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if no pattern has been registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over patterns and payloads in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&PathPattern, &T)> {
        self.entries.iter().map(|(p, value)| (p, value))
    }

    /// A cursor positioned at the document root.
    #[must_use]
    pub fn cursor(&self) -> Cursor<'_, T> {
        Cursor {
            table: self,
            depth: 0,
            alive: (0..self.entries.len()).collect(),
        }
    }
}

/// Incremental matcher over a [`PatternTable`].
///
/// Descending is cheap once no pattern remains viable: the candidate list is
/// empty and stays inline.
#[derive(Debug)]
pub struct Cursor<'t, T> {
    table: &'t PatternTable<T>,
    depth: usize,
    alive: SmallVec<[usize; 4]>,
}

impl<T> Clone for Cursor<'_, T> {
    fn clone(&self) -> Self {
        Self {
            table: self.table,
            depth: self.depth,
            alive: self.alive.clone(),
        }
    }
}

impl<'t, T> Cursor<'t, T> {
    /// Descend into the object member `name`.
    #[must_use]
    pub fn member(&self, name: &str) -> Self {
        if is_index_segment(name) {
            return self.index();
        }
        self.step(|token| matches!(token, PatternToken::Member(m) if m == name))
    }

    /// Descend into an array element.
    #[must_use]
    pub fn index(&self) -> Self {
        self.step(|token| matches!(token, PatternToken::AnyIndex))
    }

    fn step(&self, accepts: impl Fn(&PatternToken) -> bool) -> Self {
        let table = self.table;
        let depth = self.depth;
        let alive = self
            .alive
            .iter()
            .copied()
            .filter(|&id| table.entries[id].0.tokens.get(depth).is_some_and(&accepts))
            .collect();
        Self {
            table,
            depth: depth + 1,
            alive,
        }
    }

    /// Payload of the pattern that matches the current node exactly.
    #[must_use]
    pub fn matched(&self) -> Option<&'t T> {
        let table = self.table;
        self.alive.iter().find_map(|&id| {
            let (pattern, value) = &table.entries[id];
            (pattern.len() == self.depth).then_some(value)
        })
    }

    /// True once no pattern can match this node or any node below it.
    #[must_use]
    pub fn is_exhausted(&self) -> bool {
        self.alive.is_empty()
    }
}
