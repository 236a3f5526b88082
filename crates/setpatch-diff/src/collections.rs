// SPDX-License-Identifier: MIT OR Apache-2.0
//! Collection rules.
//!
//! Arrays are ordered lists unless a rule says otherwise:
//!
//! - an **entity set** pattern names an array whose object elements are
//!   matched by an identity field;
//! - an **array** pattern names an array compared as a multiset of values;
//! - an **ignored field** pattern names object members that neither produce
//!   operations nor take part in element matching.
//!
//! Rules are compiled into a single [`PatternTable`] keyed by pattern, and
//! the diff engine consults it through a cursor while it walks the
//! documents.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use setpatch_core::{Cursor, DiffError, PathPattern, PatternTable, Result};

pub(crate) type RuleCursor<'a> = Cursor<'a, NodeRule>;

/// Everything known about the nodes a single pattern addresses.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NodeRule {
    identity: Option<String>,
    unordered: bool,
    ignored: bool,
}

impl NodeRule {
    /// Identity field, if the node is an entity set.
    #[must_use]
    pub fn identity(&self) -> Option<&str> {
        self.identity.as_deref()
    }

    /// True if the node is a plain value set.
    #[must_use]
    pub const fn is_unordered(&self) -> bool {
        self.unordered
    }

    /// True if the node is skipped entirely.
    #[must_use]
    pub const fn is_ignored(&self) -> bool {
        self.ignored
    }
}

/// Serialized form of [`Collections`].
///
/// Accepts both `snake_case` and `camelCase` member names:
///
/// ```json
/// {"entitySets": {"$.t": "k"}, "arrays": ["$.tags"], "ignoredFields": ["$.meta"]}
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CollectionsSpec {
    /// Pattern to identity field name.
    #[serde(alias = "entitySets")]
    pub entity_sets: BTreeMap<String, String>,
    /// Patterns of arrays compared as value sets.
    pub arrays: Vec<String>,
    /// Patterns of members to skip.
    #[serde(alias = "ignoredFields")]
    pub ignored_fields: Vec<String>,
}

/// Compiled collection rules.
///
/// ```
/// use setpatch_diff::Collections;
///
/// let collections = Collections::new()
///     .with_entity_set("$.t", "k")?
///     .with_array("$.tags")?
///     .with_ignored_field("$.t[*].updated")?;
/// assert_eq!(collections.entity_key("$.t")?, Some("k"));
/// assert_eq!(collections.entity_key("$.tags")?, None);
/// # Ok::<(), setpatch_diff::DiffError>(())
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(try_from = "CollectionsSpec", into = "CollectionsSpec")]
pub struct Collections {
    rules: PatternTable<NodeRule>,
}

impl Collections {
    /// No rules: every array is positional.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            rules: PatternTable::new(),
        }
    }

    /// Declare an entity set matched by `identity`.
    ///
    /// # Errors
    ///
    /// Fails on a malformed pattern or an empty identity field name.
    pub fn with_entity_set(mut self, pattern: &str, identity: impl Into<String>) -> Result<Self> {
        let identity = identity.into();
        if identity.is_empty() {
            return Err(DiffError::invalid_config(format_args!(
                "entity set `{pattern}` has an empty identity field"
            )));
        }
        self.rules.entry(PathPattern::parse(pattern)?).identity = Some(identity);
        Ok(self)
    }

    /// Declare a plain value set.
    ///
    /// # Errors
    ///
    /// Fails on a malformed pattern.
    pub fn with_array(mut self, pattern: &str) -> Result<Self> {
        self.rules.entry(PathPattern::parse(pattern)?).unordered = true;
        Ok(self)
    }

    /// Declare a member to skip.
    ///
    /// # Errors
    ///
    /// Fails on a malformed pattern, or on `$`: the root is not a member.
    pub fn with_ignored_field(mut self, pattern: &str) -> Result<Self> {
        let compiled = PathPattern::parse(pattern)?;
        if compiled.is_root() {
            return Err(DiffError::invalid_pattern(
                pattern,
                "the document root cannot be ignored",
            ));
        }
        self.rules.entry(compiled).ignored = true;
        Ok(self)
    }

    /// Compile a [`CollectionsSpec`].
    ///
    /// # Errors
    ///
    /// Fails on the first malformed pattern.
    pub fn from_spec(spec: &CollectionsSpec) -> Result<Self> {
        let mut collections = Self::new();
        for (pattern, identity) in &spec.entity_sets {
            collections = collections.with_entity_set(pattern, identity.as_str())?;
        }
        for pattern in &spec.arrays {
            collections = collections.with_array(pattern)?;
        }
        for pattern in &spec.ignored_fields {
            collections = collections.with_ignored_field(pattern)?;
        }
        Ok(collections)
    }

    /// Render the rules back into their serialized form.
    #[must_use]
    pub fn to_spec(&self) -> CollectionsSpec {
        let mut spec = CollectionsSpec::default();
        for (pattern, rule) in self.rules.iter() {
            if let Some(identity) = rule.identity() {
                spec.entity_sets
                    .insert(pattern.to_string(), identity.to_string());
            }
            if rule.unordered {
                spec.arrays.push(pattern.to_string());
            }
            if rule.ignored {
                spec.ignored_fields.push(pattern.to_string());
            }
        }
        spec
    }

    /// Parse rules from JSON.
    ///
    /// # Errors
    ///
    /// [`DiffError::InvalidConfig`] for malformed JSON or unknown members,
    /// [`DiffError::InvalidPattern`] for a malformed pattern.
    pub fn from_json_str(text: &str) -> Result<Self> {
        let spec: CollectionsSpec = serde_json::from_str(text).map_err(DiffError::invalid_config)?;
        Self::from_spec(&spec)
    }

    /// Parse rules from YAML.
    ///
    /// # Errors
    ///
    /// As [`Collections::from_json_str`].
    #[cfg(feature = "yaml")]
    pub fn from_yaml_str(text: &str) -> Result<Self> {
        let spec: CollectionsSpec = serde_yaml::from_str(text).map_err(DiffError::invalid_config)?;
        Self::from_spec(&spec)
    }

    /// Parse rules from TOML.
    ///
    /// # Errors
    ///
    /// As [`Collections::from_json_str`].
    #[cfg(feature = "toml")]
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let spec: CollectionsSpec = toml::from_str(text).map_err(DiffError::invalid_config)?;
        Self::from_spec(&spec)
    }

    /// Identity field declared for exactly this pattern.
    ///
    /// # Errors
    ///
    /// Fails on a malformed pattern.
    pub fn entity_key(&self, pattern: &str) -> Result<Option<&str>> {
        let pattern = PathPattern::parse(pattern)?;
        Ok(self.rules.get(&pattern).and_then(NodeRule::identity))
    }

    /// Rule declared for exactly this pattern.
    ///
    /// # Errors
    ///
    /// Fails on a malformed pattern.
    pub fn rule(&self, pattern: &str) -> Result<Option<&NodeRule>> {
        Ok(self.rules.get(&PathPattern::parse(pattern)?))
    }

    /// Number of distinct patterns with a rule.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// True if no rule is declared.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub(crate) fn cursor(&self) -> RuleCursor<'_> {
        self.rules.cursor()
    }
}

impl TryFrom<CollectionsSpec> for Collections {
    type Error = DiffError;

    fn try_from(spec: CollectionsSpec) -> Result<Self> {
        Self::from_spec(&spec)
    }
}

impl From<Collections> for CollectionsSpec {
    fn from(collections: Collections) -> Self {
        collections.to_spec()
    }
}
