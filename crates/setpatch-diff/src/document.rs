// SPDX-License-Identifier: MIT OR Apache-2.0
//! Document decoding.
//!
//! Every input format is decoded into [`serde_json::Value`] before diffing,
//! so patches always address the JSON model. YAML and TOML are behind the
//! `yaml` and `toml` features; content with no JSON equivalent is rejected
//! with [`DiffError::UnsupportedValueKind`] rather than approximated.

use serde_json::Value;
use setpatch_core::{DiffError, Result, Side};

use crate::compute::{DiffOptions, json_diff_with_options};
use crate::patch::JsonPatch;

/// Input document format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DocumentFormat {
    /// JSON text.
    #[default]
    Json,
    /// YAML text. Requires the `yaml` feature.
    #[cfg(feature = "yaml")]
    Yaml,
    /// TOML text. Requires the `toml` feature.
    #[cfg(feature = "toml")]
    Toml,
}

impl DocumentFormat {
    /// Guess the format from a file extension, without the dot.
    #[must_use]
    pub fn from_extension(extension: &str) -> Option<Self> {
        match extension.to_ascii_lowercase().as_str() {
            "json" => Some(Self::Json),
            #[cfg(feature = "yaml")]
            "yaml" | "yml" => Some(Self::Yaml),
            #[cfg(feature = "toml")]
            "toml" => Some(Self::Toml),
            _ => None,
        }
    }
}

/// Decode `text` as a JSON value.
///
/// # Errors
///
/// [`DiffError::Parse`] tagged with `side` for malformed text;
/// [`DiffError::UnsupportedValueKind`] for YAML tags, non-string mapping
/// keys, non-finite numbers or TOML datetimes.
pub fn parse_document(text: &str, format: DocumentFormat, side: Side) -> Result<Value> {
    match format {
        DocumentFormat::Json => serde_json::from_str(text).map_err(|err| DiffError::parse(side, err)),
        #[cfg(feature = "yaml")]
        DocumentFormat::Yaml => {
            let document: serde_yaml::Value =
                serde_yaml::from_str(text).map_err(|err| DiffError::parse(side, err))?;
            yaml::to_json(document, "")
        }
        #[cfg(feature = "toml")]
        DocumentFormat::Toml => {
            let table: toml::Table = toml::from_str(text).map_err(|err| DiffError::parse(side, err))?;
            toml_doc::to_json(toml::Value::Table(table), "")
        }
    }
}

/// Decode two documents of the same format and diff them.
///
/// # Errors
///
/// Any error of [`parse_document`] or [`json_diff_with_options`].
pub fn diff_documents(
    source: &str,
    target: &str,
    format: DocumentFormat,
    options: &DiffOptions,
) -> Result<JsonPatch> {
    options.strategy.ensure_supported()?;
    let source = parse_document(source, format, Side::Source)?;
    let target = parse_document(target, format, Side::Target)?;
    json_diff_with_options(&source, &target, options)
}

#[cfg(any(feature = "yaml", feature = "toml"))]
fn unsupported(path: &str, kind: impl Into<String>) -> DiffError {
    DiffError::UnsupportedValueKind {
        path: path.to_string(),
        kind: kind.into(),
    }
}

#[cfg(any(feature = "yaml", feature = "toml"))]
fn finite_number(value: f64, path: &str) -> Result<Value> {
    serde_json::Number::from_f64(value)
        .map(Value::Number)
        .ok_or_else(|| unsupported(path, format!("non-finite number {value}")))
}

#[cfg(feature = "yaml")]
mod yaml {
    use serde_json::{Map, Number, Value};
    use serde_yaml::Value as Yaml;
    use setpatch_core::{Result, pointer};

    use super::{finite_number, unsupported};

    const fn kind(value: &Yaml) -> &'static str {
        match value {
            Yaml::Null => "null",
            Yaml::Bool(_) => "bool",
            Yaml::Number(_) => "number",
            Yaml::String(_) => "string",
            Yaml::Sequence(_) => "sequence",
            Yaml::Mapping(_) => "mapping",
            Yaml::Tagged(_) => "tagged value",
        }
    }

    pub(super) fn to_json(value: Yaml, path: &str) -> Result<Value> {
        match value {
            Yaml::Null => Ok(Value::Null),
            Yaml::Bool(b) => Ok(Value::Bool(b)),
            Yaml::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Ok(Value::Number(Number::from(i)))
                } else if let Some(u) = n.as_u64() {
                    Ok(Value::Number(Number::from(u)))
                } else {
                    finite_number(n.as_f64().unwrap_or(f64::NAN), path)
                }
            }
            Yaml::String(s) => Ok(Value::String(s)),
            Yaml::Sequence(items) => items
                .into_iter()
                .enumerate()
                .map(|(index, item)| to_json(item, &pointer::extend_index(path, index)))
                .collect::<Result<Vec<_>>>()
                .map(Value::Array),
            Yaml::Mapping(mapping) => {
                let mut out = Map::new();
                for (key, item) in mapping {
                    let key = match key {
                        Yaml::String(key) => key,
                        other => {
                            return Err(unsupported(
                                path,
                                format!("{} mapping key", kind(&other)),
                            ));
                        }
                    };
                    let child = pointer::extend(path, &key);
                    out.insert(key, to_json(item, &child)?);
                }
                Ok(Value::Object(out))
            }
            Yaml::Tagged(tagged) => Err(unsupported(path, format!("tagged value {}", tagged.tag))),
        }
    }
}

#[cfg(feature = "toml")]
mod toml_doc {
    use serde_json::{Map, Number, Value};
    use setpatch_core::{Result, pointer};
    use toml::Value as Toml;

    use super::{finite_number, unsupported};

    pub(super) fn to_json(value: Toml, path: &str) -> Result<Value> {
        match value {
            Toml::String(s) => Ok(Value::String(s)),
            Toml::Integer(i) => Ok(Value::Number(Number::from(i))),
            Toml::Float(f) => finite_number(f, path),
            Toml::Boolean(b) => Ok(Value::Bool(b)),
            Toml::Datetime(datetime) => Err(unsupported(path, format!("datetime {datetime}"))),
            Toml::Array(items) => items
                .into_iter()
                .enumerate()
                .map(|(index, item)| to_json(item, &pointer::extend_index(path, index)))
                .collect::<Result<Vec<_>>>()
                .map(Value::Array),
            Toml::Table(table) => {
                let mut out = Map::new();
                for (key, item) in table {
                    let child = pointer::extend(path, &key);
                    out.insert(key, to_json(item, &child)?);
                }
                Ok(Value::Object(out))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    #[cfg(any(feature = "yaml", feature = "toml"))]
    use serde_json::json;

    #[test]
    fn test_json_parse_error_carries_side() {
        let err = parse_document("{", DocumentFormat::Json, Side::Target).unwrap_err();
        assert!(matches!(err, DiffError::Parse { side: Side::Target, .. }));
        assert!(err.to_string().starts_with("invalid target document"));
    }

    #[test]
    fn test_from_extension() {
        assert_eq!(DocumentFormat::from_extension("JSON"), Some(DocumentFormat::Json));
        assert_eq!(DocumentFormat::from_extension("txt"), None);
    }

    #[test]
    fn test_diff_documents_json() {
        let patch = diff_documents(r#"{"a": 1}"#, r#"{"a": 2}"#, DocumentFormat::Json, &DiffOptions::new()).unwrap();
        assert_eq!(patch.to_json_string().unwrap(), r#"[{"op":"replace","path":"/a","value":2}]"#);
    }

    #[cfg(feature = "yaml")]
    #[test]
    fn test_yaml_decodes_to_json_model() {
        let value = parse_document("a: 1\nb: [x, 2.5]\nc: ~\n", DocumentFormat::Yaml, Side::Source).unwrap();
        assert_eq!(value, json!({"a": 1, "b": ["x", 2.5], "c": null}));
    }

    #[cfg(feature = "yaml")]
    #[test]
    fn test_yaml_rejects_non_json_content() {
        let err = parse_document("a:\n  1: x\n", DocumentFormat::Yaml, Side::Source).unwrap_err();
        assert_eq!(
            err,
            DiffError::UnsupportedValueKind {
                path: "/a".into(),
                kind: "number mapping key".into()
            }
        );
        let err = parse_document("a: !custom 1\n", DocumentFormat::Yaml, Side::Source).unwrap_err();
        assert!(matches!(err, DiffError::UnsupportedValueKind { ref path, .. } if path == "/a"));
        let err = parse_document("a: .nan\n", DocumentFormat::Yaml, Side::Source).unwrap_err();
        assert!(matches!(err, DiffError::UnsupportedValueKind { .. }));
    }

    #[cfg(feature = "toml")]
    #[test]
    fn test_toml_decodes_to_json_model() {
        let value = parse_document("a = 1\n[t]\nk = \"x\"\n", DocumentFormat::Toml, Side::Source).unwrap();
        assert_eq!(value, json!({"a": 1, "t": {"k": "x"}}));
    }

    #[cfg(feature = "toml")]
    #[test]
    fn test_toml_rejects_datetime() {
        let err = parse_document("[t]\nwhen = 1979-05-27\n", DocumentFormat::Toml, Side::Target).unwrap_err();
        assert!(matches!(err, DiffError::UnsupportedValueKind { ref path, .. } if path == "/t/when"));
    }
}
