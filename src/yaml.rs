//! YAML ingestion
//!
//! Templates may be written in YAML as well as JSON. YAML input is mapped
//! onto the same `serde_json::Value` node model before any typed decoding
//! happens, so both spellings flow through one codec. The conversion is as
//! strict as the rest of the crate: a YAML shape the node model cannot
//! carry (non-string keys, aliases, non-finite floats) is rejected instead
//! of being coerced.

use serde_json::{Map, Number, Value as Node};
use yaml_rust2::{Yaml, YamlLoader};

use crate::error::Error;
use crate::path::Path;
use crate::Result;

/// Parse a YAML string into a single document node.
///
/// For multi-document input, returns only the first document. Empty input
/// parses as `Null`.
pub fn parse_yaml(input: &str) -> Result<Node> {
    let docs = YamlLoader::load_from_str(input)
        .map_err(|e| Error::decode(Path::root(), format!("invalid YAML: {e}")))?;
    match docs.into_iter().next() {
        Some(doc) => yaml_to_node(doc),
        None => Ok(Node::Null),
    }
}

/// Parse a multi-document YAML string (`---` separators) into one node per
/// document.
pub fn parse_yaml_multi(input: &str) -> Result<Vec<Node>> {
    let docs = YamlLoader::load_from_str(input)
        .map_err(|e| Error::decode(Path::root(), format!("invalid YAML: {e}")))?;
    docs.into_iter().map(yaml_to_node).collect()
}

fn yaml_to_node(yaml: Yaml) -> Result<Node> {
    match yaml {
        Yaml::Null => Ok(Node::Null),
        Yaml::Boolean(b) => Ok(Node::Bool(b)),
        Yaml::Integer(i) => Ok(Node::Number(i.into())),
        Yaml::Real(text) => {
            let value: f64 = text.parse().map_err(|e| {
                Error::decode(Path::root(), format!("invalid YAML number `{text}`: {e}"))
            })?;
            Number::from_f64(value).map(Node::Number).ok_or_else(|| {
                Error::decode(
                    Path::root(),
                    format!("YAML number `{text}` has no JSON representation"),
                )
            })
        }
        Yaml::String(s) => Ok(Node::String(s)),
        Yaml::Array(items) => items
            .into_iter()
            .map(yaml_to_node)
            .collect::<Result<Vec<_>>>()
            .map(Node::Array),
        Yaml::Hash(entries) => entries
            .into_iter()
            .map(|(key, value)| {
                let key = match key {
                    Yaml::String(s) => s,
                    other => {
                        return Err(Error::decode(
                            Path::root(),
                            format!("template keys must be strings, found {other:?}"),
                        ))
                    }
                };
                yaml_to_node(value).map(|node| (key, node))
            })
            .collect::<Result<Map<String, Node>>>()
            .map(Node::Object),
        Yaml::Alias(_) => Err(Error::decode(
            Path::root(),
            "YAML aliases are not supported in templates",
        )),
        Yaml::BadValue => Err(Error::decode(Path::root(), "malformed YAML value")),
    }
}
