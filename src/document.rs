//! The template document
//!
//! A template is the declarative artifact the CLI submits to the
//! provisioning service and reads back for inspection and diffing: a map of
//! logical ids to resource entries, plus a format version and description.
//! Which resources belong in a document is the CLI's decision; this module
//! only carries them through the envelope codec.
//!
//! Resources are stored in a `BTreeMap`, so a decoded-then-re-encoded
//! document comes out key-order normalized.

use std::collections::BTreeMap;

use serde_json::{Map, Value as Node};
use tracing::{debug, warn};

use crate::error::Error;
use crate::path::Path;
use crate::registry::{ErasedResource, ResourceRegistry};
use crate::resource::{DecodeOptions, UnknownFields};
use crate::yaml;
use crate::Result;

const KEY_FORMAT_VERSION: &str = "AWSTemplateFormatVersion";
const KEY_DESCRIPTION: &str = "Description";
const KEY_RESOURCES: &str = "Resources";

/// The format version the provisioning service currently publishes
pub const DEFAULT_FORMAT_VERSION: &str = "2010-09-09";

/// One provisioning document: declared resources keyed by logical id.
#[derive(Debug, Default)]
pub struct Template {
    /// Document format version; omitted from the wire when `None`
    pub format_version: Option<String>,

    /// Human-readable description; omitted from the wire when `None`
    pub description: Option<String>,

    /// Declared resources by logical id
    pub resources: BTreeMap<String, Box<dyn ErasedResource>>,

    /// Top-level sections captured under [`UnknownFields::Preserve`]
    pub unknown: BTreeMap<String, Node>,
}

impl Template {
    /// An empty document with the current format version
    pub fn new() -> Self {
        Self {
            format_version: Some(DEFAULT_FORMAT_VERSION.to_string()),
            ..Self::default()
        }
    }

    /// Declare a resource under a logical id, replacing any previous entry
    pub fn insert<R>(&mut self, logical_id: impl Into<String>, resource: R)
    where
        R: ErasedResource + 'static,
    {
        self.resources.insert(logical_id.into(), Box::new(resource));
    }

    /// Look up a declared resource by logical id
    pub fn get(&self, logical_id: &str) -> Option<&(dyn ErasedResource + 'static)> {
        self.resources.get(logical_id).map(|resource| &**resource)
    }

    // =========================================================================
    // Encode
    // =========================================================================

    /// Encode the document into its node form.
    ///
    /// `Resources` is always present (it is the document's point, even when
    /// empty); version and description only when set; preserved unknown
    /// sections re-emitted verbatim.
    pub fn to_node(&self) -> Result<Node> {
        let mut map = Map::new();
        if let Some(version) = &self.format_version {
            map.insert(KEY_FORMAT_VERSION.to_string(), Node::String(version.clone()));
        }
        if let Some(description) = &self.description {
            map.insert(KEY_DESCRIPTION.to_string(), Node::String(description.clone()));
        }

        let mut resources = Map::new();
        for (logical_id, resource) in &self.resources {
            resources.insert(logical_id.clone(), resource.to_node()?);
        }
        map.insert(KEY_RESOURCES.to_string(), Node::Object(resources));

        for (key, node) in &self.unknown {
            map.insert(key.clone(), node.clone());
        }
        Ok(Node::Object(map))
    }

    /// Encode the document as pretty-printed JSON text
    pub fn to_json(&self) -> Result<String> {
        let node = self.to_node()?;
        serde_json::to_string_pretty(&node)
            .map_err(|e| Error::serialization("Template", e.to_string()))
    }

    // =========================================================================
    // Decode
    // =========================================================================

    /// Decode a document node, resolving each resource entry through the
    /// registry.
    ///
    /// Any failure aborts the whole decode; there is no per-resource
    /// partial-success mode.
    pub fn from_node(
        node: &Node,
        registry: &ResourceRegistry,
        options: &DecodeOptions,
    ) -> Result<Self> {
        let path = Path::root();
        let map = node
            .as_object()
            .ok_or_else(|| Error::decode(&path, "expected a template object"))?;

        let mut template = Self::default();
        let mut saw_resources = false;
        for (key, value) in map {
            match key.as_str() {
                KEY_FORMAT_VERSION => {
                    let version = value.as_str().ok_or_else(|| {
                        Error::decode(
                            &path.key(KEY_FORMAT_VERSION),
                            "format version must be a string",
                        )
                    })?;
                    template.format_version = Some(version.to_string());
                }
                KEY_DESCRIPTION => {
                    let description = value.as_str().ok_or_else(|| {
                        Error::decode(&path.key(KEY_DESCRIPTION), "description must be a string")
                    })?;
                    template.description = Some(description.to_string());
                }
                KEY_RESOURCES => {
                    saw_resources = true;
                    let resources_path = path.key(KEY_RESOURCES);
                    let entries = value.as_object().ok_or_else(|| {
                        Error::decode(&resources_path, "`Resources` must be an object")
                    })?;
                    for (logical_id, entry) in entries {
                        let entry_path = resources_path.key(logical_id);
                        let resource = registry.decode_at(entry, options, &entry_path)?;
                        template.resources.insert(logical_id.clone(), resource);
                    }
                }
                unknown => match options.unknown_fields {
                    UnknownFields::Reject => {
                        return Err(Error::decode(
                            &path.key(unknown),
                            format!("unknown template section `{unknown}`"),
                        ));
                    }
                    UnknownFields::Preserve => {
                        warn!(section = unknown, "preserving unknown template section");
                        template.unknown.insert(key.clone(), value.clone());
                    }
                },
            }
        }
        if !saw_resources {
            return Err(Error::decode(&path, "missing required key `Resources`"));
        }

        debug!(resources = template.resources.len(), "decoded template");
        Ok(template)
    }

    /// Decode a document from JSON text
    pub fn from_json(
        text: &str,
        registry: &ResourceRegistry,
        options: &DecodeOptions,
    ) -> Result<Self> {
        let node: Node = serde_json::from_str(text)
            .map_err(|e| Error::decode(Path::root(), format!("invalid JSON: {e}")))?;
        Self::from_node(&node, registry, options)
    }

    /// Decode a document from YAML text; the YAML maps onto the same node
    /// model first, so both spellings decode identically
    pub fn from_yaml(
        text: &str,
        registry: &ResourceRegistry,
        options: &DecodeOptions,
    ) -> Result<Self> {
        let node = yaml::parse_yaml(text)?;
        Self::from_node(&node, registry, options)
    }
}
