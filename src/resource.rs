//! The resource envelope codec
//!
//! Every declared resource enters the document through the same envelope:
//! its type identifier, the catalog-supplied property record, and a fixed
//! set of cross-cutting directives (explicit ordering, free-form metadata,
//! lifecycle policies, a named condition). This module implements that
//! envelope exactly once, generic over the property record, so the several
//! hundred generated catalog types share one encode/decode path.
//!
//! Encoding emits `Type` always and every other key only when it was
//! explicitly set. Decoding is strict: an envelope key the codec does not
//! recognize fails the whole decode unless the caller opts into
//! [`UnknownFields::Preserve`].

use std::collections::BTreeMap;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as Node};
use tracing::{trace, warn};

use crate::error::Error;
use crate::path::Path;
use crate::policy::{DeletionPolicy, UpdateReplacePolicy};
use crate::Result;

pub(crate) const KEY_TYPE: &str = "Type";
const KEY_PROPERTIES: &str = "Properties";
const KEY_DEPENDS_ON: &str = "DependsOn";
const KEY_METADATA: &str = "Metadata";
const KEY_DELETION_POLICY: &str = "DeletionPolicy";
const KEY_UPDATE_REPLACE_POLICY: &str = "UpdateReplacePolicy";
const KEY_CONDITION: &str = "Condition";

// =============================================================================
// Catalog contract
// =============================================================================

/// The contract a catalog-supplied property record implements to plug into
/// the envelope codec.
///
/// The record's own serde attributes carry the per-field emission policy
/// (always-emit vs omit-if-default) derived from the provider schema; the
/// associated constants carry the schema facts the codec itself needs.
pub trait ResourceProperties: Serialize + DeserializeOwned {
    /// The provider's type identifier (e.g. `AWS::AppMesh::GatewayRoute`)
    const TYPE: &'static str;

    /// Whether the schema declares any properties at all. A `Properties`
    /// block on a type that declares none is a decode error.
    const HAS_PROPERTIES: bool = true;

    /// Whether the schema declares at least one required property. A
    /// missing `Properties` block on such a type is a decode error.
    const REQUIRES_PROPERTIES: bool = false;
}

// =============================================================================
// Decode options
// =============================================================================

/// How to treat envelope keys the codec does not recognize.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum UnknownFields {
    /// Fail the whole decode. The safe default: a document the codec does
    /// not fully understand must never be re-encoded and re-submitted.
    #[default]
    Reject,
    /// Capture unknown keys and re-emit them on encode. For reading
    /// documents written against a newer provider schema than the local
    /// catalog.
    Preserve,
}

/// Caller-supplied decode configuration. No process-wide state; pass a
/// value wherever a decode happens.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DecodeOptions {
    /// Unknown envelope key handling
    pub unknown_fields: UnknownFields,
}

impl DecodeOptions {
    /// Strict decoding: reject anything unrecognized (the default)
    pub fn strict() -> Self {
        Self {
            unknown_fields: UnknownFields::Reject,
        }
    }

    /// Forward-compatible decoding: carry unknown envelope keys through
    pub fn preserving() -> Self {
        Self {
            unknown_fields: UnknownFields::Preserve,
        }
    }
}

// =============================================================================
// Resource
// =============================================================================

/// One declared resource: a property record inside its envelope.
///
/// Every directive defaults to its absent state and is only emitted when
/// set, so `decode(encode(r)) == r` holds including the distinction between
/// "never set" and "set to a default-looking value".
#[derive(Clone, Debug, PartialEq)]
pub struct Resource<P> {
    /// The catalog-supplied property record; `None` when the document entry
    /// carried no `Properties` block
    pub properties: Option<P>,

    /// Logical ids of sibling resources that must be provisioned first.
    /// Order carries caller intent and is preserved exactly, never resorted.
    pub depends_on: Vec<String>,

    /// Free-form metadata attached to the entry
    pub metadata: BTreeMap<String, Node>,

    /// What happens to the physical resource when this entry is deleted
    pub deletion_policy: DeletionPolicy,

    /// What happens to the physical resource when an update replaces it
    pub update_replace_policy: UpdateReplacePolicy,

    /// Name of a template condition gating this entry
    pub condition: Option<String>,

    /// Envelope keys captured under [`UnknownFields::Preserve`]; re-emitted
    /// verbatim on encode
    pub unknown: BTreeMap<String, Node>,
}

impl<P> Default for Resource<P> {
    fn default() -> Self {
        Self {
            properties: None,
            depends_on: Vec::new(),
            metadata: BTreeMap::new(),
            deletion_policy: DeletionPolicy::default(),
            update_replace_policy: UpdateReplacePolicy::default(),
            condition: None,
            unknown: BTreeMap::new(),
        }
    }
}

impl<P: ResourceProperties> Resource<P> {
    /// Wrap a property record in a directive-free envelope
    pub fn new(properties: P) -> Self {
        Self {
            properties: Some(properties),
            ..Self::default()
        }
    }

    /// An envelope with no property record, for resource types whose schema
    /// declares no properties
    pub fn without_properties() -> Self {
        Self::default()
    }

    /// The provider's type identifier for this resource
    pub fn type_identifier(&self) -> &'static str {
        P::TYPE
    }

    // =========================================================================
    // Encode
    // =========================================================================

    /// Encode this resource into its document entry.
    ///
    /// `Type` is always present; every other key is omitted at its default.
    /// Object keys are emitted in normalized (sorted) order; `DependsOn`
    /// element order is the caller's.
    pub fn to_node(&self) -> Result<Node> {
        let mut map = Map::new();
        map.insert(KEY_TYPE.to_string(), Node::String(P::TYPE.to_string()));

        if let Some(properties) = &self.properties {
            let node = serde_json::to_value(properties)
                .map_err(|e| Error::serialization(P::TYPE, e.to_string()))?;
            map.insert(KEY_PROPERTIES.to_string(), node);
        }
        if !self.depends_on.is_empty() {
            let ids = self
                .depends_on
                .iter()
                .map(|id| Node::String(id.clone()))
                .collect();
            map.insert(KEY_DEPENDS_ON.to_string(), Node::Array(ids));
        }
        if !self.metadata.is_empty() {
            let metadata: Map<String, Node> = self
                .metadata
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect();
            map.insert(KEY_METADATA.to_string(), Node::Object(metadata));
        }
        if let Some(policy) = self.deletion_policy.wire_value() {
            map.insert(KEY_DELETION_POLICY.to_string(), Node::String(policy.to_string()));
        }
        if let Some(policy) = self.update_replace_policy.wire_value() {
            map.insert(
                KEY_UPDATE_REPLACE_POLICY.to_string(),
                Node::String(policy.to_string()),
            );
        }
        if let Some(condition) = &self.condition {
            if !condition.is_empty() {
                map.insert(KEY_CONDITION.to_string(), Node::String(condition.clone()));
            }
        }
        for (key, node) in &self.unknown {
            map.insert(key.clone(), node.clone());
        }

        Ok(Node::Object(map))
    }

    // =========================================================================
    // Decode
    // =========================================================================

    /// Decode a document entry into this resource type.
    ///
    /// Fails if the entry's type identifier does not match the record's
    /// `ResourceProperties::TYPE`, if any envelope key is unrecognized
    /// under [`UnknownFields::Reject`], or if the property record rejects
    /// its block. There is no partial result: the first error aborts.
    pub fn from_node(node: &Node, options: &DecodeOptions) -> Result<Self> {
        Self::from_node_at(node, options, &Path::root())
    }

    pub(crate) fn from_node_at(
        node: &Node,
        options: &DecodeOptions,
        path: &Path<'_>,
    ) -> Result<Self> {
        let map = node
            .as_object()
            .ok_or_else(|| Error::decode(path, "expected a resource object"))?;

        let type_path = path.key(KEY_TYPE);
        let type_id = map
            .get(KEY_TYPE)
            .ok_or_else(|| Error::decode(path, "missing required key `Type`"))?
            .as_str()
            .ok_or_else(|| Error::decode(&type_path, "type identifier must be a string"))?;
        if type_id != P::TYPE {
            return Err(Error::decode(
                &type_path,
                format!("expected type `{}`, found `{type_id}`", P::TYPE),
            ));
        }
        trace!(type_id, "decoding resource envelope");

        if P::REQUIRES_PROPERTIES && !map.contains_key(KEY_PROPERTIES) {
            return Err(Error::decode(
                path,
                format!(
                    "resource type `{}` has required properties, but the entry \
                     has no `Properties` block",
                    P::TYPE
                ),
            ));
        }

        let mut resource = Self::default();
        for (key, value) in map {
            match key.as_str() {
                KEY_TYPE => {}
                KEY_PROPERTIES => {
                    let prop_path = path.key(KEY_PROPERTIES);
                    if !P::HAS_PROPERTIES {
                        return Err(Error::decode(
                            &prop_path,
                            format!(
                                "resource type `{}` declares no properties, but the \
                                 entry has a `Properties` block",
                                P::TYPE
                            ),
                        ));
                    }
                    resource.properties = Some(decode_properties::<P>(value, &prop_path)?);
                }
                KEY_DEPENDS_ON => {
                    resource.depends_on =
                        decode_depends_on(value, &path.key(KEY_DEPENDS_ON))?;
                }
                KEY_METADATA => {
                    let metadata = value.as_object().ok_or_else(|| {
                        Error::decode(&path.key(KEY_METADATA), "`Metadata` must be an object")
                    })?;
                    resource.metadata = metadata
                        .iter()
                        .map(|(k, v)| (k.clone(), v.clone()))
                        .collect();
                }
                KEY_DELETION_POLICY => {
                    let policy_path = path.key(KEY_DELETION_POLICY);
                    let text = value.as_str().ok_or_else(|| {
                        Error::decode(&policy_path, "`DeletionPolicy` must be a string")
                    })?;
                    resource.deletion_policy = text
                        .parse()
                        .map_err(|e: String| Error::decode(&policy_path, e))?;
                }
                KEY_UPDATE_REPLACE_POLICY => {
                    let policy_path = path.key(KEY_UPDATE_REPLACE_POLICY);
                    let text = value.as_str().ok_or_else(|| {
                        Error::decode(&policy_path, "`UpdateReplacePolicy` must be a string")
                    })?;
                    resource.update_replace_policy = text
                        .parse()
                        .map_err(|e: String| Error::decode(&policy_path, e))?;
                }
                KEY_CONDITION => {
                    let text = value.as_str().ok_or_else(|| {
                        Error::decode(&path.key(KEY_CONDITION), "`Condition` must be a string")
                    })?;
                    resource.condition = Some(text.to_string());
                }
                unknown => match options.unknown_fields {
                    UnknownFields::Reject => {
                        return Err(Error::decode(
                            &path.key(unknown),
                            format!(
                                "unknown key `{unknown}` in the envelope of resource \
                                 type `{}`",
                                P::TYPE
                            ),
                        ));
                    }
                    UnknownFields::Preserve => {
                        warn!(
                            key = unknown,
                            type_id = P::TYPE,
                            "preserving unknown envelope key"
                        );
                        resource.unknown.insert(key.clone(), value.clone());
                    }
                },
            }
        }

        Ok(resource)
    }
}

/// Decode the `Properties` block through the record's own serde decoder.
///
/// The record enforces per-field requiredness and (via
/// `deny_unknown_fields`) property-level strictness; this function only
/// classifies the failure: a missing required field is a validation error,
/// everything else is a decode error.
fn decode_properties<P: ResourceProperties>(node: &Node, path: &Path<'_>) -> Result<P> {
    if !node.is_object() {
        return Err(Error::decode(path, "`Properties` must be an object"));
    }
    serde_json::from_value(node.clone()).map_err(|e| {
        let message = format!("resource type `{}`: {e}", P::TYPE);
        if e.to_string().starts_with("missing field") {
            Error::validation(path, message)
        } else {
            Error::decode(path, message)
        }
    })
}

/// `DependsOn` accepts both a single logical id and a list of them; it
/// always re-encodes as a list, in the order given.
fn decode_depends_on(node: &Node, path: &Path<'_>) -> Result<Vec<String>> {
    match node {
        Node::String(id) => Ok(vec![id.clone()]),
        Node::Array(items) => items
            .iter()
            .enumerate()
            .map(|(i, item)| {
                item.as_str().map(str::to_string).ok_or_else(|| {
                    Error::decode(&path.index(i), "`DependsOn` entries must be logical id strings")
                })
            })
            .collect(),
        _ => Err(Error::decode(
            path,
            "`DependsOn` must be a logical id or a list of logical ids",
        )),
    }
}

// =============================================================================
// Serde integration
// =============================================================================
// Serde impls delegate to the node codec with default (strict) options so a
// Resource can sit inside any serde-decoded structure.

impl<P: ResourceProperties> Serialize for Resource<P> {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let node = self.to_node().map_err(serde::ser::Error::custom)?;
        node.serialize(serializer)
    }
}

impl<'de, P: ResourceProperties> Deserialize<'de> for Resource<P> {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let node = Node::deserialize(deserializer)?;
        Self::from_node(&node, &DecodeOptions::default()).map_err(serde::de::Error::custom)
    }
}
