//! Type-identifier registry
//!
//! One explicit mapping from provider type identifier to decode function,
//! built once at startup and shared immutably after that. The envelope
//! codec itself never knows which record shape a `Type` string maps to;
//! resolving that is this registry's whole job.

use std::any::Any;
use std::collections::HashMap;
use std::fmt;

use serde_json::Value as Node;
use tracing::{debug, warn};

use crate::error::Error;
use crate::path::Path;
use crate::resource::{DecodeOptions, Resource, ResourceProperties, KEY_TYPE};
use crate::Result;

/// A decoded resource with its concrete property type erased.
///
/// Produced by [`ResourceRegistry::decode`] when the caller does not know
/// the concrete type up front (reading a whole document back for
/// inspection or diffing). Re-encodes like the typed resource it wraps and
/// downcasts back to it on demand.
pub trait ErasedResource: fmt::Debug + Send + Sync {
    /// The provider's type identifier for this resource
    fn type_identifier(&self) -> &'static str;

    /// Encode into the document entry, identically to the typed resource
    fn to_node(&self) -> Result<Node>;

    /// Access as `Any` for downcasting; prefer the `downcast_ref` helper
    fn as_any(&self) -> &dyn Any;
}

impl<P> ErasedResource for Resource<P>
where
    P: ResourceProperties + fmt::Debug + Send + Sync + 'static,
{
    fn type_identifier(&self) -> &'static str {
        P::TYPE
    }

    fn to_node(&self) -> Result<Node> {
        Resource::to_node(self)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl dyn ErasedResource {
    /// Downcast back to the typed resource, if `P` is its concrete type
    pub fn downcast_ref<P>(&self) -> Option<&Resource<P>>
    where
        P: ResourceProperties + fmt::Debug + Send + Sync + 'static,
    {
        self.as_any().downcast_ref::<Resource<P>>()
    }
}

type DecodeFn = fn(&Node, &DecodeOptions, &Path<'_>) -> Result<Box<dyn ErasedResource>>;

fn decode_erased<P>(
    node: &Node,
    options: &DecodeOptions,
    path: &Path<'_>,
) -> Result<Box<dyn ErasedResource>>
where
    P: ResourceProperties + fmt::Debug + Send + Sync + 'static,
{
    Ok(Box::new(Resource::<P>::from_node_at(node, options, path)?))
}

/// The mapping from type identifier to resource decoder.
///
/// The CLI builds one at startup, registering every catalog record it
/// links, then shares it immutably across document decodes.
#[derive(Debug, Default)]
pub struct ResourceRegistry {
    decoders: HashMap<&'static str, DecodeFn>,
}

impl ResourceRegistry {
    /// An empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the decoder for one catalog record type.
    ///
    /// Registering the same type identifier twice replaces the earlier
    /// decoder; the identifiers are a provider-wide namespace, so a clash
    /// means two records claim the same schema entry.
    pub fn register<P>(&mut self)
    where
        P: ResourceProperties + fmt::Debug + Send + Sync + 'static,
    {
        debug!(type_id = P::TYPE, "registering resource decoder");
        if self.decoders.insert(P::TYPE, decode_erased::<P>).is_some() {
            warn!(type_id = P::TYPE, "replaced an existing resource decoder");
        }
    }

    /// Returns true if a decoder is registered for this type identifier
    pub fn contains(&self, type_id: &str) -> bool {
        self.decoders.contains_key(type_id)
    }

    /// Number of registered type identifiers
    pub fn len(&self) -> usize {
        self.decoders.len()
    }

    /// Returns true if no decoder has been registered
    pub fn is_empty(&self) -> bool {
        self.decoders.is_empty()
    }

    /// Iterate the registered type identifiers (unordered)
    pub fn type_identifiers(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.decoders.keys().copied()
    }

    /// Decode one document entry by reading its `Type` key and dispatching
    /// to the registered decoder.
    ///
    /// Fails if the entry has no usable `Type`, if no decoder is registered
    /// for the identifier, or if the dispatched decode fails.
    pub fn decode(&self, node: &Node, options: &DecodeOptions) -> Result<Box<dyn ErasedResource>> {
        self.decode_at(node, options, &Path::root())
    }

    pub(crate) fn decode_at(
        &self,
        node: &Node,
        options: &DecodeOptions,
        path: &Path<'_>,
    ) -> Result<Box<dyn ErasedResource>> {
        let map = node
            .as_object()
            .ok_or_else(|| Error::decode(path, "expected a resource object"))?;
        let type_path = path.key(KEY_TYPE);
        let type_id = map
            .get(KEY_TYPE)
            .ok_or_else(|| Error::decode(path, "missing required key `Type`"))?
            .as_str()
            .ok_or_else(|| Error::decode(&type_path, "type identifier must be a string"))?;

        let decoder = self.decoders.get(type_id).ok_or_else(|| {
            Error::decode(
                &type_path,
                format!("unresolvable type identifier `{type_id}`: no decoder registered"),
            )
        })?;
        decoder(node, options, path)
    }
}
