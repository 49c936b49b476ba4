//! Template model for the Cumulus cluster orchestration CLI
//!
//! Cumulus declares cloud infrastructure (clusters, node groups, mesh routes,
//! IAM policies, etc.) as provisioning-service templates. This crate is the
//! single point every declared resource passes through on its way into, and
//! back out of, that wire format.
//!
//! # Modules
//!
//! - [`value`] - property values: literal scalars or provider-evaluated
//!   intrinsic function calls, nested to any depth
//! - [`resource`] - the generic envelope (type identifier, properties,
//!   ordering/metadata/lifecycle directives) wrapped around every
//!   catalog-supplied property record
//! - [`registry`] - the mapping from type identifier to decoder, built once
//!   at startup
//! - [`document`] - the template document container
//! - [`tag`] - key/value tag pairs
//! - [`policy`] - resource lifecycle policies (deletion, update-replace)
//! - [`yaml`] - YAML ingestion onto the JSON node model
//! - [`error`] - error types for the template core
//!
//! The generated resource catalog (one record per documented provider
//! resource) lives outside this crate and plugs in through the
//! [`resource::ResourceProperties`] trait.
//!
//! Decoding is strict by default: a template the codec does not fully
//! understand is rejected outright rather than silently misread, since a
//! half-understood document risks an unintended resource deletion or
//! replacement when re-submitted. See [`resource::DecodeOptions`] for the
//! forward-compatible alternative.

#![deny(missing_docs)]

pub mod document;
pub mod error;
mod path;
pub mod policy;
pub mod registry;
pub mod resource;
pub mod tag;
pub mod value;
pub mod yaml;

pub use document::Template;
pub use error::Error;
pub use policy::{DeletionPolicy, UpdateReplacePolicy};
pub use registry::{ErasedResource, ResourceRegistry};
pub use resource::{DecodeOptions, Resource, ResourceProperties, UnknownFields};
pub use tag::Tag;
pub use value::{Value, ValueList};

/// Result type alias using our custom Error type
pub type Result<T> = std::result::Result<T, Error>;
