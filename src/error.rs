//! Error types for the Cumulus template core
//!
//! Errors carry the document path of the offending node so a failure inside
//! a large template can be located without re-reading the whole document.
//! Any decode error aborts decoding of the entire containing template; no
//! partially-understood document is ever produced.

use thiserror::Error;

/// Main error type for template encode/decode operations
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// A document node failed structural decoding
    #[error("decode error at {path}: {message}")]
    Decode {
        /// Document path of the offending node (e.g. `$.Resources.Gateway.Properties`)
        path: String,
        /// What was wrong with the node: malformed shape, unknown key,
        /// unrecognized intrinsic function name, wrong argument arity
        message: String,
    },

    /// A schema-required field was absent from an otherwise well-formed node
    #[error("validation error at {path}: {message}")]
    Validation {
        /// Document path of the incomplete node
        path: String,
        /// Which required data was missing
        message: String,
    },

    /// Encoding a resource into its document form failed
    #[error("serialization error for {type_id}: {message}")]
    Serialization {
        /// Type identifier of the resource being encoded
        type_id: String,
        /// Description of what failed
        message: String,
    },
}

impl Error {
    /// Create a decode error at the given document path
    pub fn decode(path: impl ToString, message: impl Into<String>) -> Self {
        Self::Decode {
            path: path.to_string(),
            message: message.into(),
        }
    }

    /// Create a validation error at the given document path
    pub fn validation(path: impl ToString, message: impl Into<String>) -> Self {
        Self::Validation {
            path: path.to_string(),
            message: message.into(),
        }
    }

    /// Create a serialization error for the given resource type identifier
    pub fn serialization(type_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Serialization {
            type_id: type_id.into(),
            message: message.into(),
        }
    }

    /// The document path this error points at, if it carries one
    pub fn path(&self) -> Option<&str> {
        match self {
            Self::Decode { path, .. } | Self::Validation { path, .. } => Some(path),
            Self::Serialization { .. } => None,
        }
    }
}
