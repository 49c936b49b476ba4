//! Key/value tags attached to declared resources
//!
//! Tags ride inside a property record as an ordered list; the order the
//! caller declares is the order that reaches the provisioning service.

use serde::{Deserialize, Serialize};

use crate::value::Value;

/// One key/value tag pair.
///
/// The key is plain text; the value may be any [`Value`], so tags can carry
/// intrinsic function results (`{"Key": "Name", "Value": {"Ref": "Cluster"}}`).
/// Immutable once constructed, like every value in a template.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Tag {
    /// Tag key
    #[serde(rename = "Key")]
    pub key: String,

    /// Tag value: literal text or an intrinsic function
    #[serde(rename = "Value")]
    pub value: Value,
}

impl Tag {
    /// Create a tag from a key and anything convertible to a [`Value`]
    pub fn new(key: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}
