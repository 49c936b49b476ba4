//! Resource lifecycle policies
//!
//! `DeletionPolicy` and `UpdateReplacePolicy` tell the provisioning service
//! what to do with the underlying physical resource when its declaring entry
//! is deleted or replaced. Both default to `Unset`, which means "the
//! directive was never written" and is never emitted to the wire; `Unset`
//! must never be confused with an explicit `Delete`.

use std::str::FromStr;

/// What happens to the physical resource when its entry is deleted.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum DeletionPolicy {
    /// Delete the physical resource
    Delete,
    /// Keep the physical resource
    Retain,
    /// Snapshot the physical resource before deleting it
    Snapshot,
    /// Directive not set; the key is omitted from the document
    #[default]
    Unset,
}

impl DeletionPolicy {
    /// The wire spelling, or `None` for `Unset` (which is never emitted)
    pub fn wire_value(&self) -> Option<&'static str> {
        match self {
            Self::Delete => Some("Delete"),
            Self::Retain => Some("Retain"),
            Self::Snapshot => Some("Snapshot"),
            Self::Unset => None,
        }
    }

    /// Returns true if the directive was never set
    pub fn is_unset(&self) -> bool {
        matches!(self, Self::Unset)
    }
}

impl FromStr for DeletionPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Delete" => Ok(Self::Delete),
            "Retain" => Ok(Self::Retain),
            "Snapshot" => Ok(Self::Snapshot),
            _ => Err(format!(
                "invalid DeletionPolicy `{s}`, expected one of: Delete, Retain, Snapshot"
            )),
        }
    }
}

impl std::fmt::Display for DeletionPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.wire_value().unwrap_or("Unset"))
    }
}

/// What happens to the physical resource when an update replaces its entry.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum UpdateReplacePolicy {
    /// Delete the replaced physical resource
    Delete,
    /// Keep the replaced physical resource
    Retain,
    /// Snapshot the replaced physical resource first
    Snapshot,
    /// Directive not set; the key is omitted from the document
    #[default]
    Unset,
}

impl UpdateReplacePolicy {
    /// The wire spelling, or `None` for `Unset` (which is never emitted)
    pub fn wire_value(&self) -> Option<&'static str> {
        match self {
            Self::Delete => Some("Delete"),
            Self::Retain => Some("Retain"),
            Self::Snapshot => Some("Snapshot"),
            Self::Unset => None,
        }
    }

    /// Returns true if the directive was never set
    pub fn is_unset(&self) -> bool {
        matches!(self, Self::Unset)
    }
}

impl FromStr for UpdateReplacePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Delete" => Ok(Self::Delete),
            "Retain" => Ok(Self::Retain),
            "Snapshot" => Ok(Self::Snapshot),
            _ => Err(format!(
                "invalid UpdateReplacePolicy `{s}`, expected one of: Delete, Retain, Snapshot"
            )),
        }
    }
}

impl std::fmt::Display for UpdateReplacePolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.wire_value().unwrap_or("Unset"))
    }
}
