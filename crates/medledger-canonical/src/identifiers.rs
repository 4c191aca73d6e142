use crate::validation::ValidationError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a registered actor (a patient or a hospital).
///
/// The ledger does not impose a shape on identifiers beyond being non-blank;
/// schema checks belong to whoever deserializes the request.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActorId(String);

impl ActorId {
    /// Creates a new instance without validation; callers are responsible for conformity.
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Parses a validated identifier from a string.
    pub fn parse(value: impl Into<String>) -> Result<Self, ValidationError> {
        let s = value.into();
        if s.trim().is_empty() {
            return Err(ValidationError::Empty { field: "ActorId" });
        }
        Ok(Self(s))
    }

    /// Whether the identifier is empty or whitespace only.
    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }

    /// String form of the identifier.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for ActorId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for ActorId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl AsRef<str> for ActorId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ActorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
