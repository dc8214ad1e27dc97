//! # Identity Newtypes
//!
//! UUID-backed identifiers for the entities the result pipeline touches.
//! Each identifier is a distinct type: you cannot pass a [`ModelId`]
//! where a [`RunId`] is expected. Both are always valid by construction;
//! parsing from text goes through [`std::str::FromStr`].

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{CoreResult, MappingError};

/// A unique identifier for one execution of the solver against a model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RunId(Uuid);

impl RunId {
    /// Create a new random run identifier.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create a run identifier from an existing UUID.
    pub fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    /// Access the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for RunId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RunId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for RunId {
    type Err = MappingError;

    fn from_str(s: &str) -> CoreResult<Self> {
        Uuid::parse_str(s)
            .map(Self)
            .map_err(|e| MappingError::InvalidIdentifier {
                kind: "run",
                input: s.to_string(),
                reason: e.to_string(),
            })
    }
}

/// A unique identifier for an optimization model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ModelId(Uuid);

impl ModelId {
    /// Create a new random model identifier.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create a model identifier from an existing UUID.
    pub fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    /// Access the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for ModelId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ModelId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ModelId {
    type Err = MappingError;

    fn from_str(s: &str) -> CoreResult<Self> {
        Uuid::parse_str(s)
            .map(Self)
            .map_err(|e| MappingError::InvalidIdentifier {
                kind: "model",
                input: s.to_string(),
                reason: e.to_string(),
            })
    }
}
