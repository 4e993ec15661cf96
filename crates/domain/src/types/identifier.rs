//! External identifiers attached to entities

use serde::{Deserialize, Serialize};

/// A `(name, value)` identifier to attach to an entity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Identifier {
    pub identifier_name: String,
    pub value: String,
}

impl Identifier {
    pub fn new(identifier_name: impl Into<String>, value: impl Into<String>) -> Self {
        Self { identifier_name: identifier_name.into(), value: value.into() }
    }
}

/// An identifier as persisted by the API, carrying its assigned id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IdentifierResponse {
    pub id: String,
    pub identifier_name: String,
    pub value: String,
}

impl IdentifierResponse {
    /// Drop the assigned id.
    pub fn to_identifier(&self) -> Identifier {
        Identifier::new(self.identifier_name.clone(), self.value.clone())
    }
}
