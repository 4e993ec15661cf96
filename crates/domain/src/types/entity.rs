//! Entities in the remote content hierarchy

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::impl_wire_enum_conversions;

/// Structural classification of an entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityType {
    StructuralObject,
    InformationObject,
    ContentObject,
}

impl EntityType {
    /// Resolve a classification from either the two-letter code used in
    /// listings (`SO`, `IO`, `CO`) or the full element name used in XIP
    /// documents (`StructuralObject`, ...).
    ///
    /// Returns `None` for anything else; callers must not guess a default.
    pub fn from_discriminant(value: &str) -> Option<Self> {
        match value.trim() {
            "SO" | "StructuralObject" => Some(Self::StructuralObject),
            "IO" | "InformationObject" => Some(Self::InformationObject),
            "CO" | "ContentObject" => Some(Self::ContentObject),
            _ => None,
        }
    }

    /// URL path segment for this type under `/api/entity`.
    pub fn path(self) -> &'static str {
        match self {
            Self::StructuralObject => "structural-objects",
            Self::InformationObject => "information-objects",
            Self::ContentObject => "content-objects",
        }
    }

    /// Two-letter code used in listings.
    pub fn short_code(self) -> &'static str {
        match self {
            Self::StructuralObject => "SO",
            Self::InformationObject => "IO",
            Self::ContentObject => "CO",
        }
    }

    /// XIP element name.
    pub fn element_name(self) -> &'static str {
        match self {
            Self::StructuralObject => "StructuralObject",
            Self::InformationObject => "InformationObject",
            Self::ContentObject => "ContentObject",
        }
    }
}

impl std::fmt::Display for EntityType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.short_code())
    }
}

/// Access classification of an entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SecurityTag {
    Open,
    Closed,
}

impl_wire_enum_conversions!(SecurityTag {
    Open => "open",
    Closed => "closed",
});

/// A node in the remote content hierarchy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entity {
    pub entity_ref: Uuid,
    /// `None` when the response carried no recognizable type.
    pub entity_type: Option<EntityType>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub deleted: bool,
    pub security_tag: Option<SecurityTag>,
    pub parent: Option<Uuid>,
}

impl Entity {
    /// URL path segment derived from the entity type.
    ///
    /// `None` signals the type was absent or unrecognized.
    pub fn path(&self) -> Option<&'static str> {
        self.entity_type.map(EntityType::path)
    }
}

/// Request to create a new structural or information object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddEntityRequest {
    /// Reference to assign; a random one is generated when absent.
    pub entity_ref: Option<Uuid>,
    pub title: String,
    pub description: Option<String>,
    pub entity_type: EntityType,
    pub security_tag: SecurityTag,
    pub parent_ref: Option<Uuid>,
}

/// Request to change the title, description or security tag of an entity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateEntityRequest {
    pub entity_ref: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub entity_type: EntityType,
    pub security_tag: SecurityTag,
    pub parent_ref: Option<Uuid>,
}
