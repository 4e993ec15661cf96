//! Bitstreams and their fixities

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::impl_wire_enum_conversions;

/// Whether a generation is the ingested original or a derived rendition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GenerationType {
    Original,
    Derived,
}

impl_wire_enum_conversions!(GenerationType {
    Original => "original",
    Derived => "derived",
});

/// Checksum algorithm/value pair.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Fixity {
    pub algorithm: String,
    pub value: String,
}

impl Fixity {
    pub fn new(algorithm: impl Into<String>, value: impl Into<String>) -> Self {
        Self { algorithm: algorithm.into(), value: value.into() }
    }
}

/// A single bitstream of a content object generation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BitStreamInfo {
    pub name: String,
    /// Download URL for the bitstream content.
    pub url: String,
    pub file_size: i64,
    pub fixities: BTreeSet<Fixity>,
    pub generation_version: i32,
    pub generation_type: GenerationType,
    /// Content object the generation belongs to.
    pub parent_ref: Option<Uuid>,
}
