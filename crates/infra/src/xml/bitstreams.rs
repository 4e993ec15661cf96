//! Generation and bitstream documents of content objects
//!
//! Resolving the bitstreams of a content object takes three hops:
//! `GenerationsResponse` lists generation URLs, each `GenerationResponse`
//! lists bitstream URLs, and each `BitstreamResponse` describes one file.

use std::collections::BTreeSet;

use archivum_domain::{ArchivumError, BitStreamInfo, Fixity, GenerationType, Result};
use uuid::Uuid;

use super::{
    child, child_text, descendants, fragment, parse_document, parse_ref, required_child,
    required_text, text, Ns,
};

/// What a single generation contributes to its bitstreams.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationInfo {
    pub version: i32,
    pub generation_type: GenerationType,
    pub content_object: Option<Uuid>,
    pub bitstream_urls: Vec<String>,
}

/// URLs of every generation listed in a `GenerationsResponse`.
///
/// # Errors
/// Returns `ArchivumError::Xml` for malformed XML.
pub fn parse_generation_urls(xml: &str) -> Result<Vec<String>> {
    let doc = parse_document(xml)?;
    Ok(descendants(doc.root_element(), Ns::EntityApi, "Generation").filter_map(text).collect())
}

/// Generation number from the trailing segment of its URL
/// (`.../generations/2` -> `2`).
///
/// # Errors
/// Returns `ArchivumError::Response` when the URL does not end in a number.
pub fn generation_version(url: &str) -> Result<i32> {
    url.trim_end_matches('/')
        .rsplit('/')
        .next()
        .and_then(|segment| segment.parse().ok())
        .ok_or_else(|| ArchivumError::Response(format!("generation URL without version: {url}")))
}

/// Parse a `GenerationResponse` fetched from `url`.
///
/// # Errors
/// Returns `ArchivumError::Xml` when the `Generation` element is missing or
/// the content object reference is malformed.
pub fn parse_generation(xml: &str, url: &str) -> Result<GenerationInfo> {
    let doc = parse_document(xml)?;
    let root = doc.root_element();
    let generation = required_child(root, Ns::Xip, "Generation")?;

    let original =
        generation.attribute("original").is_some_and(|o| o.trim().eq_ignore_ascii_case("true"));
    let content_object = child_text(generation, Ns::Xip, "ContentObject")
        .map(|raw| parse_ref(&raw, generation))
        .transpose()?;

    let bitstream_urls: Vec<String> = child(root, Ns::EntityApi, "Bitstreams")
        .map(|list| descendants(list, Ns::EntityApi, "Bitstream").filter_map(text).collect())
        .unwrap_or_default();

    Ok(GenerationInfo {
        version: generation_version(url)?,
        generation_type: if original { GenerationType::Original } else { GenerationType::Derived },
        content_object,
        bitstream_urls,
    })
}

/// Parse a `BitstreamResponse` belonging to `generation`.
///
/// Every `Fixity` element contributes one algorithm/value pair.
///
/// # Errors
/// Returns `ArchivumError::Xml` when the file name, size, a fixity part or
/// the content download URL is missing.
pub fn parse_bitstream(xml: &str, generation: &GenerationInfo) -> Result<BitStreamInfo> {
    let doc = parse_document(xml)?;
    let root = doc.root_element();
    let bitstream = required_child(root, Ns::Xip, "Bitstream")?;

    let name = required_text(bitstream, Ns::Xip, "Filename")?;
    let raw_size = required_text(bitstream, Ns::Xip, "FileSize")?;
    let file_size = raw_size.parse::<i64>().map_err(|_| {
        ArchivumError::xml(format!("invalid <FileSize> '{raw_size}'"), fragment(bitstream))
    })?;

    let mut fixities = BTreeSet::new();
    if let Some(list) = child(bitstream, Ns::Xip, "Fixities") {
        for fixity in descendants(list, Ns::Xip, "Fixity") {
            fixities.insert(Fixity::new(
                required_text(fixity, Ns::Xip, "FixityAlgorithmRef")?,
                required_text(fixity, Ns::Xip, "FixityValue")?,
            ));
        }
    }

    let info = required_child(root, Ns::EntityApi, "AdditionalInformation")?;
    let url = required_text(info, Ns::EntityApi, "Content")?;

    Ok(BitStreamInfo {
        name,
        url,
        file_size,
        fixities,
        generation_version: generation.version,
        generation_type: generation.generation_type,
        parent_ref: generation.content_object,
    })
}
