//! Entity listings and single-entity documents

use archivum_domain::{ArchivumError, Entity, EntityType, Page, Result, SecurityTag};
use roxmltree::Node;
use tracing::warn;

use super::{child_text, descendants, fragment, next_page_url, parse_document, parse_ref, Ns};

/// Parse one page of an `EntitiesResponse`, as returned by the
/// updated-since and by-identifier endpoints.
///
/// # Errors
/// Returns `ArchivumError::Xml` for malformed XML or entries without a
/// valid `ref`.
pub fn parse_entities_page(xml: &str) -> Result<Page<Entity>> {
    parse_listing(xml, "Entity")
}

/// Parse one page of a `ChildrenResponse`.
///
/// # Errors
/// Same as [`parse_entities_page`].
pub fn parse_children_page(xml: &str) -> Result<Page<Entity>> {
    parse_listing(xml, "Child")
}

fn parse_listing(xml: &str, item: &str) -> Result<Page<Entity>> {
    let doc = parse_document(xml)?;
    let items = descendants(doc.root_element(), Ns::EntityApi, item)
        .map(entity_from_attributes)
        .collect::<Result<Vec<_>>>()?;
    Ok(Page::new(items, next_page_url(&doc)))
}

/// Listing entries carry everything in attributes:
/// `<Entity title=".." ref=".." type="IO" deleted="true"/>`.
fn entity_from_attributes(node: Node<'_, '_>) -> Result<Entity> {
    let raw_ref = node.attribute("ref").ok_or_else(|| {
        ArchivumError::xml(
            format!("missing ref attribute on <{}>", node.tag_name().name()),
            fragment(node),
        )
    })?;

    let entity_type = node.attribute("type").and_then(EntityType::from_discriminant);
    if entity_type.is_none() {
        warn!(entity_ref = raw_ref, raw_type = ?node.attribute("type"), "unrecognized entity type");
    }

    Ok(Entity {
        entity_ref: parse_ref(raw_ref, node)?,
        entity_type,
        title: node.attribute("title").map(str::to_string),
        description: node.attribute("description").map(str::to_string),
        deleted: node.attribute("deleted").is_some_and(|d| d.trim().eq_ignore_ascii_case("true")),
        security_tag: None,
        parent: None,
    })
}

/// Parse an `EntityResponse` (or a bare `XIP` document) holding one
/// `StructuralObject`, `InformationObject` or `ContentObject`.
///
/// # Errors
/// Returns `ArchivumError::Xml` when no object element is present or its
/// `Ref` is missing or malformed.
pub fn parse_entity(xml: &str) -> Result<Entity> {
    let doc = parse_document(xml)?;
    let root = doc.root_element();

    let object = root
        .descendants()
        .find(|node| {
            node.is_element()
                && node.tag_name().namespace().is_some_and(|uri| uri.starts_with(Ns::Xip.prefix()))
                && EntityType::from_discriminant(node.tag_name().name()).is_some()
        })
        .ok_or_else(|| {
            ArchivumError::xml(
                format!("missing entity object in <{}>", root.tag_name().name()),
                fragment(root),
            )
        })?;

    entity_from_object(object)
}

fn entity_from_object(object: Node<'_, '_>) -> Result<Entity> {
    let entity_type = EntityType::from_discriminant(object.tag_name().name());
    let raw_ref = super::required_text(object, Ns::Xip, "Ref")?;

    let security_tag = child_text(object, Ns::Xip, "SecurityTag")
        .map(|tag| {
            tag.parse::<SecurityTag>().map_err(|err| ArchivumError::xml(err.to_string(), fragment(object)))
        })
        .transpose()?;

    let parent = child_text(object, Ns::Xip, "Parent")
        .map(|parent| parse_ref(&parent, object))
        .transpose()?;

    Ok(Entity {
        entity_ref: parse_ref(&raw_ref, object)?,
        entity_type,
        title: child_text(object, Ns::Xip, "Title"),
        description: child_text(object, Ns::Xip, "Description"),
        deleted: false,
        security_tag,
        parent,
    })
}
