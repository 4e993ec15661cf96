//! XML mapping for the entity API
//!
//! Responses are parsed with `roxmltree` and picked apart with the helpers
//! below; request bodies are written with `quick-xml` in [`builders`].
//!
//! Elements are matched by local name and namespace family. The version
//! suffix of the namespace (`.../v7.7`) is ignored when reading so that one
//! client works against servers on different API versions.

pub mod bitstreams;
pub mod builders;
pub mod entities;
pub mod events;
pub mod identifiers;

use archivum_domain::constants::{ENTITY_API_NAMESPACE_PREFIX, XIP_NAMESPACE_PREFIX};
use archivum_domain::{ArchivumError, Result};
use roxmltree::{Document, Node};
use uuid::Uuid;

use crate::errors::InfraError;

/// Namespace families used by the entity API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ns {
    /// Response envelopes (`EntitiesResponse`, `Paging`, ...)
    EntityApi,
    /// Preservation objects (`InformationObject`, `Identifier`, ...)
    Xip,
}

impl Ns {
    pub fn prefix(self) -> &'static str {
        match self {
            Self::EntityApi => ENTITY_API_NAMESPACE_PREFIX,
            Self::Xip => XIP_NAMESPACE_PREFIX,
        }
    }

    /// Full namespace URI for an API version such as `7.7`.
    pub fn uri(self, version: &str) -> String {
        format!("{}{version}", self.prefix())
    }
}

/// Parse a response body, embedding the body in the error on failure.
pub fn parse_document(xml: &str) -> Result<Document<'_>> {
    Document::parse(xml).map_err(|err| match ArchivumError::from(InfraError::from(err)) {
        ArchivumError::Xml { message, .. } => ArchivumError::xml(message, xml),
        other => other,
    })
}

/// Source text of `node`, for error messages.
pub fn fragment<'a>(node: Node<'a, '_>) -> &'a str {
    let input = node.document().input_text();
    input.get(node.range()).unwrap_or(input)
}

pub fn is_element(node: Node<'_, '_>, ns: Ns, name: &str) -> bool {
    node.is_element()
        && node.tag_name().name() == name
        && node.tag_name().namespace().is_some_and(|uri| uri.starts_with(ns.prefix()))
}

/// First direct child element named `name`.
pub fn child<'a, 'i>(node: Node<'a, 'i>, ns: Ns, name: &str) -> Option<Node<'a, 'i>> {
    node.children().find(|c| is_element(*c, ns, name))
}

/// Direct child element that must be present.
///
/// # Errors
/// Returns `ArchivumError::Xml` naming the parent and missing child.
pub fn required_child<'a, 'i>(node: Node<'a, 'i>, ns: Ns, name: &str) -> Result<Node<'a, 'i>> {
    child(node, ns, name).ok_or_else(|| {
        ArchivumError::xml(
            format!("missing <{name}> in <{}>", node.tag_name().name()),
            fragment(node),
        )
    })
}

/// All descendant elements named `name`, in document order.
pub fn descendants<'a, 'i: 'a>(
    node: Node<'a, 'i>,
    ns: Ns,
    name: &'a str,
) -> impl Iterator<Item = Node<'a, 'i>> + 'a {
    node.descendants().filter(move |d| is_element(*d, ns, name))
}

/// Trimmed text content; empty text is treated as absent.
pub fn text(node: Node<'_, '_>) -> Option<String> {
    node.text().map(str::trim).filter(|t| !t.is_empty()).map(str::to_string)
}

pub fn child_text(node: Node<'_, '_>, ns: Ns, name: &str) -> Option<String> {
    child(node, ns, name).and_then(text)
}

/// Text of a child element that must be present and non-empty.
///
/// # Errors
/// Returns `ArchivumError::Xml` naming the parent and missing child.
pub fn required_text(node: Node<'_, '_>, ns: Ns, name: &str) -> Result<String> {
    let element = required_child(node, ns, name)?;
    text(element).ok_or_else(|| {
        ArchivumError::xml(
            format!("empty <{name}> in <{}>", node.tag_name().name()),
            fragment(node),
        )
    })
}

/// Parse a reference found in `context`.
///
/// # Errors
/// Returns `ArchivumError::Xml` when `value` is not a UUID.
pub fn parse_ref(value: &str, context: Node<'_, '_>) -> Result<Uuid> {
    Uuid::parse_str(value.trim()).map_err(|_| {
        ArchivumError::xml(
            format!("invalid reference '{value}' in <{}>", context.tag_name().name()),
            fragment(context),
        )
    })
}

/// URL of the next page, or `None` on the last page.
pub fn next_page_url(doc: &Document<'_>) -> Option<String> {
    descendants(doc.root_element(), Ns::EntityApi, "Paging")
        .next()
        .and_then(|paging| child_text(paging, Ns::EntityApi, "Next"))
}

/// Version token of the root element's namespace, e.g. `7.7`.
///
/// # Errors
/// Returns `ArchivumError::Xml` when the root has no versioned namespace.
pub fn api_version_token(xml: &str) -> Result<String> {
    let doc = parse_document(xml)?;
    let root = doc.root_element();
    root.tag_name()
        .namespace()
        .and_then(|uri| uri.rsplit('/').next())
        .and_then(|last| last.strip_prefix('v'))
        .filter(|version| !version.is_empty())
        .map(str::to_string)
        .ok_or_else(|| {
            ArchivumError::xml(
                format!("<{}> has no versioned namespace", root.tag_name().name()),
                fragment(root),
            )
        })
}

/// API version from the root element's namespace (`.../v7.7` -> `7.7`).
///
/// # Errors
/// Returns `ArchivumError::Xml` when no numeric version can be read.
pub fn api_version(xml: &str) -> Result<f32> {
    let token = api_version_token(xml)?;
    token
        .parse::<f32>()
        .map_err(|_| ArchivumError::xml(format!("unrecognized API version '{token}'"), xml))
}
