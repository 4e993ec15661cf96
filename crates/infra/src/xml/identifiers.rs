//! External identifier documents

use archivum_domain::{IdentifierResponse, Page, Result};
use roxmltree::Node;

use super::{descendants, next_page_url, parse_document, required_text, Ns};

/// Parse one page of an `IdentifiersResponse`.
///
/// # Errors
/// Returns `ArchivumError::Xml` when an identifier lacks its `ApiId`,
/// `Type` or `Value`.
pub fn parse_identifiers_page(xml: &str) -> Result<Page<IdentifierResponse>> {
    let doc = parse_document(xml)?;
    let items = descendants(doc.root_element(), Ns::Xip, "Identifier")
        .map(identifier_from_node)
        .collect::<Result<Vec<_>>>()?;
    Ok(Page::new(items, next_page_url(&doc)))
}

/// Parse the single identifier echoed back after creating or updating one.
///
/// # Errors
/// Returns `ArchivumError::Xml` when the document holds no identifier.
pub fn parse_identifier(xml: &str) -> Result<IdentifierResponse> {
    let doc = parse_document(xml)?;
    let root = doc.root_element();
    let node = if super::is_element(root, Ns::Xip, "Identifier") {
        root
    } else {
        super::required_child(root, Ns::Xip, "Identifier")?
    };
    identifier_from_node(node)
}

fn identifier_from_node(node: Node<'_, '_>) -> Result<IdentifierResponse> {
    Ok(IdentifierResponse {
        id: required_text(node, Ns::Xip, "ApiId")?,
        identifier_name: required_text(node, Ns::Xip, "Type")?,
        value: required_text(node, Ns::Xip, "Value")?,
    })
}
