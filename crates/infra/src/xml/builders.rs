//! Request bodies for the entity API
//!
//! Text content is escaped by the writer. Optional elements are left out
//! entirely when absent rather than written empty.

use archivum_domain::{
    AddEntityRequest, ArchivumError, EntityType, Identifier, IdentifierResponse, Result,
    UpdateEntityRequest,
};
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use uuid::Uuid;

use super::Ns;

struct XmlBuilder {
    writer: Writer<Vec<u8>>,
}

impl XmlBuilder {
    fn new() -> Result<Self> {
        let mut builder = Self { writer: Writer::new(Vec::new()) };
        builder.write(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), Some("yes"))))?;
        Ok(builder)
    }

    fn write(&mut self, event: Event<'_>) -> Result<()> {
        self.writer.write_event(event).map_err(write_error)
    }

    fn open(&mut self, name: &str, namespace: Option<&str>) -> Result<()> {
        let mut start = BytesStart::new(name);
        if let Some(namespace) = namespace {
            start.push_attribute(("xmlns", namespace));
        }
        self.write(Event::Start(start))
    }

    fn close(&mut self, name: &str) -> Result<()> {
        self.write(Event::End(BytesEnd::new(name)))
    }

    fn element(&mut self, name: &str, text: &str) -> Result<()> {
        self.open(name, None)?;
        self.write(Event::Text(BytesText::new(text)))?;
        self.close(name)
    }

    fn optional(&mut self, name: &str, text: Option<&str>) -> Result<()> {
        match text {
            Some(text) => self.element(name, text),
            None => Ok(()),
        }
    }

    fn finish(self) -> Result<String> {
        String::from_utf8(self.writer.into_inner())
            .map_err(|err| ArchivumError::Internal(format!("request XML is not UTF-8: {err}")))
    }
}

fn write_error(err: impl std::fmt::Display) -> ArchivumError {
    ArchivumError::Internal(format!("failed to write request XML: {err}"))
}

/// Body for attaching a new identifier to an entity.
pub fn identifier_xml(identifier: &Identifier, version: &str) -> Result<String> {
    let mut xml = XmlBuilder::new()?;
    xml.open("Identifier", Some(&Ns::Xip.uri(version)))?;
    xml.element("Type", &identifier.identifier_name)?;
    xml.element("Value", &identifier.value)?;
    xml.close("Identifier")?;
    xml.finish()
}

/// Body for replacing an existing identifier of `entity_ref`.
pub fn updated_identifier_xml(
    identifier: &IdentifierResponse,
    entity_ref: Uuid,
    version: &str,
) -> Result<String> {
    let mut xml = XmlBuilder::new()?;
    xml.open("Identifier", Some(&Ns::Xip.uri(version)))?;
    xml.element("Type", &identifier.identifier_name)?;
    xml.element("Value", &identifier.value)?;
    xml.element("Entity", &entity_ref.to_string())?;
    xml.close("Identifier")?;
    xml.finish()
}

fn entity_fields(
    xml: &mut XmlBuilder,
    entity_ref: Uuid,
    title: &str,
    description: Option<&str>,
    security_tag: &str,
    parent_ref: Option<Uuid>,
) -> Result<()> {
    xml.element("Ref", &entity_ref.to_string())?;
    xml.element("Title", title)?;
    xml.optional("Description", description)?;
    xml.element("SecurityTag", security_tag)?;
    xml.optional("Parent", parent_ref.map(|p| p.to_string()).as_deref())
}

/// Body for creating a structural or information object, wrapped in `XIP`.
///
/// # Errors
/// Returns `ArchivumError::InvalidInput` for content objects, which are
/// created by ingest rather than through this endpoint, and for information
/// objects without a parent.
pub fn add_entity_xml(request: &AddEntityRequest, entity_ref: Uuid, version: &str) -> Result<String> {
    if request.entity_type == EntityType::ContentObject {
        return Err(ArchivumError::InvalidInput(
            "content objects cannot be created directly".into(),
        ));
    }
    if request.entity_type != EntityType::StructuralObject && request.parent_ref.is_none() {
        return Err(ArchivumError::InvalidInput(format!(
            "{} requires a parent reference",
            request.entity_type.element_name()
        )));
    }

    let element = request.entity_type.element_name();
    let mut xml = XmlBuilder::new()?;
    xml.open("XIP", Some(&Ns::Xip.uri(version)))?;
    xml.open(element, None)?;
    entity_fields(
        &mut xml,
        entity_ref,
        &request.title,
        request.description.as_deref(),
        request.security_tag.as_str(),
        request.parent_ref,
    )?;
    xml.close(element)?;
    xml.close("XIP")?;
    xml.finish()
}

/// Body for updating an entity's title, description and security tag.
pub fn update_entity_xml(request: &UpdateEntityRequest, version: &str) -> Result<String> {
    let element = request.entity_type.element_name();
    let mut xml = XmlBuilder::new()?;
    xml.open(element, Some(&Ns::Xip.uri(version)))?;
    entity_fields(
        &mut xml,
        request.entity_ref,
        &request.title,
        request.description.as_deref(),
        request.security_tag.as_str(),
        request.parent_ref,
    )?;
    xml.close(element)?;
    xml.finish()
}
