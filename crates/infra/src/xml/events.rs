//! Event action listings

use archivum_domain::{ArchivumError, EventAction, Page, Result};
use chrono::{DateTime, NaiveDateTime, Utc};
use roxmltree::Node;

use super::{
    descendants, fragment, next_page_url, parse_document, parse_ref, required_child, required_text,
    Ns,
};

/// Parse one page of an `EventActionsResponse`.
///
/// Items keep document order; sorting is left to the caller once every page
/// has been collected.
///
/// # Errors
/// Returns `ArchivumError::Xml` for actions without an event, or events
/// without a type, reference or parseable date.
pub fn parse_event_actions_page(xml: &str) -> Result<Page<EventAction>> {
    let doc = parse_document(xml)?;
    let items = descendants(doc.root_element(), Ns::Xip, "EventAction")
        .map(event_from_action)
        .collect::<Result<Vec<_>>>()?;
    Ok(Page::new(items, next_page_url(&doc)))
}

fn event_from_action(action: Node<'_, '_>) -> Result<EventAction> {
    let event = required_child(action, Ns::Xip, "Event")?;

    let event_type = event
        .attribute("type")
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| ArchivumError::xml("missing type attribute on <Event>", fragment(event)))?;

    let raw_ref = required_text(event, Ns::Xip, "Ref")?;
    let raw_date = required_text(event, Ns::Xip, "Date")?;

    Ok(EventAction {
        event_ref: parse_ref(&raw_ref, event)?,
        event_type: event_type.to_string(),
        date_of_event: parse_timestamp(&raw_date)
            .ok_or_else(|| ArchivumError::xml(format!("invalid event date '{raw_date}'"), fragment(event)))?,
    })
}

/// Timestamps carry an offset (`2024-03-01T12:00:00.000Z`); a bare
/// timestamp is taken as UTC.
pub fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .ok()
        .or_else(|| {
            NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f").ok().map(|dt| dt.and_utc())
        })
}
