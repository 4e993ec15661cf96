//! Audit events recorded against entities

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An event recorded against an entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventAction {
    pub event_ref: Uuid,
    pub event_type: String,
    pub date_of_event: DateTime<Utc>,
}

impl EventAction {
    /// Sort newest first. Ties keep their original relative order.
    pub fn sort_newest_first(actions: &mut [EventAction]) {
        actions.sort_by(|a, b| b.date_of_event.cmp(&a.date_of_event));
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn action(event_type: &str, day: u32) -> EventAction {
        EventAction {
            event_ref: Uuid::new_v4(),
            event_type: event_type.to_string(),
            date_of_event: Utc.with_ymd_and_hms(2024, 3, day, 12, 0, 0).unwrap(),
        }
    }

    #[test]
    fn sorts_reverse_chronologically() {
        let mut actions = vec![action("Ingest", 1), action("Modified", 20), action("Moved", 5)];
        EventAction::sort_newest_first(&mut actions);

        let types: Vec<_> = actions.iter().map(|a| a.event_type.as_str()).collect();
        assert_eq!(types, vec!["Modified", "Moved", "Ingest"]);
    }
}
