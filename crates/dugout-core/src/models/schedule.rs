use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::record::lenient_id;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventType {
    Game,
    Practice,
}

impl std::fmt::Display for EventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EventType::Game => write!(f, "Game"),
            EventType::Practice => write!(f, "Practice"),
        }
    }
}

/// A scheduled game or practice.
///
/// `team_id` and `coach_id` are plain references; nothing checks them
/// against the team and coach collections.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleEvent {
    pub id: i64,
    /// `YYYY-MM-DD`
    pub date: String,
    /// `HH:MM`, 24-hour
    pub time: String,
    #[serde(rename = "type")]
    pub event_type: EventType,
    pub title: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub team_id: Option<i64>,
    #[serde(default)]
    pub coach_id: Option<i64>,
    #[serde(default)]
    pub notes: String,
}

impl ScheduleEvent {
    /// Sort key: ISO dates and 24-hour times order correctly as strings.
    pub fn sort_key(&self) -> (&str, &str) {
        (self.date.as_str(), self.time.as_str())
    }

    pub fn is_game(&self) -> bool {
        self.event_type == EventType::Game
    }
}

/// A request to add an entry to the schedule, held for admin review.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventRequest {
    #[serde(default, deserialize_with = "lenient_id")]
    pub id: i64,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
    /// Absent on requests written by clients that did not stamp them
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl EventRequest {
    /// Build a request from caller-supplied fields. Any `id` or `created_at`
    /// in the payload is replaced by the assigned values.
    pub fn new(id: i64, mut fields: Map<String, Value>, created_at: DateTime<Utc>) -> Self {
        fields.remove("id");
        fields.remove("created_at");
        Self {
            id,
            fields,
            created_at: Some(created_at),
        }
    }

    pub fn title(&self) -> Option<&str> {
        self.fields
            .get("event_title")
            .or_else(|| self.fields.get("title"))
            .and_then(Value::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_schedule_event() {
        let json = r#"{"id": 1, "date": "2025-07-20", "time": "18:00", "type": "game", "title": "Bucksport Blue Jays vs. Orland Orcas", "location": "Field A", "team_id": 1, "coach_id": 1, "notes": "Championship game!"}"#;
        let event: ScheduleEvent =
            serde_json::from_str(json).expect("Failed to parse schedule event JSON");
        assert_eq!(event.event_type, EventType::Game);
        assert!(event.is_game());
        assert_eq!(event.team_id, Some(1));
        assert_eq!(event.sort_key(), ("2025-07-20", "18:00"));
    }

    #[test]
    fn test_unknown_event_type_rejected() {
        let json = r#"{"id": 1, "date": "2025-07-20", "time": "18:00", "type": "scrimmage", "title": "x"}"#;
        assert!(serde_json::from_str::<ScheduleEvent>(json).is_err());
    }

    #[test]
    fn test_event_request_strips_reserved_fields() {
        let fields = json!({
            "id": 99,
            "created_at": "yesterday",
            "event_title": "Makeup game",
            "event_date": "2025-08-01",
        });
        let fields = fields.as_object().cloned().unwrap();
        let request = EventRequest::new(4, fields, Utc::now());

        assert_eq!(request.id, 4);
        assert!(!request.fields.contains_key("id"));
        assert!(!request.fields.contains_key("created_at"));
        assert_eq!(request.title(), Some("Makeup game"));

        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["id"], 4);
        assert_eq!(value["event_date"], "2025-08-01");
        assert!(value["created_at"].is_string());
    }

    #[test]
    fn test_event_request_without_timestamp_parses() {
        let request: EventRequest =
            serde_json::from_value(json!({"id": 1, "event_title": "Old"})).unwrap();
        assert_eq!(request.id, 1);
        assert!(request.created_at.is_none());
        assert_eq!(request.title(), Some("Old"));
    }
}
