//! Default collection contents written on first run.

use serde_json::{json, Value};

use super::CollectionKey;

/// Seed value for `key`. Collections that start out empty still get an
/// explicit empty container so later reads never see a missing key.
pub fn default_value(key: CollectionKey) -> Value {
    match key {
        CollectionKey::Teams => json!([
            {"id": 1, "name": "Bucksport Blue Jays", "division": "Baseball"},
            {"id": 2, "name": "Bucksport Softball", "division": "Softball"},
            {"id": 3, "name": "Minor League All-Stars", "division": "Baseball"},
        ]),
        CollectionKey::Coaches => json!([
            {"id": 1, "name": "Coach Bob"},
            {"id": 2, "name": "Coach Sarah"},
            {"id": 3, "name": "Coach Mike"},
        ]),
        CollectionKey::Schedule => json!([
            {
                "id": 1, "date": "2025-07-20", "time": "18:00", "type": "game",
                "title": "Bucksport Blue Jays vs. Orland Orcas", "location": "Field A",
                "team_id": 1, "coach_id": 1, "notes": "Championship game!"
            },
            {
                "id": 2, "date": "2025-07-21", "time": "17:30", "type": "practice",
                "title": "Softball Team Practice", "location": "Field B",
                "team_id": 2, "coach_id": 2, "notes": "Focus on fielding drills."
            },
            {
                "id": 3, "date": "2025-07-20", "time": "16:00", "type": "game",
                "title": "Minor League All-Stars", "location": "Field C",
                "team_id": 3, "coach_id": 3, "notes": ""
            },
        ]),
        CollectionKey::Locations => json!(["Field A", "Field B", "Field C", "Community Park"]),
        CollectionKey::Categories => json!([
            "jersey", "pants", "hat", "cleats", "bat", "ball", "glove", "helmet", "other"
        ]),
        CollectionKey::Statuses => json!(["Available", "Checked Out", "Needs Repair", "Retired"]),
        CollectionKey::Players
        | CollectionKey::Inventory
        | CollectionKey::Concessions
        | CollectionKey::EventRequests
        | CollectionKey::ActivityLog => json!([]),
        CollectionKey::EventUsage => json!({}),
    }
}
