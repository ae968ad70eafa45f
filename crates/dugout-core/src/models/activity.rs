use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One line of the activity log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityEntry {
    pub id: i64,
    /// Verb, e.g. `create`, `update`, `delete`, `sync`
    pub action: String,
    /// Collection the action touched
    pub entity: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entity_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl ActivityEntry {
    pub fn summary(&self) -> String {
        match &self.entity_id {
            Some(id) => format!("{} {} #{}", self.action, self.entity, id),
            None => format!("{} {}", self.action, self.entity),
        }
    }
}
