use serde::{Deserialize, Serialize};

use super::record::lenient_id;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Team {
    #[serde(default, deserialize_with = "lenient_id")]
    pub id: i64,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub division: Option<String>,
    /// Head coach's name, free text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coach: Option<String>,
}

impl Team {
    /// Name with division suffix, e.g. "Blue Jays (Baseball)"
    pub fn display_name(&self) -> String {
        match self.division.as_deref() {
            Some(division) if !division.is_empty() => format!("{} ({})", self.name, division),
            _ => self.name.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Coach {
    pub id: i64,
    pub name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_team_display_name() {
        let team = Team {
            id: 1,
            name: "Blue Jays".to_string(),
            division: Some("Baseball".to_string()),
            coach: None,
        };
        assert_eq!(team.display_name(), "Blue Jays (Baseball)");

        let team = Team {
            id: 2,
            name: "Orcas".to_string(),
            division: None,
            coach: Some("Coach Bob".to_string()),
        };
        assert_eq!(team.display_name(), "Orcas");
    }

    #[test]
    fn test_team_without_division_parses() {
        let team: Team = serde_json::from_str(r#"{"id": 3, "name": "All-Stars"}"#)
            .expect("Failed to parse team JSON");
        assert_eq!(team.id, 3);
        assert!(team.division.is_none());

        // Absent division stays absent on the way back out
        let json = serde_json::to_value(&team).unwrap();
        assert!(json.get("division").is_none());
    }
}
