use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::record::lenient_id;

/// A registered player.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    #[serde(default, deserialize_with = "lenient_id")]
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    /// `YYYY-MM-DD`
    pub birthdate: NaiveDate,
    pub email: String,
    pub phone: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub team_id: Option<i64>,
}

impl Player {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// Fields a family submits to register a player. Any `id` in the payload is
/// ignored; the store assigns one.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PlayerRegistration {
    pub first_name: String,
    pub last_name: String,
    pub birthdate: NaiveDate,
    pub email: String,
    pub phone: String,
    #[serde(default)]
    pub team_id: Option<i64>,
}

impl PlayerRegistration {
    /// Check required fields are filled in. Returns the first problem found.
    pub fn validate(&self) -> Result<(), String> {
        let required = [
            ("first_name", &self.first_name),
            ("last_name", &self.last_name),
            ("email", &self.email),
            ("phone", &self.phone),
        ];
        if let Some((name, _)) = required.iter().find(|(_, value)| value.trim().is_empty()) {
            return Err(format!("{} is required", name));
        }
        match self.email.trim().split_once('@') {
            Some((local, host)) if !local.is_empty() && host.contains('.') => Ok(()),
            _ => Err(format!("{} is not an email address", self.email)),
        }
    }

    pub fn into_player(self, id: i64) -> Player {
        Player {
            id,
            first_name: self.first_name.trim().to_string(),
            last_name: self.last_name.trim().to_string(),
            birthdate: self.birthdate,
            email: self.email.trim().to_string(),
            phone: self.phone.trim().to_string(),
            team_id: self.team_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn registration() -> serde_json::Value {
        json!({
            "first_name": "Sam",
            "last_name": "Carter",
            "birthdate": "2015-04-02",
            "email": "parent@example.com",
            "phone": "207-555-0101",
            "team_id": 2,
        })
    }

    #[test]
    fn test_registration_parses() {
        let reg: PlayerRegistration = serde_json::from_value(registration())
            .expect("Failed to parse registration JSON");
        assert!(reg.validate().is_ok());

        let player = reg.into_player(7);
        assert_eq!(player.id, 7);
        assert_eq!(player.full_name(), "Sam Carter");
        assert_eq!(player.birthdate, NaiveDate::from_ymd_opt(2015, 4, 2).unwrap());

        let json = serde_json::to_value(&player).unwrap();
        assert_eq!(json["birthdate"], "2015-04-02");
        assert_eq!(json["team_id"], 2);
    }

    #[test]
    fn test_bad_birthdate_rejected() {
        let mut value = registration();
        value["birthdate"] = json!("04/02/2015");
        assert!(serde_json::from_value::<PlayerRegistration>(value).is_err());
    }

    #[test]
    fn test_validate() {
        let mut reg: PlayerRegistration = serde_json::from_value(registration()).unwrap();
        reg.first_name = "  ".to_string();
        assert_eq!(reg.validate(), Err("first_name is required".to_string()));

        let mut reg: PlayerRegistration = serde_json::from_value(registration()).unwrap();
        reg.email = "parent-at-example".to_string();
        assert!(reg.validate().is_err());
    }
}
