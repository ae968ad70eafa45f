use serde::{Deserialize, Serialize};

/// Email domain accounts must belong to unless configured otherwise.
pub const DEFAULT_LEAGUE_DOMAIN: &str = "bucksportll.org";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    BoardMember,
    FundraisingCoordinator,
    Viewer,
}

impl Role {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "admin" => Some(Role::Admin),
            "board_member" => Some(Role::BoardMember),
            "fundraising_coordinator" => Some(Role::FundraisingCoordinator),
            "viewer" => Some(Role::Viewer),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::BoardMember => "board_member",
            Role::FundraisingCoordinator => "fundraising_coordinator",
            Role::Viewer => "viewer",
        }
    }

    pub fn can_edit_schedule(&self) -> bool {
        matches!(self, Role::Admin | Role::BoardMember)
    }

    pub fn can_manage_inventory(&self) -> bool {
        matches!(self, Role::Admin | Role::BoardMember)
    }

    pub fn can_manage_concessions(&self) -> bool {
        matches!(self, Role::Admin | Role::BoardMember)
    }

    pub fn can_manage_fundraising(&self) -> bool {
        matches!(self, Role::Admin | Role::FundraisingCoordinator)
    }

    /// Whether this role may write to the given endpoint through `post_data`.
    pub fn can_post(&self, endpoint: &str) -> bool {
        if is_open_endpoint(endpoint) {
            return true;
        }
        let endpoint = normalize_endpoint(endpoint);
        match endpoint.split('/').next().unwrap_or_default() {
            "schedule" | "events" | "teams" => self.can_edit_schedule(),
            "inventory" | "eventUsage" | "event-usage" | "syncEventInventory"
            | "sync-event-inventory" => self.can_manage_inventory(),
            "concessions" => self.can_manage_concessions(),
            _ => *self == Role::Admin,
        }
    }
}

fn normalize_endpoint(endpoint: &str) -> &str {
    let endpoint = endpoint.trim_matches('/');
    endpoint.strip_prefix("api/").unwrap_or(endpoint)
}

/// Endpoints anyone may write to, signed in or not: schedule requests and
/// player registration are public forms.
pub fn is_open_endpoint(endpoint: &str) -> bool {
    matches!(normalize_endpoint(endpoint), "schedule/request" | "players")
}

/// Write check for an optional signed-in role. Without a role only the open
/// endpoints are allowed.
pub fn may_post(role: Option<Role>, endpoint: &str) -> bool {
    match role {
        Some(role) => role.can_post(endpoint),
        None => is_open_endpoint(endpoint),
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::Admin => write!(f, "Admin"),
            Role::BoardMember => write!(f, "Board Member"),
            Role::FundraisingCoordinator => write!(f, "Fundraising Coordinator"),
            Role::Viewer => write!(f, "Viewer"),
        }
    }
}

/// Whether `email` belongs to `domain` (case-insensitive, exact domain match).
pub fn is_league_email(email: &str, domain: &str) -> bool {
    let email = email.trim().to_lowercase();
    let domain = domain.trim().trim_start_matches('@').to_lowercase();
    match email.rsplit_once('@') {
        Some((local, host)) => !local.is_empty() && !domain.is_empty() && host == domain,
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_parse_roundtrip() {
        for role in [
            Role::Admin,
            Role::BoardMember,
            Role::FundraisingCoordinator,
            Role::Viewer,
        ] {
            assert_eq!(Role::parse(role.as_str()), Some(role));
        }
        assert_eq!(Role::parse("ADMIN"), Some(Role::Admin));
        assert_eq!(Role::parse("coach"), None);
    }

    #[test]
    fn test_role_serde_matches_as_str() {
        let json = serde_json::to_string(&Role::FundraisingCoordinator).unwrap();
        assert_eq!(json, "\"fundraising_coordinator\"");
    }

    #[test]
    fn test_permissions() {
        assert!(Role::BoardMember.can_manage_inventory());
        assert!(!Role::FundraisingCoordinator.can_manage_inventory());
        assert!(Role::FundraisingCoordinator.can_manage_fundraising());
        assert!(!Role::Viewer.can_edit_schedule());
    }

    #[test]
    fn test_can_post() {
        assert!(Role::Viewer.can_post("schedule/request"));
        assert!(Role::Viewer.can_post("/api/schedule/request"));
        assert!(!Role::Viewer.can_post("concessions"));
        assert!(Role::BoardMember.can_post("concessions"));
        assert!(Role::BoardMember.can_post("eventUsage/7"));
        assert!(!Role::FundraisingCoordinator.can_post("inventory"));
        assert!(Role::Viewer.can_post("players"));
        assert!(Role::BoardMember.can_post("teams"));
        assert!(!Role::FundraisingCoordinator.can_post("teams"));
        assert!(!Role::BoardMember.can_post("users"));
        assert!(Role::Admin.can_post("users"));
    }

    #[test]
    fn test_may_post_without_session() {
        assert!(may_post(None, "schedule/request"));
        assert!(may_post(None, "/api/players"));
        assert!(!may_post(None, "concessions"));
        assert!(!may_post(None, "inventory"));
        assert!(!may_post(None, "teams"));
        assert!(!may_post(None, "schedule/request/extra"));

        assert!(may_post(Some(Role::BoardMember), "concessions"));
        assert!(!may_post(Some(Role::Viewer), "concessions"));
    }

    #[test]
    fn test_is_league_email() {
        assert!(is_league_email("coach@bucksportll.org", DEFAULT_LEAGUE_DOMAIN));
        assert!(is_league_email("Coach@BucksportLL.org", DEFAULT_LEAGUE_DOMAIN));
        assert!(is_league_email("coach@bucksportll.org", "@bucksportll.org"));
        assert!(!is_league_email("coach@gmail.com", DEFAULT_LEAGUE_DOMAIN));
        assert!(!is_league_email("coach@evilbucksportll.org", DEFAULT_LEAGUE_DOMAIN));
        assert!(!is_league_email("@bucksportll.org", DEFAULT_LEAGUE_DOMAIN));
        assert!(!is_league_email("bucksportll.org", DEFAULT_LEAGUE_DOMAIN));
    }
}
