//! Command-line parsing and execution.

use anyhow::{bail, Context, Result};
use serde_json::{json, Value};

use dugout_core::auth::{may_post, Role};
use dugout_core::{BackendMode, LeagueApi};

pub const USAGE: &str = "\
Usage: dugout [--local | --remote] [--ephemeral] <command> [args]

Read commands:
  teams | coaches | schedule | locations | categories | statuses
  players | player <id>    registered players / one player
  events [team_id]        schedule for one team, in date order
  inventory | summary     equipment list / counts by status
  concessions | requests | activity
  usage <event_id>        saved usage for an event
  snapshot                every collection at once

Write commands:
  init                            seed missing collections (local only)
  add-concession <json>
  add-team <json>
  register-player <json>          open to everyone, signed in or not
  delete-concession <id>
  save-usage <event_id> <json>
  request-event <json>            open to everyone, signed in or not
  sync <event_id>
  post <endpoint> <json>          generic write, e.g. post concessions '{...}'

Session:
  login <token> <email> <role>    save a token issued by the league server
  logout";

#[derive(Debug, Default, PartialEq)]
pub struct Options {
    pub mode: Option<BackendMode>,
    pub ephemeral: bool,
}

#[derive(Debug, PartialEq)]
pub enum Command {
    Init,
    Teams,
    Coaches,
    Players,
    Player { id: i64 },
    Schedule,
    Events { team_id: Option<i64> },
    Locations,
    Categories,
    Statuses,
    Inventory,
    Summary,
    Concessions,
    Usage { event_id: String },
    Requests,
    Activity,
    Snapshot,
    AddConcession { payload: Value },
    AddTeam { payload: Value },
    RegisterPlayer { payload: Value },
    DeleteConcession { id: i64 },
    SaveUsage { event_id: String, payload: Value },
    RequestEvent { payload: Value },
    Sync { event_id: String },
    Post { endpoint: String, payload: Value },
    Login { token: String, email: String, role: Role },
    Logout,
    Help,
}

impl Command {
    /// Endpoint a write command touches, for the permission check.
    pub fn write_endpoint(&self) -> Option<String> {
        match self {
            Command::AddConcession { .. } => Some("concessions".to_string()),
            Command::AddTeam { .. } => Some("teams".to_string()),
            Command::RegisterPlayer { .. } => Some("players".to_string()),
            Command::DeleteConcession { id } => Some(format!("concessions/{}", id)),
            Command::SaveUsage { event_id, .. } => Some(format!("event-usage/{}", event_id)),
            Command::RequestEvent { .. } => Some("schedule/request".to_string()),
            Command::Sync { event_id } => Some(format!("sync-event-inventory/{}", event_id)),
            Command::Post { endpoint, .. } => Some(endpoint.clone()),
            _ => None,
        }
    }
}

/// Refuse a write the signed-in role (or lack of one) may not make.
/// Read commands always pass.
pub fn authorize(command: &Command, role: Option<Role>) -> Result<()> {
    let Some(endpoint) = command.write_endpoint() else {
        return Ok(());
    };
    if may_post(role, &endpoint) {
        return Ok(());
    }
    match role {
        Some(role) => bail!("{} accounts may not write to {}", role, endpoint),
        None => bail!("Sign in with `dugout login` to write to {}", endpoint),
    }
}

fn parse_json(arg: &str) -> Result<Value> {
    serde_json::from_str(arg).with_context(|| format!("Payload is not valid JSON: {}", arg))
}

fn parse_id(arg: &str) -> Result<i64> {
    arg.parse()
        .with_context(|| format!("Expected a numeric id, got '{}'", arg))
}

/// Parse arguments (without the program name).
pub fn parse_args(args: &[String]) -> Result<(Options, Command)> {
    let mut options = Options::default();
    let mut rest: Vec<&str> = Vec::new();

    for arg in args {
        match arg.as_str() {
            "--local" => options.mode = Some(BackendMode::Local),
            "--remote" => options.mode = Some(BackendMode::Remote),
            "--ephemeral" => options.ephemeral = true,
            "-h" | "--help" => return Ok((options, Command::Help)),
            flag if flag.starts_with("--") => bail!("Unknown option: {}", flag),
            other => rest.push(other),
        }
    }

    let command = match rest.as_slice() {
        [] | ["help"] => Command::Help,
        ["init"] => Command::Init,
        ["teams"] => Command::Teams,
        ["coaches"] => Command::Coaches,
        ["players"] => Command::Players,
        ["player", id] => Command::Player { id: parse_id(id)? },
        ["schedule"] => Command::Schedule,
        ["events"] => Command::Events { team_id: None },
        ["events", team_id] => Command::Events {
            team_id: Some(parse_id(team_id)?),
        },
        ["locations"] => Command::Locations,
        ["categories"] => Command::Categories,
        ["statuses"] => Command::Statuses,
        ["inventory"] => Command::Inventory,
        ["summary"] => Command::Summary,
        ["concessions"] => Command::Concessions,
        ["usage", event_id] => Command::Usage {
            event_id: event_id.to_string(),
        },
        ["requests"] => Command::Requests,
        ["activity"] => Command::Activity,
        ["snapshot"] => Command::Snapshot,
        ["add-concession", payload] => Command::AddConcession {
            payload: parse_json(payload)?,
        },
        ["add-team", payload] => Command::AddTeam {
            payload: parse_json(payload)?,
        },
        ["register-player", payload] => Command::RegisterPlayer {
            payload: parse_json(payload)?,
        },
        ["delete-concession", id] => Command::DeleteConcession { id: parse_id(id)? },
        ["save-usage", event_id, payload] => Command::SaveUsage {
            event_id: event_id.to_string(),
            payload: parse_json(payload)?,
        },
        ["request-event", payload] => Command::RequestEvent {
            payload: parse_json(payload)?,
        },
        ["sync", event_id] => Command::Sync {
            event_id: event_id.to_string(),
        },
        ["post", endpoint, payload] => Command::Post {
            endpoint: endpoint.to_string(),
            payload: parse_json(payload)?,
        },
        ["login", token, email, role] => Command::Login {
            token: token.to_string(),
            email: email.to_string(),
            role: Role::parse(role).with_context(|| format!("Unknown role: {}", role))?,
        },
        ["logout"] => Command::Logout,
        other => bail!("Unrecognized command: {}\n\n{}", other.join(" "), USAGE),
    };

    Ok((options, command))
}

/// Run a data command against `backend` and return its JSON result.
/// Session and setup commands are handled by the caller.
pub async fn execute(backend: &dyn LeagueApi, command: Command) -> Result<Value> {
    let value = match command {
        Command::Teams => serde_json::to_value(backend.fetch_teams().await?)?,
        Command::Coaches => serde_json::to_value(backend.fetch_coaches().await?)?,
        Command::Players => serde_json::to_value(backend.fetch_players().await?)?,
        Command::Player { id } => match backend.fetch_player(id).await? {
            Some(player) => serde_json::to_value(player)?,
            None => bail!("Player {} not found", id),
        },
        Command::Schedule => serde_json::to_value(backend.fetch_schedule().await?)?,
        Command::Events { team_id } => serde_json::to_value(backend.fetch_events(team_id).await?)?,
        Command::Locations => serde_json::to_value(backend.fetch_locations().await?)?,
        Command::Categories => serde_json::to_value(backend.fetch_categories().await?)?,
        Command::Statuses => serde_json::to_value(backend.fetch_statuses().await?)?,
        Command::Inventory => serde_json::to_value(backend.fetch_inventory().await?)?,
        Command::Summary => serde_json::to_value(backend.fetch_inventory_summary().await?)?,
        Command::Concessions => serde_json::to_value(backend.fetch_concessions().await?)?,
        Command::Usage { event_id } => backend
            .fetch_event_usage(&event_id)
            .await?
            .unwrap_or(Value::Null),
        Command::Requests => serde_json::to_value(backend.fetch_event_requests().await?)?,
        Command::Activity => serde_json::to_value(backend.fetch_activity_log().await?)?,
        Command::Snapshot => snapshot(backend).await?,
        Command::AddConcession { payload } => {
            serde_json::to_value(backend.add_concession_item(payload).await?)?
        }
        Command::AddTeam { payload } => serde_json::to_value(backend.add_team(payload).await?)?,
        Command::RegisterPlayer { payload } => {
            serde_json::to_value(backend.register_player(payload).await?)?
        }
        Command::DeleteConcession { id } => {
            serde_json::to_value(backend.delete_concession_item(id).await?)?
        }
        Command::SaveUsage { event_id, payload } => {
            serde_json::to_value(backend.save_event_usage(&event_id, payload).await?)?
        }
        Command::RequestEvent { payload } => {
            serde_json::to_value(backend.request_new_event(payload).await?)?
        }
        Command::Sync { event_id } => {
            serde_json::to_value(backend.sync_event_inventory(&event_id).await?)?
        }
        Command::Post { endpoint, payload } => backend.post_data(&endpoint, payload).await?,
        Command::Init | Command::Login { .. } | Command::Logout | Command::Help => {
            bail!("Command is not a data command")
        }
    };
    Ok(value)
}

/// Fetch every read-only collection concurrently.
async fn snapshot(backend: &dyn LeagueApi) -> Result<Value> {
    let (teams, coaches, players, schedule, locations, categories, statuses, inventory, summary, concessions) =
        futures::try_join!(
            backend.fetch_teams(),
            backend.fetch_coaches(),
            backend.fetch_players(),
            backend.fetch_schedule(),
            backend.fetch_locations(),
            backend.fetch_categories(),
            backend.fetch_statuses(),
            backend.fetch_inventory(),
            backend.fetch_inventory_summary(),
            backend.fetch_concessions(),
        )?;

    Ok(json!({
        "teams": teams,
        "coaches": coaches,
        "players": players,
        "schedule": schedule,
        "locations": locations,
        "categories": categories,
        "statuses": statuses,
        "inventory": inventory,
        "inventory_summary": summary,
        "concessions": concessions,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use dugout_core::storage::MemoryStorage;
    use dugout_core::LocalStore;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn store() -> LocalStore {
        let store = LocalStore::new(Arc::new(MemoryStorage::new()), "test");
        store.initialize_store();
        store
    }

    #[test]
    fn test_parse_flags_and_command() {
        let (options, command) = parse_args(&args(&["--remote", "events", "2"])).unwrap();
        assert_eq!(options.mode, Some(BackendMode::Remote));
        assert!(!options.ephemeral);
        assert_eq!(command, Command::Events { team_id: Some(2) });

        let (options, command) = parse_args(&args(&["summary", "--ephemeral"])).unwrap();
        assert!(options.ephemeral);
        assert_eq!(command, Command::Summary);
    }

    #[test]
    fn test_parse_payload_commands() {
        let (_, command) =
            parse_args(&args(&["save-usage", "7", r#"{"balls": 3}"#])).unwrap();
        assert_eq!(
            command,
            Command::SaveUsage {
                event_id: "7".to_string(),
                payload: json!({"balls": 3}),
            }
        );

        assert!(parse_args(&args(&["add-concession", "{broken"])).is_err());
        assert!(parse_args(&args(&["events", "two"])).is_err());
    }

    #[test]
    fn test_parse_login() {
        let (_, command) = parse_args(&args(&[
            "login",
            "tok",
            "board@bucksportll.org",
            "board_member",
        ]))
        .unwrap();
        assert_eq!(
            command,
            Command::Login {
                token: "tok".to_string(),
                email: "board@bucksportll.org".to_string(),
                role: Role::BoardMember,
            }
        );
        assert!(parse_args(&args(&["login", "tok", "a@b.org", "owner"])).is_err());
    }

    #[test]
    fn test_parse_errors_and_help() {
        assert_eq!(parse_args(&[]).unwrap().1, Command::Help);
        assert_eq!(parse_args(&args(&["--help", "teams"])).unwrap().1, Command::Help);
        assert!(parse_args(&args(&["--verbose", "teams"])).is_err());
        assert!(parse_args(&args(&["teams", "extra"])).is_err());
    }

    #[test]
    fn test_write_endpoint() {
        assert_eq!(Command::Teams.write_endpoint(), None);
        assert_eq!(
            Command::RequestEvent { payload: json!({}) }.write_endpoint().as_deref(),
            Some("schedule/request")
        );
        assert_eq!(
            Command::DeleteConcession { id: 4 }.write_endpoint().as_deref(),
            Some("concessions/4")
        );
    }

    #[test]
    fn test_authorize() {
        let add = Command::AddConcession {
            payload: json!({"name": "Pretzel"}),
        };
        assert!(authorize(&add, Some(Role::BoardMember)).is_ok());
        assert!(authorize(&add, Some(Role::Viewer)).is_err());
        // Signing out must not widen access
        assert!(authorize(&add, None).is_err());

        let request = Command::RequestEvent { payload: json!({}) };
        assert!(authorize(&request, None).is_ok());
        let register = Command::RegisterPlayer { payload: json!({}) };
        assert!(authorize(&register, None).is_ok());
        assert!(authorize(&Command::AddTeam { payload: json!({}) }, None).is_err());

        assert!(authorize(&Command::Teams, None).is_ok());
    }

    #[tokio::test]
    async fn test_players_commands() {
        let store = store();
        let (_, command) = parse_args(&args(&[
            "register-player",
            r#"{"first_name": "Ava", "last_name": "Hale", "birthdate": "2014-09-30", "email": "hale@example.com", "phone": "555-0199"}"#,
        ]))
        .unwrap();
        let player = execute(&store, command).await.unwrap();
        assert_eq!(player["id"], 1);

        let (_, command) = parse_args(&args(&["player", "1"])).unwrap();
        assert_eq!(command, Command::Player { id: 1 });
        assert_eq!(execute(&store, command).await.unwrap()["last_name"], "Hale");
        assert!(execute(&store, Command::Player { id: 2 }).await.is_err());
    }

    #[tokio::test]
    async fn test_execute_against_local_store() {
        let store = store();

        let teams = execute(&store, Command::Teams).await.unwrap();
        assert_eq!(teams.as_array().unwrap().len(), 3);

        let created = execute(
            &store,
            Command::AddConcession {
                payload: json!({"name": "Hot dog"}),
            },
        )
        .await
        .unwrap();
        assert_eq!(created["id"], 1);

        let usage = execute(
            &store,
            Command::Usage {
                event_id: "1".to_string(),
            },
        )
        .await
        .unwrap();
        assert_eq!(usage, Value::Null);
    }

    #[tokio::test]
    async fn test_snapshot() {
        let store = store();
        let snapshot = execute(&store, Command::Snapshot).await.unwrap();
        assert_eq!(snapshot["coaches"].as_array().unwrap().len(), 3);
        assert!(snapshot["players"].as_array().unwrap().is_empty());
        assert_eq!(snapshot["inventory_summary"]["total_items"], 0);
        assert!(snapshot["concessions"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_execute_rejects_session_commands() {
        let store = store();
        assert!(execute(&store, Command::Logout).await.is_err());
    }
}
