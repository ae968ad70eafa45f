//! The capability interface shared by the local store and the remote client,
//! and construction of whichever one the configuration selects.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

use crate::api::{ApiError, RemoteClient};
use crate::config::Config;
use crate::models::{
    Ack, ActivityEntry, Coach, ConcessionItem, EventRequest, InventoryItem, InventorySummary,
    Player, ScheduleEvent, Team,
};
use crate::storage::{FileStorage, MemoryStorage, Storage};
use crate::store::LocalStore;

/// Operations the UI layer calls, independent of where the data lives.
///
/// The local implementation only returns `Err` from writes it refuses (an
/// invalid payload, or a stored collection of the wrong shape); the remote
/// one also surfaces transport and HTTP failures.
#[async_trait]
pub trait LeagueApi: Send + Sync {
    async fn fetch_inventory(&self) -> Result<Vec<InventoryItem>, ApiError>;
    async fn fetch_inventory_summary(&self) -> Result<InventorySummary, ApiError>;
    async fn fetch_coaches(&self) -> Result<Vec<Coach>, ApiError>;
    async fn fetch_teams(&self) -> Result<Vec<Team>, ApiError>;
    async fn fetch_players(&self) -> Result<Vec<Player>, ApiError>;
    /// `Ok(None)` when no player has that id.
    async fn fetch_player(&self, id: i64) -> Result<Option<Player>, ApiError>;
    async fn fetch_categories(&self) -> Result<Vec<String>, ApiError>;
    async fn fetch_statuses(&self) -> Result<Vec<String>, ApiError>;
    async fn fetch_schedule(&self) -> Result<Vec<ScheduleEvent>, ApiError>;
    async fn fetch_locations(&self) -> Result<Vec<String>, ApiError>;
    /// Schedule entries for one team (or all), ordered by date and time.
    async fn fetch_events(&self, team_id: Option<i64>) -> Result<Vec<ScheduleEvent>, ApiError>;
    async fn fetch_concessions(&self) -> Result<Vec<ConcessionItem>, ApiError>;
    async fn fetch_event_usage(&self, event_id: &str) -> Result<Option<Value>, ApiError>;
    async fn fetch_event_requests(&self) -> Result<Vec<EventRequest>, ApiError>;
    async fn fetch_activity_log(&self) -> Result<Vec<ActivityEntry>, ApiError>;

    /// Generic write addressed by endpoint name, e.g. `concessions`.
    async fn post_data(&self, endpoint: &str, payload: Value) -> Result<Value, ApiError>;
    async fn save_event_usage(&self, event_id: &str, payload: Value) -> Result<Ack, ApiError>;
    /// Returns the created item including its assigned id.
    async fn add_concession_item(&self, payload: Value) -> Result<ConcessionItem, ApiError>;
    async fn delete_concession_item(&self, id: i64) -> Result<Ack, ApiError>;
    async fn request_new_event(&self, payload: Value) -> Result<Ack, ApiError>;
    async fn sync_event_inventory(&self, event_id: &str) -> Result<Ack, ApiError>;
    async fn register_player(&self, payload: Value) -> Result<Player, ApiError>;
    async fn add_team(&self, payload: Value) -> Result<Team, ApiError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendMode {
    #[default]
    Local,
    Remote,
}

impl BackendMode {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "local" => Some(BackendMode::Local),
            "remote" => Some(BackendMode::Remote),
            _ => None,
        }
    }
}

impl std::fmt::Display for BackendMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BackendMode::Local => write!(f, "local"),
            BackendMode::Remote => write!(f, "remote"),
        }
    }
}

/// Open the local store described by `config`. Seeding is left to the caller.
pub fn open_local_store(config: &Config) -> Result<LocalStore> {
    let storage: Arc<dyn Storage> = if config.ephemeral {
        Arc::new(MemoryStorage::new())
    } else {
        let data_dir = config.data_dir()?;
        Arc::new(
            FileStorage::new(data_dir.clone())
                .with_context(|| format!("Failed to open data directory {}", data_dir.display()))?,
        )
    };

    Ok(LocalStore::new(storage, config.namespace()))
}

/// Build the backend selected by `config.mode`. `token` is attached to the
/// remote client when present.
pub fn build_backend(config: &Config, token: Option<String>) -> Result<Arc<dyn LeagueApi>> {
    match config.mode {
        BackendMode::Local => {
            let store = open_local_store(config)?;
            store.initialize_store();
            info!(namespace = %store.namespace(), ephemeral = config.ephemeral, "Using local store");
            Ok(Arc::new(store))
        }
        BackendMode::Remote => {
            let base_url = config
                .api_base_url
                .as_deref()
                .ok_or_else(|| anyhow::anyhow!("Remote mode requires api_base_url to be configured"))?;
            let mut client =
                RemoteClient::new(base_url, Duration::from_secs(config.request_timeout_secs()))
                    .context("Failed to create API client")?;
            if let Some(token) = token {
                client.set_token(token);
            }
            info!(base_url = %base_url, "Using remote API");
            Ok(Arc::new(client))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    #[test]
    fn test_mode_parse() {
        assert_eq!(BackendMode::parse("Local"), Some(BackendMode::Local));
        assert_eq!(BackendMode::parse(" remote "), Some(BackendMode::Remote));
        assert_eq!(BackendMode::parse("auto"), None);
        assert_eq!(BackendMode::default(), BackendMode::Local);
    }

    #[test]
    fn test_remote_without_url_is_an_error() {
        let config = Config {
            mode: BackendMode::Remote,
            ..Config::default()
        };
        assert!(build_backend(&config, None).is_err());
    }

    #[test]
    fn test_remote_with_url_builds() {
        let config = Config {
            mode: BackendMode::Remote,
            api_base_url: Some("http://localhost:8000".to_string()),
            ..Config::default()
        };
        assert!(build_backend(&config, Some("token".to_string())).is_ok());
    }

    #[tokio::test]
    async fn test_ephemeral_local_backend_is_seeded() {
        let config = Config {
            ephemeral: true,
            ..Config::default()
        };
        let backend = build_backend(&config, None).unwrap();
        assert_eq!(backend.fetch_coaches().await.unwrap().len(), 3);

        let ack = backend.post_data("not/a/route", json!({})).await.unwrap();
        assert_eq!(ack, json!({"status": "ok"}));
    }

    #[tokio::test]
    async fn test_file_local_backend_uses_data_dir() {
        let dir = TempDir::new().unwrap();
        let config = Config {
            data_dir: Some(dir.path().to_path_buf()),
            namespace: Some("testleague".to_string()),
            ..Config::default()
        };
        let backend = build_backend(&config, None).unwrap();
        backend.add_concession_item(json!({"name": "Pretzel"})).await.unwrap();

        assert!(dir.path().join("testleague.concessions.json").exists());
    }

    #[tokio::test]
    async fn test_players_through_capability() {
        let config = Config {
            ephemeral: true,
            ..Config::default()
        };
        let backend = build_backend(&config, None).unwrap();

        let player = backend
            .register_player(json!({
                "first_name": "Ava",
                "last_name": "Hale",
                "birthdate": "2014-09-30",
                "email": "hale@example.com",
                "phone": "207-555-0199",
            }))
            .await
            .unwrap();
        assert_eq!(backend.fetch_player(player.id).await.unwrap(), Some(player));
        assert_eq!(backend.fetch_player(99).await.unwrap(), None);

        assert!(matches!(
            backend.register_player(json!({"first_name": "Ava"})).await,
            Err(ApiError::InvalidRequest(_))
        ));

        let team = backend.add_team(json!({"name": "Orland Orcas"})).await.unwrap();
        assert_eq!(team.id, 4);
    }
}
