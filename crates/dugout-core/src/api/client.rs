//! API client for the league server's REST endpoints.
//!
//! `RemoteClient` implements `LeagueApi` over HTTP so callers can swap it
//! for the local store without changing a line.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{header, Client, Method, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};

use super::ApiError;
use crate::backend::LeagueApi;
use crate::models::{
    Ack, ActivityEntry, Coach, ConcessionItem, EventRequest, InventoryItem, InventorySummary,
    Player, ScheduleEvent, Team,
};

// ============================================================================
// Constants
// ============================================================================

/// Path prefix shared by every endpoint.
const API_PREFIX: &str = "api";

/// Default HTTP request timeout in seconds.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Maximum number of retries for rate-limited (429) requests.
const MAX_RATE_LIMIT_RETRIES: u32 = 3;

/// Initial backoff delay in milliseconds for rate limiting.
const INITIAL_BACKOFF_MS: u64 = 1000;

/// HTTP client for the league server.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct RemoteClient {
    client: Client,
    base_url: Url,
    token: Option<String>,
}

impl RemoteClient {
    /// Create a client for the server at `base_url`, e.g. `https://league.example.org`.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ApiError> {
        let base_url = Url::parse(base_url)
            .map_err(|e| ApiError::InvalidRequest(format!("Invalid base URL {}: {}", base_url, e)))?;
        if base_url.cannot_be_a_base() {
            return Err(ApiError::InvalidRequest(format!(
                "Base URL cannot hold a path: {}",
                base_url
            )));
        }

        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            base_url,
            token: None,
        })
    }

    /// Set the bearer token for authenticated requests
    pub fn set_token(&mut self, token: String) {
        self.token = Some(token);
    }

    /// Create a new RemoteClient with the given token, sharing the connection pool.
    pub fn with_token(&self, token: String) -> Self {
        Self {
            client: self.client.clone(),
            base_url: self.base_url.clone(),
            token: Some(token),
        }
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Build `<base>/api/<segments...>`. Each segment is percent-encoded, so
    /// an id containing `/` stays a single segment.
    fn endpoint<S: AsRef<str>>(&self, segments: &[S]) -> Result<Url, ApiError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| {
                ApiError::InvalidRequest(format!("Base URL cannot hold a path: {}", self.base_url))
            })?
            .pop_if_empty()
            .push(API_PREFIX)
            .extend(segments.iter().map(|s| s.as_ref()));
        Ok(url)
    }

    /// Split a free-form endpoint like `/api/schedule/request` into segments.
    fn endpoint_segments(endpoint: &str) -> Vec<&str> {
        let trimmed = endpoint.trim_matches('/');
        let trimmed = trimmed
            .strip_prefix(API_PREFIX)
            .and_then(|rest| rest.strip_prefix('/'))
            .unwrap_or(trimmed);
        trimmed.split('/').filter(|s| !s.is_empty()).collect()
    }

    fn auth_headers(&self) -> Result<header::HeaderMap, ApiError> {
        let mut headers = header::HeaderMap::new();
        if let Some(ref token) = self.token {
            let value = header::HeaderValue::from_str(&format!("Bearer {}", token))
                .map_err(|e| ApiError::InvalidRequest(format!("Invalid token: {}", e)))?;
            headers.insert(header::AUTHORIZATION, value);
        }
        Ok(headers)
    }

    /// Check if response is successful, returning an error with body if not.
    /// Returns Ok(Some(response)) for success, Ok(None) for rate limit (should retry),
    /// or Err for other errors.
    async fn check_response_for_retry(
        response: reqwest::Response,
    ) -> Result<Option<reqwest::Response>, ApiError> {
        if response.status().is_success() {
            Ok(Some(response))
        } else if response.status() == StatusCode::TOO_MANY_REQUESTS {
            Ok(None)
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            Err(ApiError::from_status(status, &body))
        }
    }

    /// Send a request, backing off exponentially while the server answers 429.
    async fn send<T: DeserializeOwned>(
        &self,
        method: Method,
        url: Url,
        body: Option<&Value>,
    ) -> Result<T, ApiError> {
        let mut retries = 0;
        let mut backoff_ms = INITIAL_BACKOFF_MS;

        loop {
            let mut request = self
                .client
                .request(method.clone(), url.clone())
                .headers(self.auth_headers()?);
            if let Some(body) = body {
                request = request.json(body);
            }

            debug!(method = %method, url = %url, "Sending request");
            let response = request.send().await?;

            match Self::check_response_for_retry(response).await? {
                Some(response) => {
                    let text = response.text().await?;
                    return serde_json::from_str(&text).map_err(|e| {
                        ApiError::InvalidResponse(format!("Failed to parse JSON from {}: {}", url, e))
                    });
                }
                None => {
                    retries += 1;
                    if retries > MAX_RATE_LIMIT_RETRIES {
                        return Err(ApiError::RateLimited);
                    }
                    warn!(url = %url, retry = retries, backoff_ms = backoff_ms, "Rate limited, backing off");
                    tokio::time::sleep(Duration::from_millis(backoff_ms)).await;
                    backoff_ms *= 2;
                }
            }
        }
    }

    async fn get<T: DeserializeOwned>(&self, segments: &[&str]) -> Result<T, ApiError> {
        let url = self.endpoint(segments)?;
        self.send(Method::GET, url, None).await
    }

    async fn post<T: DeserializeOwned>(&self, segments: &[&str], body: &Value) -> Result<T, ApiError> {
        let url = self.endpoint(segments)?;
        self.send(Method::POST, url, Some(body)).await
    }
}

#[async_trait]
impl LeagueApi for RemoteClient {
    async fn fetch_inventory(&self) -> Result<Vec<InventoryItem>, ApiError> {
        self.get(&["inventory"]).await
    }

    async fn fetch_inventory_summary(&self) -> Result<InventorySummary, ApiError> {
        self.get(&["inventory", "summary"]).await
    }

    async fn fetch_coaches(&self) -> Result<Vec<Coach>, ApiError> {
        self.get(&["coaches"]).await
    }

    async fn fetch_teams(&self) -> Result<Vec<Team>, ApiError> {
        self.get(&["teams"]).await
    }

    async fn fetch_players(&self) -> Result<Vec<Player>, ApiError> {
        self.get(&["players"]).await
    }

    async fn fetch_player(&self, id: i64) -> Result<Option<Player>, ApiError> {
        let id = id.to_string();
        match self.get::<Player>(&["players", id.as_str()]).await {
            Ok(player) => Ok(Some(player)),
            Err(ApiError::NotFound(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn fetch_categories(&self) -> Result<Vec<String>, ApiError> {
        self.get(&["categories"]).await
    }

    async fn fetch_statuses(&self) -> Result<Vec<String>, ApiError> {
        self.get(&["statuses"]).await
    }

    async fn fetch_schedule(&self) -> Result<Vec<ScheduleEvent>, ApiError> {
        self.get(&["schedule"]).await
    }

    async fn fetch_locations(&self) -> Result<Vec<String>, ApiError> {
        self.get(&["locations"]).await
    }

    async fn fetch_events(&self, team_id: Option<i64>) -> Result<Vec<ScheduleEvent>, ApiError> {
        let mut url = self.endpoint(&["events"])?;
        if let Some(team_id) = team_id {
            url.query_pairs_mut()
                .append_pair("team_id", &team_id.to_string());
        }
        self.send(Method::GET, url, None).await
    }

    async fn fetch_concessions(&self) -> Result<Vec<ConcessionItem>, ApiError> {
        self.get(&["concessions"]).await
    }

    async fn fetch_event_usage(&self, event_id: &str) -> Result<Option<Value>, ApiError> {
        match self.get::<Option<Value>>(&["event-usage", event_id]).await {
            Ok(usage) => Ok(usage),
            Err(ApiError::NotFound(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn fetch_event_requests(&self) -> Result<Vec<EventRequest>, ApiError> {
        self.get(&["schedule", "requests"]).await
    }

    async fn fetch_activity_log(&self) -> Result<Vec<ActivityEntry>, ApiError> {
        self.get(&["activity-log"]).await
    }

    async fn post_data(&self, endpoint: &str, payload: Value) -> Result<Value, ApiError> {
        let segments = Self::endpoint_segments(endpoint);
        self.post(&segments, &payload).await
    }

    async fn save_event_usage(&self, event_id: &str, payload: Value) -> Result<Ack, ApiError> {
        self.post(&["event-usage", event_id], &payload).await
    }

    async fn add_concession_item(&self, payload: Value) -> Result<ConcessionItem, ApiError> {
        self.post(&["concessions"], &payload).await
    }

    async fn delete_concession_item(&self, id: i64) -> Result<Ack, ApiError> {
        let id = id.to_string();
        let url = self.endpoint(&["concessions", id.as_str()])?;
        self.send(Method::DELETE, url, None).await
    }

    async fn request_new_event(&self, payload: Value) -> Result<Ack, ApiError> {
        self.post(&["schedule", "request"], &payload).await
    }

    async fn sync_event_inventory(&self, event_id: &str) -> Result<Ack, ApiError> {
        self.post(&["events", event_id, "sync-inventory"], &Value::Null).await
    }

    async fn register_player(&self, payload: Value) -> Result<Player, ApiError> {
        self.post(&["players"], &payload).await
    }

    async fn add_team(&self, payload: Value) -> Result<Team, ApiError> {
        self.post(&["teams"], &payload).await
    }
}
