use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, info, warn};

use super::{seed, CollectionKey, StoreError};
use crate::api::ApiError;
use crate::backend::LeagueApi;
use crate::models::{
    record, Ack, ActivityEntry, Coach, ConcessionItem, EventRequest, InventoryItem,
    InventorySummary, Player, PlayerRegistration, ScheduleEvent, Team,
};
use crate::storage::Storage;

/// Default namespace joined to every collection key.
pub const DEFAULT_NAMESPACE: &str = "bucksport";

/// League data kept in a local storage medium.
/// Clone is cheap - the medium is shared behind an Arc.
#[derive(Clone)]
pub struct LocalStore {
    storage: Arc<dyn Storage>,
    namespace: String,
}

impl LocalStore {
    pub fn new(storage: Arc<dyn Storage>, namespace: impl Into<String>) -> Self {
        Self {
            storage,
            namespace: namespace.into(),
        }
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    fn storage_key(&self, key: &str) -> String {
        if self.namespace.is_empty() {
            key.to_string()
        } else {
            format!("{}.{}", self.namespace, key)
        }
    }

    // ===== Generic collection access =====
    //
    // Keys are limited to ASCII letters, digits, `.`, `_` and `-`, and may not
    // start with `.`. A key outside that set (e.g. "event usage") is refused
    // by the medium: `try_*` report it, `set_collection` drops the write and
    // `get_collection` returns the fallback.

    /// Read a collection, distinguishing absent (`Ok(None)`) from broken (`Err`).
    pub fn try_get_collection<T: DeserializeOwned>(
        &self,
        key: impl AsRef<str>,
    ) -> Result<Option<T>, StoreError> {
        let key = key.as_ref();
        let Some(contents) = self.storage.read(&self.storage_key(key))? else {
            return Ok(None);
        };
        serde_json::from_str(&contents)
            .map(Some)
            .map_err(|source| StoreError::Decode {
                key: key.to_string(),
                source,
            })
    }

    /// Read a collection, resolving absent or undecodable values to `fallback`.
    /// Keys with characters the medium refuses always read as `fallback`.
    pub fn get_collection<T: DeserializeOwned>(&self, key: impl AsRef<str>, fallback: T) -> T {
        let key = key.as_ref();
        match self.try_get_collection(key) {
            Ok(Some(value)) => value,
            Ok(None) => fallback,
            Err(e) => {
                warn!(key = %key, error = %e, "Unreadable collection, using fallback");
                fallback
            }
        }
    }

    pub fn try_set_collection<T: Serialize + ?Sized>(
        &self,
        key: impl AsRef<str>,
        value: &T,
    ) -> Result<(), StoreError> {
        let key = key.as_ref();
        let contents = serde_json::to_string(value).map_err(|source| StoreError::Encode {
            key: key.to_string(),
            source,
        })?;
        self.storage.write(&self.storage_key(key), &contents)?;
        Ok(())
    }

    /// Persist a collection. Failures, including a key with characters the
    /// medium refuses, are logged and dropped; callers must not assume the
    /// write is durable.
    pub fn set_collection<T: Serialize + ?Sized>(&self, key: impl AsRef<str>, value: &T) {
        let key = key.as_ref();
        if let Err(e) = self.try_set_collection(key, value) {
            warn!(key = %key, error = %e, "Failed to persist collection");
        }
    }

    /// Whether any value (even an empty or corrupt one) is stored under `key`.
    pub fn is_present(&self, key: impl AsRef<str>) -> bool {
        matches!(self.storage.read(&self.storage_key(key.as_ref())), Ok(Some(_)))
    }

    /// Records of a list collection that decode as `T`. Records that do not
    /// are skipped and logged, so one bad entry does not hide the rest.
    fn fetch_records<T: DeserializeOwned>(&self, key: CollectionKey) -> Vec<T> {
        let records: Vec<Value> = self.get_collection(key, Vec::new());
        records
            .into_iter()
            .enumerate()
            .filter_map(|(index, record)| match serde_json::from_value(record) {
                Ok(item) => Some(item),
                Err(e) => {
                    warn!(key = %key, index, error = %e, "Skipping unreadable record");
                    None
                }
            })
            .collect()
    }

    /// Raw records of a list collection for a read-modify-write. Absent or
    /// null reads as empty; anything else that is not a list is an error.
    fn load_records(&self, key: CollectionKey) -> Result<Vec<Value>, StoreError> {
        match self.try_get_collection::<Value>(key)? {
            None | Some(Value::Null) => Ok(Vec::new()),
            Some(Value::Array(records)) => Ok(records),
            Some(_) => Err(StoreError::WrongShape {
                key: key.to_string(),
                expected: "list",
            }),
        }
    }

    fn load_event_usage(&self) -> Result<Map<String, Value>, StoreError> {
        match self.try_get_collection::<Value>(CollectionKey::EventUsage)? {
            None | Some(Value::Null) => Ok(Map::new()),
            Some(Value::Object(usage)) => Ok(usage),
            Some(_) => Err(StoreError::WrongShape {
                key: CollectionKey::EventUsage.to_string(),
                expected: "map",
            }),
        }
    }

    // ===== Seeding =====

    /// Seed every known collection whose key is absent. Keys that hold any
    /// value, including an empty list, are left alone, so calling this again
    /// is a no-op. Returns the keys that were seeded.
    pub fn initialize_store(&self) -> Vec<CollectionKey> {
        let mut seeded = Vec::new();

        for key in CollectionKey::ALL {
            match self.storage.read(&self.storage_key(key.as_str())) {
                Ok(Some(_)) => continue,
                Ok(None) => {}
                Err(e) => {
                    warn!(key = %key, error = %e, "Could not check collection, skipping seed");
                    continue;
                }
            }

            match self.try_set_collection(key, &seed::default_value(key)) {
                Ok(()) => seeded.push(key),
                Err(e) => warn!(key = %key, error = %e, "Failed to seed collection"),
            }
        }

        if !seeded.is_empty() {
            info!(namespace = %self.namespace, count = seeded.len(), "Seeded default collections");
        }
        seeded
    }

    // ===== Reads =====

    pub fn fetch_teams(&self) -> Vec<Team> {
        self.fetch_records(CollectionKey::Teams)
    }

    pub fn fetch_coaches(&self) -> Vec<Coach> {
        self.fetch_records(CollectionKey::Coaches)
    }

    pub fn fetch_players(&self) -> Vec<Player> {
        self.fetch_records(CollectionKey::Players)
    }

    pub fn fetch_player(&self, id: i64) -> Option<Player> {
        self.fetch_players().into_iter().find(|p| p.id == id)
    }

    pub fn fetch_schedule(&self) -> Vec<ScheduleEvent> {
        self.fetch_records(CollectionKey::Schedule)
    }

    /// Schedule entries, optionally for one team, in date/time order.
    pub fn fetch_events(&self, team_id: Option<i64>) -> Vec<ScheduleEvent> {
        let mut events: Vec<ScheduleEvent> = self
            .fetch_schedule()
            .into_iter()
            .filter(|e| team_id.is_none() || e.team_id == team_id)
            .collect();
        events.sort_by(|a, b| a.sort_key().cmp(&b.sort_key()));
        events
    }

    pub fn fetch_locations(&self) -> Vec<String> {
        self.fetch_records(CollectionKey::Locations)
    }

    /// The stored category list, or when that is empty, the distinct
    /// non-empty categories seen in inventory in first-seen order.
    pub fn fetch_categories(&self) -> Vec<String> {
        let stored: Vec<String> = self.fetch_records(CollectionKey::Categories);
        if !stored.is_empty() {
            return stored;
        }

        let mut derived: Vec<String> = Vec::new();
        for item in self.fetch_inventory() {
            if let Some(category) = item.category.filter(|c| !c.is_empty()) {
                if !derived.contains(&category) {
                    derived.push(category);
                }
            }
        }
        derived
    }

    pub fn fetch_statuses(&self) -> Vec<String> {
        self.fetch_records(CollectionKey::Statuses)
    }

    pub fn fetch_inventory(&self) -> Vec<InventoryItem> {
        self.fetch_records(CollectionKey::Inventory)
    }

    pub fn fetch_inventory_summary(&self) -> InventorySummary {
        InventorySummary::from_items(&self.fetch_inventory())
    }

    pub fn fetch_concessions(&self) -> Vec<ConcessionItem> {
        self.fetch_records(CollectionKey::Concessions)
    }

    pub fn fetch_event_usage(&self, event_id: &str) -> Option<Value> {
        let mut usage: Map<String, Value> =
            self.get_collection(CollectionKey::EventUsage, Map::new());
        usage.remove(event_id)
    }

    pub fn fetch_event_requests(&self) -> Vec<EventRequest> {
        self.fetch_records(CollectionKey::EventRequests)
    }

    pub fn fetch_activity_log(&self) -> Vec<ActivityEntry> {
        self.fetch_records(CollectionKey::ActivityLog)
    }

    // ===== Mutations =====

    /// Append a concession item and return it with its assigned id.
    pub fn post_concession(&self, data: Value) -> Result<ConcessionItem, StoreError> {
        let mut records = self.load_records(CollectionKey::Concessions)?;
        let item = ConcessionItem::new(record::next_id(&records), into_fields(data));
        records.push(to_json(&item));
        self.try_set_collection(CollectionKey::Concessions, &records)?;

        debug!(id = item.id, "Added concession item");
        self.record_activity("create", CollectionKey::Concessions, Some(item.id.to_string()), None);
        Ok(item)
    }

    pub fn delete_concession(&self, id: i64) -> Ack {
        let mut records = match self.load_records(CollectionKey::Concessions) {
            Ok(records) => records,
            Err(e) => return refused(e),
        };
        let before = records.len();
        records.retain(|r| record::id_of(r) != Some(id));
        if records.len() == before {
            return Ack::not_found(format!("Concession item {} not found", id));
        }

        if let Err(e) = self.try_set_collection(CollectionKey::Concessions, &records) {
            return refused(e);
        }
        self.record_activity("delete", CollectionKey::Concessions, Some(id.to_string()), None);
        Ack::success(format!("Concession item {} deleted", id))
    }

    /// Store `data` as the usage for `event_id`, replacing any earlier entry.
    pub fn save_event_usage(&self, event_id: &str, data: Value) -> Ack {
        let mut usage = match self.load_event_usage() {
            Ok(usage) => usage,
            Err(e) => return refused(e),
        };
        usage.insert(event_id.to_string(), data);
        if let Err(e) = self.try_set_collection(CollectionKey::EventUsage, &usage) {
            return refused(e);
        }

        self.record_activity("update", CollectionKey::EventUsage, Some(event_id.to_string()), None);
        Ack::success(format!("Usage saved for event {}", event_id))
    }

    /// Queue a request for a new schedule entry. Its id is the list length
    /// plus one, moved past any larger id already stored.
    pub fn request_new_event(&self, data: Value) -> Ack {
        let mut records = match self.load_records(CollectionKey::EventRequests) {
            Ok(records) => records,
            Err(e) => return refused(e),
        };
        let id = (records.len() as i64 + 1).max(record::next_id(&records));
        let request = EventRequest::new(id, into_fields(data), Utc::now());
        let detail = request.title().map(String::from);
        records.push(to_json(&request));
        if let Err(e) = self.try_set_collection(CollectionKey::EventRequests, &records) {
            return refused(e);
        }

        self.record_activity("create", CollectionKey::EventRequests, Some(id.to_string()), detail);
        Ack::success("Event request received and logged.")
    }

    /// Replace the inventory record with the same id, or append a new one.
    /// Records without an id are given one past the current maximum. The
    /// payload is stored as given apart from the id.
    pub fn upsert_inventory_item(&self, data: Value) -> Result<InventoryItem, StoreError> {
        let Value::Object(mut fields) = data else {
            return Err(StoreError::Invalid(
                "Inventory item must be a JSON object".to_string(),
            ));
        };
        let mut records = self.load_records(CollectionKey::Inventory)?;

        let requested = fields.get("id").and_then(record::as_id).filter(|id| *id > 0);
        let position = requested
            .and_then(|id| records.iter().position(|r| record::id_of(r) == Some(id)));
        let id = requested.unwrap_or_else(|| record::next_id(&records));
        fields.insert("id".to_string(), Value::from(id));
        let stored = Value::Object(fields);

        let item: InventoryItem = serde_json::from_value(stored.clone())
            .map_err(|e| StoreError::Invalid(format!("Inventory item could not be read: {}", e)))?;
        let action = match position {
            Some(index) => {
                records[index] = stored;
                "update"
            }
            None => {
                records.push(stored);
                "create"
            }
        };
        self.try_set_collection(CollectionKey::Inventory, &records)?;

        self.record_activity(action, CollectionKey::Inventory, Some(id.to_string()), None);
        Ok(item)
    }

    /// Confirm that usage has been recorded for an event. Usage payloads are
    /// opaque, so no inventory counts are changed.
    pub fn sync_event_inventory(&self, event_id: &str) -> Ack {
        if self.fetch_event_usage(event_id).is_none() {
            return Ack::not_found(format!("No usage recorded for event {}", event_id));
        }
        self.record_activity("sync", CollectionKey::Inventory, Some(event_id.to_string()), None);
        Ack::success(format!("Inventory synced for event {}", event_id))
    }

    /// Register a player. Emails are unique across players, ignoring case.
    pub fn register_player(&self, data: Value) -> Result<Player, StoreError> {
        let registration: PlayerRegistration = serde_json::from_value(data)
            .map_err(|e| StoreError::Invalid(format!("Invalid player registration: {}", e)))?;
        registration.validate().map_err(StoreError::Invalid)?;

        let mut records = self.load_records(CollectionKey::Players)?;
        let email = registration.email.trim();
        let taken = records
            .iter()
            .filter_map(|r| r.get("email").and_then(Value::as_str))
            .any(|existing| existing.trim().eq_ignore_ascii_case(email));
        if taken {
            return Err(StoreError::Conflict(format!(
                "A player is already registered with {}",
                email
            )));
        }

        let player = registration.into_player(record::next_id(&records));
        records.push(to_json(&player));
        self.try_set_collection(CollectionKey::Players, &records)?;

        info!(id = player.id, "Player registered");
        self.record_activity(
            "create",
            CollectionKey::Players,
            Some(player.id.to_string()),
            Some(player.full_name()),
        );
        Ok(player)
    }

    /// Add a team. Any id in the payload is replaced by the next free one.
    pub fn add_team(&self, data: Value) -> Result<Team, StoreError> {
        let team: Team = serde_json::from_value(data)
            .map_err(|e| StoreError::Invalid(format!("Invalid team: {}", e)))?;
        if team.name.trim().is_empty() {
            return Err(StoreError::Invalid("name is required".to_string()));
        }

        let mut records = self.load_records(CollectionKey::Teams)?;
        let team = Team {
            id: record::next_id(&records),
            name: team.name.trim().to_string(),
            ..team
        };
        records.push(to_json(&team));
        self.try_set_collection(CollectionKey::Teams, &records)?;

        self.record_activity(
            "create",
            CollectionKey::Teams,
            Some(team.id.to_string()),
            Some(team.name.clone()),
        );
        Ok(team)
    }

    /// Route a generic write by endpoint name. Endpoints this store does not
    /// know resolve to a plain `ok` acknowledgement.
    pub fn post_data(&self, endpoint: &str, payload: Value) -> Value {
        let trimmed = endpoint.trim_matches('/');
        let trimmed = trimmed.strip_prefix("api/").unwrap_or(trimmed);
        let segments: Vec<&str> = trimmed.split('/').filter(|s| !s.is_empty()).collect();

        match segments.as_slice() {
            ["concessions"] => created_or_refused(self.post_concession(payload)),
            ["eventUsage" | "event-usage", event_id] => {
                to_json(&self.save_event_usage(event_id, payload))
            }
            ["schedule", "request"] => to_json(&self.request_new_event(payload)),
            ["inventory"] => created_or_refused(self.upsert_inventory_item(payload)),
            ["players"] => created_or_refused(self.register_player(payload)),
            ["teams"] => created_or_refused(self.add_team(payload)),
            ["syncEventInventory" | "sync-event-inventory", event_id]
            | ["events", event_id, "sync-inventory"] => {
                to_json(&self.sync_event_inventory(event_id))
            }
            _ => {
                debug!(endpoint = %endpoint, "No local handler for endpoint");
                to_json(&Ack::ok())
            }
        }
    }

    fn record_activity(
        &self,
        action: &str,
        entity: CollectionKey,
        entity_id: Option<String>,
        detail: Option<String>,
    ) {
        let mut log = match self.load_records(CollectionKey::ActivityLog) {
            Ok(log) => log,
            Err(e) => {
                warn!(error = %e, "Activity log unreadable, entry not recorded");
                return;
            }
        };
        let entry = ActivityEntry {
            id: record::next_id(&log),
            action: action.to_string(),
            entity: entity.as_str().to_string(),
            entity_id,
            detail,
            timestamp: Utc::now(),
        };
        log.push(to_json(&entry));
        self.set_collection(CollectionKey::ActivityLog, &log);
    }
}

/// Object payloads are used as-is; null becomes an empty record and any
/// other value is kept under `value`.
fn into_fields(data: Value) -> Map<String, Value> {
    match data {
        Value::Object(map) => map,
        Value::Null => Map::new(),
        other => {
            let mut map = Map::new();
            map.insert("value".to_string(), other);
            map
        }
    }
}

fn to_json<T: Serialize>(value: &T) -> Value {
    serde_json::to_value(value).unwrap_or(Value::Null)
}

fn refused(err: StoreError) -> Ack {
    warn!(error = %err, "Mutation refused");
    Ack::invalid(err.to_string())
}

fn created_or_refused<T: Serialize>(result: Result<T, StoreError>) -> Value {
    match result {
        Ok(created) => to_json(&created),
        Err(e) => to_json(&refused(e)),
    }
}

// ============================================================================
// Capability implementation
// ============================================================================

#[async_trait]
impl LeagueApi for LocalStore {
    async fn fetch_inventory(&self) -> Result<Vec<InventoryItem>, ApiError> {
        Ok(LocalStore::fetch_inventory(self))
    }

    async fn fetch_inventory_summary(&self) -> Result<InventorySummary, ApiError> {
        Ok(LocalStore::fetch_inventory_summary(self))
    }

    async fn fetch_coaches(&self) -> Result<Vec<Coach>, ApiError> {
        Ok(LocalStore::fetch_coaches(self))
    }

    async fn fetch_teams(&self) -> Result<Vec<Team>, ApiError> {
        Ok(LocalStore::fetch_teams(self))
    }

    async fn fetch_players(&self) -> Result<Vec<Player>, ApiError> {
        Ok(LocalStore::fetch_players(self))
    }

    async fn fetch_player(&self, id: i64) -> Result<Option<Player>, ApiError> {
        Ok(LocalStore::fetch_player(self, id))
    }

    async fn fetch_categories(&self) -> Result<Vec<String>, ApiError> {
        Ok(LocalStore::fetch_categories(self))
    }

    async fn fetch_statuses(&self) -> Result<Vec<String>, ApiError> {
        Ok(LocalStore::fetch_statuses(self))
    }

    async fn fetch_schedule(&self) -> Result<Vec<ScheduleEvent>, ApiError> {
        Ok(LocalStore::fetch_schedule(self))
    }

    async fn fetch_locations(&self) -> Result<Vec<String>, ApiError> {
        Ok(LocalStore::fetch_locations(self))
    }

    async fn fetch_events(&self, team_id: Option<i64>) -> Result<Vec<ScheduleEvent>, ApiError> {
        Ok(LocalStore::fetch_events(self, team_id))
    }

    async fn fetch_concessions(&self) -> Result<Vec<ConcessionItem>, ApiError> {
        Ok(LocalStore::fetch_concessions(self))
    }

    async fn fetch_event_usage(&self, event_id: &str) -> Result<Option<Value>, ApiError> {
        Ok(LocalStore::fetch_event_usage(self, event_id))
    }

    async fn fetch_event_requests(&self) -> Result<Vec<EventRequest>, ApiError> {
        Ok(LocalStore::fetch_event_requests(self))
    }

    async fn fetch_activity_log(&self) -> Result<Vec<ActivityEntry>, ApiError> {
        Ok(LocalStore::fetch_activity_log(self))
    }

    async fn post_data(&self, endpoint: &str, payload: Value) -> Result<Value, ApiError> {
        Ok(LocalStore::post_data(self, endpoint, payload))
    }

    async fn save_event_usage(&self, event_id: &str, payload: Value) -> Result<Ack, ApiError> {
        Ok(LocalStore::save_event_usage(self, event_id, payload))
    }

    async fn add_concession_item(&self, payload: Value) -> Result<ConcessionItem, ApiError> {
        Ok(self.post_concession(payload)?)
    }

    async fn delete_concession_item(&self, id: i64) -> Result<Ack, ApiError> {
        Ok(self.delete_concession(id))
    }

    async fn request_new_event(&self, payload: Value) -> Result<Ack, ApiError> {
        Ok(LocalStore::request_new_event(self, payload))
    }

    async fn sync_event_inventory(&self, event_id: &str) -> Result<Ack, ApiError> {
        Ok(LocalStore::sync_event_inventory(self, event_id))
    }

    async fn register_player(&self, payload: Value) -> Result<Player, ApiError> {
        Ok(LocalStore::register_player(self, payload)?)
    }

    async fn add_team(&self, payload: Value) -> Result<Team, ApiError> {
        Ok(LocalStore::add_team(self, payload)?)
    }
}

// ============================================================================
// Tests
// ============================================================================
