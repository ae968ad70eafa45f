//! Data models for league entities.
//!
//! This module contains all the data structures stored in the league
//! collections and returned by the backends:
//!
//! - `Team`, `Coach`: rosters seeded on first run
//! - `Player`, `PlayerRegistration`: registered players and the form that adds them
//! - `ScheduleEvent`, `EventRequest`: the game/practice calendar and requests for new entries
//! - `InventoryItem`, `InventorySummary`: equipment records and derived counters
//! - `ConcessionItem`: concession stand items
//! - `ActivityEntry`: audit trail of local mutations
//! - `Ack`: the acknowledgement record returned by mutations
//!
//! `record` holds the lenient id/text readers shared by the stored models.

pub mod ack;
pub mod activity;
pub mod concession;
pub mod inventory;
pub mod player;
pub mod record;
pub mod schedule;
pub mod team;

pub use ack::Ack;
pub use activity::ActivityEntry;
pub use concession::ConcessionItem;
pub use inventory::{InventoryItem, InventorySummary, StatusClass};
pub use player::{Player, PlayerRegistration};
pub use schedule::{EventRequest, EventType, ScheduleEvent};
pub use team::{Coach, Team};
