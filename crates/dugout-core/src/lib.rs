//! Core library for dugout.
//!
//! Keeps a youth league's teams, coaches, schedule, inventory, concessions,
//! event usage and event requests either in a local storage medium or on a
//! remote league server, behind one `LeagueApi` trait.

pub mod api;
pub mod auth;
pub mod backend;
pub mod config;
pub mod models;
pub mod storage;
pub mod store;

pub use api::{ApiError, RemoteClient};
pub use backend::{build_backend, open_local_store, BackendMode, LeagueApi};
pub use config::Config;
pub use store::{CollectionKey, LocalStore, StoreError};
