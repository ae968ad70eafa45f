//! REST API client module for the league backend.
//!
//! This module provides the `RemoteClient`, the network-backed
//! implementation of `LeagueApi`. It speaks to the league server's
//! `/api/...` endpoints and mirrors the local store's operations one for one.
//!
//! Authenticated calls carry the bearer token from the saved session.

pub mod client;
pub mod error;

pub use client::RemoteClient;
pub use error::ApiError;
