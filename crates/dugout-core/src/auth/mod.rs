//! Authentication module for user sessions and permissions.
//!
//! This module provides:
//! - `Session`: bearer-token session persisted to the data directory
//! - `Role`: league roles and what each may change
//!
//! Tokens are issued by the league server and expire after 7 days.

pub mod roles;
pub mod session;

pub use roles::{is_league_email, is_open_endpoint, may_post, Role, DEFAULT_LEAGUE_DOMAIN};
pub use session::{Session, SessionData};
