use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use super::Role;

/// Session file name in the data directory
const SESSION_FILE: &str = "session.json";

/// Token lifetime, matching the league server's access-token expiry.
const TOKEN_EXPIRY_DAYS: i64 = 7;

/// Refresh when less than this much lifetime remains.
const TOKEN_REFRESH_BUFFER_HOURS: i64 = 12;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionData {
    pub token: String,
    pub email: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

impl SessionData {
    pub fn new(token: String, email: String, role: Role) -> Self {
        Self {
            token,
            email,
            role,
            created_at: Utc::now(),
        }
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        self.created_at + Duration::days(TOKEN_EXPIRY_DAYS)
    }

    pub fn is_expired(&self) -> bool {
        Utc::now() > self.expires_at()
    }

    /// Check if the session will expire soon and should be refreshed
    pub fn needs_refresh(&self) -> bool {
        Utc::now() > self.expires_at() - Duration::hours(TOKEN_REFRESH_BUFFER_HOURS)
    }

    /// Get hours remaining until expiry (for display)
    pub fn hours_until_expiry(&self) -> i64 {
        (self.expires_at() - Utc::now()).num_hours().max(0)
    }
}

pub struct Session {
    data_dir: PathBuf,
    pub data: Option<SessionData>,
}

impl Session {
    pub fn new(data_dir: PathBuf) -> Self {
        Self {
            data_dir,
            data: None,
        }
    }

    /// Load session from disk. Returns whether a valid session was found.
    pub fn load(&mut self) -> Result<bool> {
        let path = self.session_path();
        if path.exists() {
            let contents = std::fs::read_to_string(&path)
                .context("Failed to read session file")?;
            let data: SessionData = serde_json::from_str(&contents)
                .context("Failed to parse session file")?;

            if !data.is_expired() {
                self.data = Some(data);
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Save session to disk
    pub fn save(&self) -> Result<()> {
        if let Some(ref data) = self.data {
            let path = self.session_path();
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            let contents = serde_json::to_string_pretty(data)?;
            std::fs::write(path, contents)?;
        }
        Ok(())
    }

    /// Clear session data
    pub fn clear(&mut self) -> Result<()> {
        self.data = None;
        let path = self.session_path();
        if path.exists() {
            std::fs::remove_file(path)?;
        }
        Ok(())
    }

    /// Update session with new data
    pub fn update(&mut self, data: SessionData) {
        self.data = Some(data);
    }

    fn current(&self) -> Option<&SessionData> {
        self.data.as_ref().filter(|d| !d.is_expired())
    }

    /// Get the bearer token if an unexpired session is loaded
    pub fn token(&self) -> Option<&str> {
        self.current().map(|d| d.token.as_str())
    }

    /// Role of the signed-in user; `None` once the session has expired.
    pub fn role(&self) -> Option<Role> {
        self.current().map(|d| d.role)
    }

    /// Check if session is valid (exists and not expired)
    pub fn is_valid(&self) -> bool {
        self.current().is_some()
    }

    fn session_path(&self) -> PathBuf {
        self.data_dir.join(SESSION_FILE)
    }
}
