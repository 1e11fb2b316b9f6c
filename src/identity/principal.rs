use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Role claim as issued: a single role name or several.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum RoleClaim {
    Single(String),
    Many(Vec<String>),
}

impl RoleClaim {
    pub fn contains(&self, name: &str) -> bool {
        match self {
            RoleClaim::Single(r) => r == name,
            RoleClaim::Many(rs) => rs.iter().any(|r| r == name),
        }
    }

    pub fn names(&self) -> Vec<&str> {
        match self {
            RoleClaim::Single(r) => vec![r.as_str()],
            RoleClaim::Many(rs) => rs.iter().map(String::as_str).collect(),
        }
    }
}

impl Default for RoleClaim {
    fn default() -> Self { RoleClaim::Many(Vec::new()) }
}

/// Decoded, in-memory view of the signed-in user. Never persisted; rebuilt
/// from the access token whenever tokens are loaded or replaced.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Identity {
    pub email: String,
    #[serde(default)]
    pub role: RoleClaim,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub permissions: BTreeSet<String>,
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
}

impl Identity {
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.map(|exp| exp <= now).unwrap_or(false)
    }

    /// Name shown in navigation: username when present, else email.
    pub fn display_name(&self) -> &str {
        self.username.as_deref().unwrap_or(self.email.as_str())
    }
}
