//! Log entry types
//!
//! `LogEntry` is the persisted record; `NewEntry` is what callers hand to the
//! store before an id and timestamp have been assigned.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// IP recorded when the address could not be determined
pub const UNKNOWN_IP: &str = "Unknown";

/// One recorded visitor or request event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogEntry {
    /// Unique identifier, never reused
    pub id: String,
    /// Creation time, serialized as RFC 3339
    pub timestamp: DateTime<Utc>,
    /// Source address, or "Unknown"
    pub ip: String,
    /// HTTP verb or a synthetic marker such as `PAGE_LOAD`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub headers: Option<BTreeMap<String, String>>,
}

impl LogEntry {
    /// Stamp a partial entry with a fresh id and the given creation time
    pub fn from_new(new: NewEntry, timestamp: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            timestamp,
            ip: new.ip,
            method: new.method,
            status: new.status,
            user_agent: new.user_agent,
            headers: new.headers,
        }
    }

    /// Method for display and filtering; a missing method reads as empty
    pub fn method_or_empty(&self) -> &str {
        self.method.as_deref().unwrap_or("")
    }
}

/// A log entry as supplied by a caller, before the store assigns id and timestamp
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewEntry {
    pub ip: String,
    pub method: Option<String>,
    pub status: Option<u16>,
    pub user_agent: Option<String>,
    pub headers: Option<BTreeMap<String, String>>,
}

impl NewEntry {
    /// Create a partial entry for the given source address
    pub fn new(ip: impl Into<String>) -> Self {
        Self {
            ip: ip.into(),
            ..Self::default()
        }
    }

    pub fn with_method(mut self, method: impl Into<String>) -> Self {
        self.method = Some(method.into());
        self
    }

    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Add a single header, creating the header map if needed
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers
            .get_or_insert_with(BTreeMap::new)
            .insert(name.into(), value.into());
        self
    }
}
