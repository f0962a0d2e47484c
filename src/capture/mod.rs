//! Request capture
//!
//! Runs a local HTTP endpoint (the "payload URL"). Every request it receives,
//! whatever its method or path, is turned into a log entry and forwarded to
//! the application through a channel.

pub mod server;

pub use server::{
    CaptureReceiver, CaptureSender, ServerHandle, DEFAULT_CHANNEL_BUFFER,
};

use std::collections::BTreeMap;
use std::net::SocketAddr;

use axum::http::{header, HeaderMap, Method};
use chrono::{DateTime, Utc};

use crate::store::{NewEntry, UNKNOWN_IP};

/// Status code answered to (and recorded for) captured requests
pub const CAPTURE_STATUS: u16 = 200;

/// A request seen by the capture endpoint
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturedRequest {
    pub entry: NewEntry,
    pub received_at: DateTime<Utc>,
}

impl CapturedRequest {
    /// Describe an incoming request as a log entry
    pub fn from_parts(peer: Option<SocketAddr>, method: &Method, headers: &HeaderMap) -> Self {
        let ip = peer
            .map(|addr| addr.ip().to_string())
            .unwrap_or_else(|| UNKNOWN_IP.to_string());

        let mut entry = NewEntry::new(ip)
            .with_method(method.as_str())
            .with_status(CAPTURE_STATUS);

        if let Some(ua) = headers
            .get(header::USER_AGENT)
            .and_then(|v| v.to_str().ok())
        {
            entry = entry.with_user_agent(ua);
        }

        let collected = collect_headers(headers);
        if !collected.is_empty() {
            entry.headers = Some(collected);
        }

        Self {
            entry,
            received_at: Utc::now(),
        }
    }
}

/// Flatten headers into a name -> value map
///
/// Repeated headers are joined with ", "; values that are not valid UTF-8
/// are skipped.
fn collect_headers(headers: &HeaderMap) -> BTreeMap<String, String> {
    let mut map: BTreeMap<String, String> = BTreeMap::new();
    for (name, value) in headers {
        let Ok(value) = value.to_str() else {
            continue;
        };
        map.entry(name.as_str().to_string())
            .and_modify(|existing| {
                existing.push_str(", ");
                existing.push_str(value);
            })
            .or_insert_with(|| value.to_string());
    }
    map
}
