//! Visitor information lookup
//!
//! Resolves the public IP and user agent recorded in the session-start entry.
//! Lookups never fail from the caller's point of view: any error degrades to
//! an "Unknown" IP and the locally known user agent.

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::config::Config;
use crate::store::{NewEntry, UNKNOWN_IP};

/// Method marker recorded for the session-start entry
pub const SESSION_START_METHOD: &str = "PAGE_LOAD";

/// Referer recorded for the session-start entry
const LOCAL_REFERER: &str = "terminal";

/// Who is looking at the logs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VisitorInfo {
    pub ip: String,
    pub user_agent: String,
    pub timestamp: DateTime<Utc>,
}

impl VisitorInfo {
    /// Value used when the lookup fails
    pub fn fallback() -> Self {
        Self {
            ip: UNKNOWN_IP.to_string(),
            user_agent: local_user_agent(),
            timestamp: Utc::now(),
        }
    }
}

/// User agent string describing this program
pub fn local_user_agent() -> String {
    format!(
        "{}/{} ({})",
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION"),
        std::env::consts::OS
    )
}

/// Build the entry recorded when a viewing session starts
pub fn session_start_entry(info: &VisitorInfo) -> NewEntry {
    NewEntry::new(info.ip.clone())
        .with_method(SESSION_START_METHOD)
        .with_status(200)
        .with_user_agent(info.user_agent.clone())
        .with_header("User-Agent", info.user_agent.clone())
        .with_header("Referer", LOCAL_REFERER)
}

/// Source of visitor information
#[async_trait]
pub trait VisitorInfoProvider: Send + Sync {
    /// Perform the lookup, reporting any failure
    async fn fetch(&self) -> Result<VisitorInfo>;

    /// Perform the lookup, falling back to [`VisitorInfo::fallback`] on failure
    async fn visitor_info(&self) -> VisitorInfo {
        match self.fetch().await {
            Ok(info) => info,
            Err(e) => {
                tracing::warn!("Failed to retrieve visitor information: {:#}", e);
                VisitorInfo::fallback()
            }
        }
    }
}

/// Provider that skips the network and always reports the fallback
#[derive(Debug, Default, Clone, Copy)]
pub struct OfflineVisitorInfoProvider;

#[async_trait]
impl VisitorInfoProvider for OfflineVisitorInfoProvider {
    async fn fetch(&self) -> Result<VisitorInfo> {
        Ok(VisitorInfo::fallback())
    }
}

#[derive(Debug, Deserialize)]
struct IpResponse {
    ip: String,
}

#[derive(Debug, Deserialize)]
struct UserAgentResponse {
    #[serde(default)]
    ua: Option<String>,
}

/// Looks up visitor information over HTTP
#[derive(Debug, Clone)]
pub struct HttpVisitorInfoProvider {
    client: reqwest::Client,
    ip_url: String,
    user_agent_url: String,
}

impl HttpVisitorInfoProvider {
    /// Create a provider with a per-request timeout
    pub fn new(
        ip_url: impl Into<String>,
        user_agent_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(local_user_agent())
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self {
            client,
            ip_url: ip_url.into(),
            user_agent_url: user_agent_url.into(),
        })
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(
            config.ip_lookup_url.clone(),
            config.user_agent_lookup_url.clone(),
            config.visitor_timeout(),
        )
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, url: &str) -> Result<T> {
        self.client
            .get(url)
            .send()
            .await
            .with_context(|| format!("Request to {} failed", url))?
            .error_for_status()
            .with_context(|| format!("Request to {} returned an error status", url))?
            .json::<T>()
            .await
            .with_context(|| format!("Invalid JSON from {}", url))
    }
}

#[async_trait]
impl VisitorInfoProvider for HttpVisitorInfoProvider {
    async fn fetch(&self) -> Result<VisitorInfo> {
        let (ip, ua) = tokio::try_join!(
            self.get_json::<IpResponse>(&self.ip_url),
            self.get_json::<UserAgentResponse>(&self.user_agent_url),
        )?;

        Ok(VisitorInfo {
            ip: ip.ip,
            user_agent: ua.ua.unwrap_or_else(local_user_agent),
            timestamp: Utc::now(),
        })
    }
}
