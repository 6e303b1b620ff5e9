//! Cache Entry Module
//!
//! Defines the persisted record kept for every artwork URL.

use std::time::Duration;

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::cache::Provider;

// == Cache Policy ==
/// Age limits applied to cache entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CachePolicy {
    /// Any entry older than this is stale
    pub expiry: Duration,
    /// Failed entries younger than this suppress new attempts
    pub failure_grace: Duration,
}

impl Default for CachePolicy {
    fn default() -> Self {
        Self {
            expiry: Duration::from_secs(30 * 24 * 60 * 60),
            failure_grace: Duration::from_secs(24 * 60 * 60),
        }
    }
}

// == Cache Entry ==
/// Outcome of the last fetch of one artwork URL.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheEntry {
    /// Path of the downloaded file, None when the fetch failed
    pub local_handle: Option<String>,
    /// Creation timestamp (Unix milliseconds)
    pub timestamp: i64,
    #[serde(default)]
    pub failed: bool,
    #[serde(default = "unknown_provider")]
    pub provider: Provider,
    #[serde(default)]
    pub original_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

fn unknown_provider() -> Provider {
    Provider::Unknown
}

impl CacheEntry {
    // == Constructors ==
    /// Creates an entry for a successful download.
    pub fn success(url: &str, local_handle: String) -> Self {
        Self {
            local_handle: Some(local_handle),
            timestamp: current_timestamp_ms(),
            failed: false,
            provider: Provider::from_url(url),
            original_url: url.to_string(),
            error_message: None,
        }
    }

    /// Creates an entry recording a failed attempt.
    pub fn failure(url: &str, error_message: impl Into<String>) -> Self {
        Self {
            local_handle: None,
            timestamp: current_timestamp_ms(),
            failed: true,
            provider: Provider::from_url(url),
            original_url: url.to_string(),
            error_message: Some(error_message.into()),
        }
    }

    /// Overrides the timestamp.
    pub fn with_timestamp(mut self, timestamp: i64) -> Self {
        self.timestamp = timestamp;
        self
    }

    // == Age Checks ==
    /// Milliseconds elapsed since the entry was written, clamped at zero.
    pub fn age_ms(&self, now: i64) -> u64 {
        now.saturating_sub(self.timestamp).max(0) as u64
    }

    /// True once the entry has reached the expiry window.
    pub fn is_expired(&self, now: i64, policy: &CachePolicy) -> bool {
        self.age_ms(now) >= policy.expiry.as_millis() as u64
    }

    /// True for a fresh entry that points at a downloaded file.
    pub fn is_usable(&self, now: i64, policy: &CachePolicy) -> bool {
        !self.failed && self.local_handle.is_some() && !self.is_expired(now, policy)
    }

    /// True for a failed entry still inside the grace window.
    pub fn suppresses_retry(&self, now: i64, policy: &CachePolicy) -> bool {
        self.failed && self.age_ms(now) < policy.failure_grace.as_millis() as u64
    }

    /// True when cleanup should drop the entry.
    pub fn is_evictable(&self, now: i64, policy: &CachePolicy) -> bool {
        self.is_expired(now, policy) || (self.failed && !self.suppresses_retry(now, policy))
    }
}

// == Utility Functions ==
/// Returns current Unix timestamp in milliseconds.
pub fn current_timestamp_ms() -> i64 {
    Utc::now().timestamp_millis()
}
