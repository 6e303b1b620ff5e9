//! Configuration Module
//!
//! Handles loading and managing service configuration from environment variables.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::cache::CachePolicy;
use crate::retry::SpotifyCredentials;

/// Service configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Root directory holding downloaded artwork and the persisted index
    pub cache_root: PathBuf,
    /// Days after which any entry is considered stale
    pub expiry_days: u64,
    /// Hours during which a failed fetch is not attempted again
    pub failure_grace_hours: u64,
    /// HTTP server port
    pub server_port: u16,
    /// Housekeeping interval in seconds
    pub cleanup_interval: u64,
    /// Timeout in seconds applied to reachability checks, downloads and lookups
    pub http_timeout: u64,
    /// Spotify client id, if configured
    pub spotify_client_id: Option<String>,
    /// Spotify client secret, if configured
    pub spotify_client_secret: Option<String>,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `CACHE_ROOT` - Cache root directory (default: `$TMPDIR/artwork_cache`)
    /// - `CACHE_EXPIRY_DAYS` - Expiry window in days (default: 30)
    /// - `FAILURE_GRACE_HOURS` - Failure grace window in hours (default: 24)
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    /// - `CLEANUP_INTERVAL` - Housekeeping frequency in seconds (default: 3600)
    /// - `HTTP_TIMEOUT` - Outbound request timeout in seconds (default: 15)
    /// - `SPOTIFY_CLIENT_ID` / `SPOTIFY_CLIENT_SECRET` - Spotify credentials
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            cache_root: env::var("CACHE_ROOT")
                .ok()
                .filter(|v| !v.trim().is_empty())
                .map(PathBuf::from)
                .unwrap_or(defaults.cache_root),
            expiry_days: parse_var("CACHE_EXPIRY_DAYS").unwrap_or(defaults.expiry_days),
            failure_grace_hours: parse_var("FAILURE_GRACE_HOURS")
                .unwrap_or(defaults.failure_grace_hours),
            server_port: parse_var("SERVER_PORT").unwrap_or(defaults.server_port),
            cleanup_interval: parse_var("CLEANUP_INTERVAL").unwrap_or(defaults.cleanup_interval),
            http_timeout: parse_var("HTTP_TIMEOUT").unwrap_or(defaults.http_timeout),
            spotify_client_id: non_empty_var("SPOTIFY_CLIENT_ID"),
            spotify_client_secret: non_empty_var("SPOTIFY_CLIENT_SECRET"),
        }
    }

    /// Expiry and grace windows as a cache policy.
    pub fn cache_policy(&self) -> CachePolicy {
        CachePolicy {
            expiry: Duration::from_secs(self.expiry_days * 24 * 60 * 60),
            failure_grace: Duration::from_secs(self.failure_grace_hours * 60 * 60),
        }
    }

    /// Primary directory for downloaded artwork.
    pub fn primary_image_dir(&self) -> PathBuf {
        self.cache_root.join("image_cache")
    }

    /// Directory used when the primary one cannot be created.
    pub fn fallback_image_dir(&self) -> PathBuf {
        self.cache_root.join("img_cache")
    }

    /// Directory backing the persisted key-value store.
    pub fn store_dir(&self) -> PathBuf {
        self.cache_root.join("store")
    }

    /// Spotify credentials, present only when both halves are set.
    pub fn spotify_credentials(&self) -> Option<SpotifyCredentials> {
        match (&self.spotify_client_id, &self.spotify_client_secret) {
            (Some(id), Some(secret)) => Some(SpotifyCredentials::new(id, secret)),
            _ => None,
        }
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout)
    }
}

fn parse_var<T: std::str::FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|v| v.parse().ok())
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl Default for Config {
    fn default() -> Self {
        Self {
            cache_root: env::temp_dir().join("artwork_cache"),
            expiry_days: 30,
            failure_grace_hours: 24,
            server_port: 3000,
            cleanup_interval: 3600,
            http_timeout: 15,
            spotify_client_id: None,
            spotify_client_secret: None,
        }
    }
}
