//! Retry Policy
//!
//! Decides whether a failed artwork fetch is worth one more attempt with a
//! freshly looked-up URL. Only Spotify qualifies: its image links expire and
//! a new lookup usually returns a working one.

use regex::Regex;

// == Spotify Credentials ==
/// Client credentials for the Spotify Web API.
#[derive(Clone, PartialEq, Eq)]
pub struct SpotifyCredentials {
    pub client_id: String,
    pub client_secret: String,
}

impl SpotifyCredentials {
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
        }
    }

    /// Both halves present and non-blank.
    pub fn is_configured(&self) -> bool {
        !self.client_id.trim().is_empty() && !self.client_secret.trim().is_empty()
    }
}

impl std::fmt::Debug for SpotifyCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpotifyCredentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .finish()
    }
}

const SPOTIFY_LINK_PATTERN: &str =
    r"^https?://(open\.)?spotify\.com/(track|album|playlist|artist)/[A-Za-z0-9]+";

// == Retry Policy ==
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    spotify: Option<SpotifyCredentials>,
    spotify_link: Regex,
}

impl RetryPolicy {
    pub fn new(spotify: Option<SpotifyCredentials>) -> Self {
        Self {
            spotify: spotify.filter(SpotifyCredentials::is_configured),
            spotify_link: Regex::new(SPOTIFY_LINK_PATTERN).expect("valid Spotify link pattern"),
        }
    }

    /// Policy that never retries.
    pub fn disabled() -> Self {
        Self::new(None)
    }

    pub fn is_enabled(&self) -> bool {
        self.spotify.is_some()
    }

    /// True when `url` is a Spotify content link.
    pub fn is_spotify_link(&self, url: &str) -> bool {
        self.spotify_link.is_match(url.trim())
    }

    /// True only for Spotify links, and only with credentials configured.
    pub fn should_auto_retry(&self, url: &str) -> bool {
        self.is_enabled() && self.is_spotify_link(url)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::disabled()
    }
}
