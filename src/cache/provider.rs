//! Provider Detection Module
//!
//! Tags artwork URLs with the external service they come from.

use serde::{Deserialize, Serialize};

// == Provider ==
/// External service an artwork URL belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Provider {
    #[serde(rename = "TMDB")]
    Tmdb,
    #[serde(rename = "YouTube")]
    YouTube,
    #[serde(rename = "Spotify")]
    Spotify,
    #[serde(rename = "Apple Podcasts")]
    ApplePodcasts,
    #[serde(rename = "Listen Notes")]
    ListenNotes,
    #[serde(rename = "Unknown", other)]
    Unknown,
}

/// Ordered substring table; the first match wins.
const PROVIDER_PATTERNS: &[(&str, Provider)] = &[
    ("tmdb.org", Provider::Tmdb),
    ("themoviedb.org", Provider::Tmdb),
    ("youtube.com", Provider::YouTube),
    ("ytimg.com", Provider::YouTube),
    ("youtu.be", Provider::YouTube),
    ("scdn.co", Provider::Spotify),
    ("spotify.com", Provider::Spotify),
    ("spotifycdn.com", Provider::Spotify),
    ("mzstatic.com", Provider::ApplePodcasts),
    ("podcasts.apple.com", Provider::ApplePodcasts),
    ("listennotes.com", Provider::ListenNotes),
];

impl Provider {
    /// Infers the provider from a URL by substring matching.
    pub fn from_url(url: &str) -> Self {
        PROVIDER_PATTERNS
            .iter()
            .find(|(pattern, _)| url.contains(pattern))
            .map(|(_, provider)| *provider)
            .unwrap_or(Provider::Unknown)
    }

    /// Tag used in logs and persisted entries.
    pub fn tag(&self) -> &'static str {
        match self {
            Provider::Tmdb => "TMDB",
            Provider::YouTube => "YouTube",
            Provider::Spotify => "Spotify",
            Provider::ApplePodcasts => "Apple Podcasts",
            Provider::ListenNotes => "Listen Notes",
            Provider::Unknown => "Unknown",
        }
    }
}

impl std::fmt::Display for Provider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.tag())
    }
}
