//! Metadata Lookup Module
//!
//! Provider metadata lookups used to obtain a fresh artwork URL when a cached
//! one stopped working.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::error::Result;
use crate::fetch::build_client;

// == Metadata ==
/// The subset of provider metadata the cache cares about.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Metadata {
    pub title: Option<String>,
    pub artist: Option<String>,
    pub image_url: Option<String>,
}

// == Metadata Lookup Trait ==
#[async_trait]
pub trait MetadataLookup: Send + Sync {
    /// Looks up `link`; None when the provider knows nothing about it.
    async fn lookup(&self, link: &str) -> Option<Metadata>;
}

/// Lookup that never finds anything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoLookup;

#[async_trait]
impl MetadataLookup for NoLookup {
    async fn lookup(&self, _link: &str) -> Option<Metadata> {
        None
    }
}

// == Spotify oEmbed Lookup ==
/// Default Spotify oEmbed endpoint.
pub const SPOTIFY_OEMBED_ENDPOINT: &str = "https://open.spotify.com/oembed";

#[derive(Debug, Deserialize)]
struct OEmbedResponse {
    title: Option<String>,
    author_name: Option<String>,
    thumbnail_url: Option<String>,
}

/// Resolves Spotify links through the public oEmbed endpoint.
#[derive(Debug, Clone)]
pub struct SpotifyOEmbedLookup {
    client: reqwest::Client,
    endpoint: String,
}

impl SpotifyOEmbedLookup {
    pub fn new(timeout: Duration) -> Result<Self> {
        Self::with_endpoint(SPOTIFY_OEMBED_ENDPOINT, timeout)
    }

    pub fn with_endpoint(endpoint: impl Into<String>, timeout: Duration) -> Result<Self> {
        Ok(Self {
            client: build_client(timeout)?,
            endpoint: endpoint.into(),
        })
    }
}

#[async_trait]
impl MetadataLookup for SpotifyOEmbedLookup {
    async fn lookup(&self, link: &str) -> Option<Metadata> {
        let response = match self
            .client
            .get(&self.endpoint)
            .query(&[("url", link)])
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                warn!("Spotify lookup failed for {}: {}", link, e);
                return None;
            }
        };

        if !response.status().is_success() {
            debug!("Spotify lookup for {} returned {}", link, response.status());
            return None;
        }

        match response.json::<OEmbedResponse>().await {
            Ok(body) => Some(Metadata {
                title: body.title,
                artist: body.author_name,
                image_url: body.thumbnail_url,
            }),
            Err(e) => {
                warn!("Unexpected Spotify lookup response for {}: {}", link, e);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    const LINK: &str = "https://open.spotify.com/track/4uLU6hMCjMI75M1A2tKUQC";

    #[tokio::test]
    async fn test_oembed_lookup_returns_thumbnail() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/oembed").query_param("url", LINK);
                then.status(200).json_body(serde_json::json!({
                    "title": "Never Gonna Give You Up",
                    "thumbnail_url": "https://image-cdn-ak.spotifycdn.com/image/ab67616d00001e02",
                    "type": "rich"
                }));
            })
            .await;

        let lookup =
            SpotifyOEmbedLookup::with_endpoint(server.url("/oembed"), Duration::from_secs(5))
                .unwrap();
        let metadata = lookup.lookup(LINK).await.unwrap();

        assert_eq!(metadata.title.as_deref(), Some("Never Gonna Give You Up"));
        assert_eq!(
            metadata.image_url.as_deref(),
            Some("https://image-cdn-ak.spotifycdn.com/image/ab67616d00001e02")
        );
    }

    #[tokio::test]
    async fn test_oembed_lookup_not_found() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/oembed");
                then.status(404);
            })
            .await;

        let lookup =
            SpotifyOEmbedLookup::with_endpoint(server.url("/oembed"), Duration::from_secs(5))
                .unwrap();
        assert!(lookup.lookup(LINK).await.is_none());
    }

    #[tokio::test]
    async fn test_no_lookup() {
        assert!(NoLookup.lookup(LINK).await.is_none());
    }
}
