//! Image Fetcher Module
//!
//! Network side of artwork acquisition: a reachability check and a download
//! into a local file.

use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use crate::error::{ArtworkError, Result};

// == Download ==
/// Outcome of a completed download request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Download {
    /// HTTP status of the GET
    pub status: u16,
    /// File the body was written to; only meaningful on success
    pub path: PathBuf,
    /// Number of bytes written
    pub bytes: u64,
}

impl Download {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

// == Image Fetcher Trait ==
/// Network operations used by the fetch engine.
#[async_trait]
pub trait ImageFetcher: Send + Sync {
    /// Lightweight reachability check; returns the HTTP status.
    ///
    /// Transport failures are reported as [`ArtworkError::Unreachable`].
    async fn check(&self, url: &str) -> Result<u16>;

    /// Downloads `url` into `dest`. A non-success status is reported through
    /// [`Download::status`] and leaves `dest` untouched.
    async fn download(&self, url: &str, dest: &Path) -> Result<Download>;
}

// == HTTP Fetcher ==
/// [`ImageFetcher`] backed by reqwest.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    /// Creates a fetcher whose requests time out after `timeout`.
    pub fn new(timeout: Duration) -> Result<Self> {
        Ok(Self {
            client: build_client(timeout)?,
        })
    }
}

/// Builds the reqwest client shared by fetchers and lookups.
pub(crate) fn build_client(timeout: Duration) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| ArtworkError::HttpClient(e.to_string()))
}

#[async_trait]
impl ImageFetcher for HttpFetcher {
    async fn check(&self, url: &str) -> Result<u16> {
        let response = self
            .client
            .head(url)
            .send()
            .await
            .map_err(|e| {
                debug!("Reachability check transport error for {}: {}", url, e);
                ArtworkError::Unreachable {
                    url: url.to_string(),
                    status: e.status().map(|s| s.as_u16()),
                }
            })?;

        Ok(response.status().as_u16())
    }

    async fn download(&self, url: &str, dest: &Path) -> Result<Download> {
        let response = self.client.get(url).send().await.map_err(|e| {
            ArtworkError::DownloadFailed {
                url: url.to_string(),
                status: e.status().map(|s| s.as_u16()),
                reason: e.to_string(),
            }
        })?;

        let status = response.status().as_u16();
        if !response.status().is_success() {
            return Ok(Download {
                status,
                path: dest.to_path_buf(),
                bytes: 0,
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| ArtworkError::DownloadFailed {
                url: url.to_string(),
                status: Some(status),
                reason: format!("body read failed: {}", e),
            })?;

        tokio::fs::write(dest, &body).await.map_err(|e| {
            ArtworkError::Storage(format!("Failed to write {}: {}", dest.display(), e))
        })?;

        Ok(Download {
            status,
            path: dest.to_path_buf(),
            bytes: body.len() as u64,
        })
    }
}
