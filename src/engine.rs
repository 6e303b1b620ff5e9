//! Fetch-and-Store Engine
//!
//! Turns a remote artwork URL into a local file, consulting and updating the
//! cache index on every path.
//!
//! # Acquire Sequence
//! 1. Fresh successful entry: return its handle, no I/O
//! 2. Failed entry inside the grace window: fail immediately, no I/O
//! 3. Check the URL is reachable, ensure a cache directory, download
//! 4. Record the outcome (success or failure) and return it

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError};

use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, warn};

use crate::cache::{derive_key, CacheEntry, CacheIndex, CachePolicy, CacheStats, Lookup, Provider};
use crate::error::{ArtworkError, Result};
use crate::fetch::ImageFetcher;

// == Cache Directories ==
/// Where downloaded artwork is written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheDirs {
    pub primary: PathBuf,
    pub fallback: PathBuf,
}

impl CacheDirs {
    pub fn new(primary: impl Into<PathBuf>, fallback: impl Into<PathBuf>) -> Self {
        Self {
            primary: primary.into(),
            fallback: fallback.into(),
        }
    }

    /// Creates the primary directory, or the fallback if that fails.
    ///
    /// At most two creation attempts are made.
    pub async fn ensure(&self) -> Result<PathBuf> {
        let primary_err = match tokio::fs::create_dir_all(&self.primary).await {
            Ok(()) => return Ok(self.primary.clone()),
            Err(e) => e,
        };

        warn!(
            "Failed to create cache directory {}: {}; trying {}",
            self.primary.display(),
            primary_err,
            self.fallback.display()
        );

        match tokio::fs::create_dir_all(&self.fallback).await {
            Ok(()) => Ok(self.fallback.clone()),
            Err(e) => Err(ArtworkError::Storage(format!(
                "Failed to create cache directories {} ({}) and {} ({})",
                self.primary.display(),
                primary_err,
                self.fallback.display(),
                e
            ))),
        }
    }
}

// == Artwork Cache ==
/// Shared entry point for acquiring artwork.
///
/// Cheap to clone; clones share the index, the fetcher and the in-flight map.
#[derive(Clone)]
pub struct ArtworkCache {
    index: Arc<RwLock<CacheIndex>>,
    fetcher: Arc<dyn ImageFetcher>,
    dirs: CacheDirs,
    /// Per-key gates; concurrent acquires of one key share a single fetch
    in_flight: Arc<std::sync::Mutex<GateMap>>,
}

type GateMap = HashMap<String, Arc<Mutex<()>>>;

// == In-Flight Slot ==
/// Membership of one acquire in a key's gate.
///
/// Dropping the slot releases the key, including when the acquire future is
/// cancelled mid-fetch.
struct InFlightSlot {
    in_flight: Arc<std::sync::Mutex<GateMap>>,
    key: String,
    gate: Arc<Mutex<()>>,
}

impl InFlightSlot {
    fn join(in_flight: &Arc<std::sync::Mutex<GateMap>>, key: &str) -> Self {
        let gate = in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(key.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        Self {
            in_flight: in_flight.clone(),
            key: key.to_string(),
            gate,
        }
    }
}

impl Drop for InFlightSlot {
    fn drop(&mut self) {
        let mut in_flight = self.in_flight.lock().unwrap_or_else(PoisonError::into_inner);
        // One reference in the map, one held here: nobody else is waiting
        if Arc::strong_count(&self.gate) <= 2 {
            in_flight.remove(&self.key);
        }
    }
}

impl ArtworkCache {
    // == Constructor ==
    /// Wraps an index (already loaded) and a fetcher.
    pub fn new(index: CacheIndex, fetcher: Arc<dyn ImageFetcher>, dirs: CacheDirs) -> Self {
        Self {
            index: Arc::new(RwLock::new(index)),
            fetcher,
            dirs,
            in_flight: Arc::new(std::sync::Mutex::new(HashMap::new())),
        }
    }

    /// Shared handle to the index, for housekeeping tasks.
    pub fn index(&self) -> Arc<RwLock<CacheIndex>> {
        self.index.clone()
    }

    /// Expiry and grace windows applied by the index.
    pub async fn policy(&self) -> CachePolicy {
        *self.index.read().await.policy()
    }

    // == Acquire ==
    /// Returns a local file path for `url`, downloading it if needed.
    ///
    /// Every failure is recorded in the index before it is returned, so a
    /// repeated call inside the grace window fails without network I/O.
    pub async fn acquire(&self, url: &str) -> Result<String> {
        if let Some(result) = self.check_index(url).await {
            return result;
        }

        let slot = InFlightSlot::join(&self.in_flight, &derive_key(url).key);
        let _permit = slot.gate.lock().await;

        // Another caller may have finished this key while we waited
        match self.check_index_quiet(url).await {
            Some(result) => result,
            None => self.fetch_and_record(url).await,
        }
    }

    async fn check_index(&self, url: &str) -> Option<Result<String>> {
        let lookup = self.index.write().await.lookup(url);
        Self::resolve_lookup(url, lookup)
    }

    /// Like `check_index` but without touching the lookup counters.
    async fn check_index_quiet(&self, url: &str) -> Option<Result<String>> {
        let lookup = self.index.read().await.peek(url);
        Self::resolve_lookup(url, lookup)
    }

    fn resolve_lookup(url: &str, lookup: Lookup) -> Option<Result<String>> {
        match lookup {
            Lookup::Hit(handle) => {
                debug!("Image cache hit: {}", url);
                Some(Ok(handle))
            }
            Lookup::Suppressed(reason) => {
                debug!("Image recently failed, not retrying: {}", url);
                Some(Err(ArtworkError::RecentlyFailed {
                    url: url.to_string(),
                    reason,
                }))
            }
            Lookup::Miss => None,
        }
    }

    async fn fetch_and_record(&self, url: &str) -> Result<String> {
        let provider = Provider::from_url(url);
        info!("Downloading image [{}]: {}", provider, url);

        match self.fetch_and_store(url).await {
            Ok(handle) => {
                self.index
                    .write()
                    .await
                    .put(url, CacheEntry::success(url, handle.clone()))
                    .await;
                info!("Image cached [{}]: {}", provider, url);
                Ok(handle)
            }
            Err(e) => {
                warn!("Image fetch failed [{}]: {}", provider, e);
                self.index
                    .write()
                    .await
                    .put(url, CacheEntry::failure(url, e.to_string()))
                    .await;
                Err(e)
            }
        }
    }

    async fn fetch_and_store(&self, url: &str) -> Result<String> {
        let status = self.fetcher.check(url).await?;
        if !(200..300).contains(&status) {
            return Err(ArtworkError::Unreachable {
                url: url.to_string(),
                status: Some(status),
            });
        }

        let dir = self.dirs.ensure().await?;
        let dest = dir.join(derive_key(url).file_name());

        let download = self.fetcher.download(url, &dest).await?;
        if !download.is_success() {
            return Err(ArtworkError::DownloadFailed {
                url: url.to_string(),
                status: Some(download.status),
                reason: "non-success status".to_string(),
            });
        }

        if download.bytes == 0 {
            discard_file(&download.path).await;
            return Err(ArtworkError::DownloadFailed {
                url: url.to_string(),
                status: Some(download.status),
                reason: "empty body".to_string(),
            });
        }

        Ok(download.path.to_string_lossy().into_owned())
    }

    // == Maintenance ==
    /// Removes expired entries and stale failures. Returns how many were removed.
    pub async fn cleanup(&self) -> usize {
        self.index.write().await.cleanup().await
    }

    /// Forgets every entry and deletes downloaded files.
    pub async fn clear(&self) {
        let mut index = self.index.write().await;
        for handle in index.local_handles() {
            discard_file(Path::new(&handle)).await;
        }
        index.clear().await;
    }

    pub async fn stats(&self) -> CacheStats {
        self.index.read().await.stats()
    }

    pub async fn is_valid(&self, url: &str) -> bool {
        self.index.read().await.is_valid(url)
    }

    /// Number of keys with a fetch currently in progress or awaited.
    pub fn in_flight(&self) -> usize {
        self.in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

async fn discard_file(path: &Path) {
    if let Err(e) = tokio::fs::remove_file(path).await {
        if e.kind() != std::io::ErrorKind::NotFound {
            warn!("Failed to remove cached file {}: {}", path.display(), e);
        }
    }
}
