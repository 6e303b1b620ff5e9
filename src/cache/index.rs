//! Cache Index Module
//!
//! Persisted map from cache key to the outcome of the last fetch of that URL.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::cache::{current_timestamp_ms, derive_key, CacheEntry, CachePolicy, CacheStats};
use crate::storage::KeyValueStore;

/// Storage key the serialized index lives under.
pub const INDEX_STORAGE_KEY: &str = "image_cache";

// == Lookup ==
/// Result of consulting the index before fetching.
#[derive(Debug, Clone, PartialEq)]
pub enum Lookup {
    /// A usable local file exists
    Hit(String),
    /// A recent attempt failed; carries its error message
    Suppressed(String),
    /// Nothing usable; the caller should fetch
    Miss,
}

// == Cache Index ==
/// In-memory index mirrored to a key-value store.
///
/// The in-memory map is authoritative. Every mutation is followed by a full
/// rewrite of the persisted form; persistence failures are logged and never
/// returned.
pub struct CacheIndex {
    entries: HashMap<String, CacheEntry>,
    backing: Arc<dyn KeyValueStore>,
    policy: CachePolicy,
    stats: CacheStats,
}

impl CacheIndex {
    // == Constructor ==
    /// Creates an empty index. Call [`CacheIndex::load`] to read persisted state.
    pub fn new(backing: Arc<dyn KeyValueStore>, policy: CachePolicy) -> Self {
        Self {
            entries: HashMap::new(),
            backing,
            policy,
            stats: CacheStats::new(),
        }
    }

    // == Accessors ==
    /// Expiry and grace windows this index applies.
    pub fn policy(&self) -> &CachePolicy {
        &self.policy
    }

    // == Load ==
    /// Replaces the in-memory map with the persisted one, minus expired entries.
    ///
    /// Unreadable or unparseable data leaves the index empty.
    pub async fn load(&mut self) {
        self.entries.clear();

        let raw = match self.backing.get(INDEX_STORAGE_KEY).await {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                debug!("No persisted image cache found");
                return;
            }
            Err(e) => {
                warn!("Failed to read image cache, starting empty: {}", e);
                return;
            }
        };

        let persisted: HashMap<String, CacheEntry> = match serde_json::from_str(&raw) {
            Ok(persisted) => persisted,
            Err(e) => {
                warn!("Discarding unparseable image cache: {}", e);
                return;
            }
        };

        let now = current_timestamp_ms();
        let total = persisted.len();
        self.entries = persisted
            .into_iter()
            .filter(|(_, entry)| !entry.is_expired(now, &self.policy))
            .collect();

        self.refresh_gauges();
        info!(
            "Image cache loaded: {} entries ({} expired dropped)",
            self.entries.len(),
            total - self.entries.len()
        );
    }

    // == Save ==
    /// Writes the whole map to the backing store.
    pub async fn save(&self) {
        let serialized = match serde_json::to_string(&self.entries) {
            Ok(serialized) => serialized,
            Err(e) => {
                warn!("Failed to serialize image cache: {}", e);
                return;
            }
        };

        if let Err(e) = self.backing.set(INDEX_STORAGE_KEY, &serialized).await {
            warn!("Failed to persist image cache: {}", e);
        }
    }

    // == Queries ==
    /// True when a fresh, successful entry exists for `url`.
    pub fn is_valid(&self, url: &str) -> bool {
        let now = current_timestamp_ms();
        self.entry(url)
            .map(|entry| entry.is_usable(now, &self.policy))
            .unwrap_or(false)
    }

    /// Local handle for `url` if the entry is valid.
    pub fn get(&self, url: &str) -> Option<String> {
        let now = current_timestamp_ms();
        self.entry(url)
            .filter(|entry| entry.is_usable(now, &self.policy))
            .and_then(|entry| entry.local_handle.clone())
    }

    /// Raw entry for `url`, regardless of age.
    pub fn entry(&self, url: &str) -> Option<&CacheEntry> {
        self.entries.get(&derive_key(url).key)
    }

    /// Classifies `url` for the fetch engine without touching stats.
    pub fn peek(&self, url: &str) -> Lookup {
        let now = current_timestamp_ms();
        match self.entry(url) {
            Some(entry) if entry.is_usable(now, &self.policy) => match &entry.local_handle {
                Some(handle) => Lookup::Hit(handle.clone()),
                None => Lookup::Miss,
            },
            Some(entry) if entry.suppresses_retry(now, &self.policy) => Lookup::Suppressed(
                entry
                    .error_message
                    .clone()
                    .unwrap_or_else(|| "previous fetch failed".to_string()),
            ),
            _ => Lookup::Miss,
        }
    }

    /// Like [`CacheIndex::peek`], recording the outcome in stats.
    pub fn lookup(&mut self, url: &str) -> Lookup {
        let outcome = self.peek(url);
        match &outcome {
            Lookup::Hit(_) => self.stats.record_hit(),
            Lookup::Suppressed(_) => self.stats.record_suppressed(),
            Lookup::Miss => self.stats.record_miss(),
        }
        outcome
    }

    // == Put ==
    /// Inserts or overwrites the entry for `url`, then persists.
    pub async fn put(&mut self, url: &str, entry: CacheEntry) {
        if entry.failed {
            self.stats.record_failure();
        } else {
            self.stats.record_download();
        }

        self.entries.insert(derive_key(url).key, entry);
        self.refresh_gauges();
        self.save().await;
    }

    // == Cleanup ==
    /// Drops expired entries and failed entries past the grace window.
    ///
    /// Returns the number of entries removed.
    pub async fn cleanup(&mut self) -> usize {
        let now = current_timestamp_ms();
        let before = self.entries.len();
        let failed_before = self.entries.values().filter(|e| e.failed).count();

        let policy = self.policy;
        self.entries
            .retain(|_, entry| !entry.is_evictable(now, &policy));

        let removed = before - self.entries.len();
        let failed_removed = failed_before - self.entries.values().filter(|e| e.failed).count();
        self.stats.record_evictions(removed);
        self.refresh_gauges();
        self.save().await;

        info!(
            "Image cache cleaned: {} removed ({} failed)",
            removed, failed_removed
        );
        removed
    }

    // == Clear ==
    /// Empties the index and deletes its persisted form.
    pub async fn clear(&mut self) {
        self.entries.clear();
        self.refresh_gauges();

        if let Err(e) = self.backing.remove(INDEX_STORAGE_KEY).await {
            warn!("Failed to remove persisted image cache: {}", e);
        }
        info!("Image cache cleared");
    }

    /// Local handles of every successful entry.
    pub fn local_handles(&self) -> Vec<String> {
        self.entries
            .values()
            .filter_map(|entry| entry.local_handle.clone())
            .collect()
    }

    // == Stats ==
    /// Snapshot of the counters and entry gauges.
    pub fn stats(&self) -> CacheStats {
        self.stats.clone()
    }

    /// Number of entries, failed ones included.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when the index holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn refresh_gauges(&mut self) {
        let failed = self.entries.values().filter(|e| e.failed).count();
        self.stats.set_entry_counts(self.entries.len(), failed);
    }
}
