//! Cache Statistics Module
//!
//! Tracks lookups, downloads, failures and evictions.

use serde::Serialize;

// == Cache Stats ==
/// Tracks cache activity counters.
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct CacheStats {
    /// Lookups answered with a usable local file
    pub hits: u64,
    /// Lookups that required a network fetch
    pub misses: u64,
    /// Lookups short-circuited by a recent failure
    pub suppressed: u64,
    /// Artwork files downloaded and recorded
    pub downloads: u64,
    /// Fetch attempts recorded as failed
    pub failures: u64,
    /// Entries removed by cleanup
    pub evictions: u64,
    /// Current number of entries in the index
    pub total_entries: usize,
    /// Current number of failed entries in the index
    pub failed_entries: usize,
}

impl CacheStats {
    // == Constructor ==
    /// Creates a new CacheStats with all counters at zero.
    pub fn new() -> Self {
        Self::default()
    }

    // == Hit Rate ==
    /// Returns hits / (hits + misses), or 0.0 if nothing was looked up.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }

    // == Recording ==
    /// Records a lookup answered from a local file.
    pub fn record_hit(&mut self) {
        self.hits += 1;
    }

    /// Records a lookup that needed a network fetch.
    pub fn record_miss(&mut self) {
        self.misses += 1;
    }

    /// Records a lookup short-circuited by a recent failure.
    pub fn record_suppressed(&mut self) {
        self.suppressed += 1;
    }

    /// Records a successful download.
    pub fn record_download(&mut self) {
        self.downloads += 1;
    }

    /// Records a failed fetch attempt.
    pub fn record_failure(&mut self) {
        self.failures += 1;
    }

    /// Records entries removed by cleanup.
    pub fn record_evictions(&mut self, count: usize) {
        self.evictions += count as u64;
    }

    // == Gauges ==
    /// Updates the entry gauges.
    pub fn set_entry_counts(&mut self, total: usize, failed: usize) {
        self.total_entries = total;
        self.failed_entries = failed;
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_new() {
        let stats = CacheStats::new();
        assert_eq!(stats, CacheStats::default());
        assert_eq!(stats.hit_rate(), 0.0);
    }

    #[test]
    fn test_hit_rate_mixed() {
        let mut stats = CacheStats::new();
        stats.record_hit();
        stats.record_hit();
        stats.record_hit();
        stats.record_miss();
        assert_eq!(stats.hit_rate(), 0.75);
    }

    #[test]
    fn test_suppressed_lookups_do_not_count_as_misses() {
        let mut stats = CacheStats::new();
        stats.record_suppressed();
        stats.record_hit();
        assert_eq!(stats.suppressed, 1);
        assert_eq!(stats.hit_rate(), 1.0);
    }

    #[test]
    fn test_record_evictions() {
        let mut stats = CacheStats::new();
        stats.record_evictions(3);
        stats.record_evictions(2);
        assert_eq!(stats.evictions, 5);
    }

    #[test]
    fn test_set_entry_counts() {
        let mut stats = CacheStats::new();
        stats.set_entry_counts(42, 7);
        assert_eq!(stats.total_entries, 42);
        assert_eq!(stats.failed_entries, 7);
    }
}
