//! Cache Module
//!
//! Key derivation, persisted index and provider tagging for downloaded artwork.

mod entry;
mod index;
mod key;
mod provider;
mod stats;

#[cfg(test)]
mod property_tests;

// Re-export public types
pub use entry::{current_timestamp_ms, CacheEntry, CachePolicy};
pub use index::{CacheIndex, Lookup, INDEX_STORAGE_KEY};
pub use key::{derive_key, DerivedKey, DEFAULT_EXTENSION, MAX_EXTENSION_LEN};
pub use provider::Provider;
pub use stats::CacheStats;
