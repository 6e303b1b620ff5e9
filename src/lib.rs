//! Artwork Cache - image acquisition and caching for media cards
//!
//! Downloads remote artwork once, remembers recent failures, and picks a
//! bundled placeholder when nothing can be shown.

pub mod api;
pub mod cache;
pub mod config;
pub mod engine;
pub mod error;
pub mod fallback;
pub mod fetch;
pub mod lookup;
pub mod models;
pub mod resolver;
pub mod retry;
pub mod storage;
pub mod tasks;
pub mod youtube;

pub use api::{create_router, AppState};
pub use cache::{derive_key, CacheEntry, CacheIndex, CachePolicy, CacheStats, Provider};
pub use config::Config;
pub use engine::{ArtworkCache, CacheDirs};
pub use error::{ArtworkError, Result};
pub use fallback::{resolve_default, Asset, Category};
pub use fetch::{HttpFetcher, ImageFetcher};
pub use lookup::{MetadataLookup, SpotifyOEmbedLookup};
pub use resolver::{Card, CardImageResolver, ResolvedImage};
pub use retry::{RetryPolicy, SpotifyCredentials};
pub use storage::{JsonFileStore, KeyValueStore, MemoryStore};
pub use tasks::spawn_cleanup_task;
