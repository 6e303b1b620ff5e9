//! Property-Based Tests for Cache Module
//!
//! Uses proptest to check key derivation, index bookkeeping, entry windows,
//! fallback resolution and error bodies over generated inputs.

use proptest::prelude::*;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use crate::cache::{
    derive_key, CacheEntry, CacheIndex, CachePolicy, Lookup, DEFAULT_EXTENSION,
    MAX_EXTENSION_LEN,
};
use crate::fallback::{resolve_default, Category, GENERIC_ASSET};
use crate::storage::MemoryStore;

// == Test Configuration ==
const HOUR_MS: i64 = 60 * 60 * 1000;

// == Strategies ==
/// Generates artwork-like URLs across known and unknown hosts
fn url_strategy() -> impl Strategy<Value = String> {
    (
        prop::sample::select(vec![
            "https://image.tmdb.org/t/p/w500",
            "https://i.scdn.co/image",
            "https://i.ytimg.com/vi",
            "https://is1-ssl.mzstatic.com/image",
            "https://example.com",
        ]),
        "[a-zA-Z0-9_-]{1,24}",
        prop::option::of("\\.[a-zA-Z0-9]{1,8}"),
        prop::option::of("\\?[a-z]{1,5}=[a-z0-9.]{1,8}"),
    )
        .prop_map(|(base, name, ext, query)| {
            format!(
                "{}/{}{}{}",
                base,
                name,
                ext.unwrap_or_default(),
                query.unwrap_or_default()
            )
        })
}

/// Generates a sequence of index operations over a small URL pool
#[derive(Debug, Clone)]
enum IndexOp {
    PutSuccess { url: usize },
    PutFailure { url: usize },
    Lookup { url: usize },
}

fn index_op_strategy() -> impl Strategy<Value = IndexOp> {
    prop_oneof![
        (0usize..6).prop_map(|url| IndexOp::PutSuccess { url }),
        (0usize..6).prop_map(|url| IndexOp::PutFailure { url }),
        (0usize..6).prop_map(|url| IndexOp::Lookup { url }),
    ]
}

fn pool_url(idx: usize) -> String {
    format!("https://image.tmdb.org/t/p/w500/poster{}.jpg", idx)
}

fn category_strategy() -> impl Strategy<Value = Option<Category>> {
    prop::option::of(prop::sample::select(Category::ALL.to_vec()))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    // Same URL, same key; every key is 32 lowercase hex characters.
    #[test]
    fn prop_key_is_deterministic_and_fixed_length(url in ".{0,300}") {
        let first = derive_key(&url);
        let second = derive_key(&url);

        prop_assert_eq!(&first, &second);
        prop_assert_eq!(first.key.len(), 32);
        prop_assert!(first.key.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    // File names never escape the cache directory and always carry a short extension.
    #[test]
    fn prop_file_name_is_filesystem_safe(url in ".{0,300}") {
        let derived = derive_key(&url);
        let file_name = derived.file_name();

        prop_assert!(!file_name.contains('/'));
        prop_assert!(!file_name.contains('\\'));
        prop_assert!(!derived.extension.is_empty());
        prop_assert!(derived.extension.len() <= MAX_EXTENSION_LEN);
        prop_assert!(derived.extension.chars().all(|c| c.is_ascii_alphanumeric()));
    }

    // A short alphanumeric suffix is kept; anything else becomes the default.
    #[test]
    fn prop_extension_follows_last_segment(url in url_strategy()) {
        let path = url.split('?').next().unwrap_or_default();
        let segment = path.rsplit('/').next().unwrap_or_default();
        let expected = match segment.rsplit_once('.') {
            Some((_, ext)) if (1..=MAX_EXTENSION_LEN).contains(&ext.len()) => ext,
            _ => DEFAULT_EXTENSION,
        };

        prop_assert_eq!(derive_key(&url).extension, expected);
    }

    // Distinct generated URLs do not collide in practice.
    #[test]
    fn prop_distinct_urls_get_distinct_keys(a in url_strategy(), b in url_strategy()) {
        prop_assume!(a != b);
        prop_assert_ne!(derive_key(&a).key, derive_key(&b).key);
    }

    // resolve_default always yields an asset, and the category always wins.
    #[test]
    fn prop_fallback_is_total(category in category_strategy(), url in prop::option::of(".{0,120}")) {
        let asset = resolve_default(category, url.as_deref());

        prop_assert!(!asset.file_name.is_empty());
        match category {
            Some(category) => {
                prop_assert_eq!(asset, category.default_asset());
            }
            None if url.as_deref().map_or(true, str::is_empty) => {
                prop_assert_eq!(asset, GENERIC_ASSET);
            }
            None => {}
        }
    }

    // Lookup classification and counters follow the last write per URL.
    #[test]
    fn prop_index_tracks_last_write(ops in prop::collection::vec(index_op_strategy(), 1..60)) {
        let rt = tokio::runtime::Runtime::new().unwrap();

        rt.block_on(async {
            let mut index = CacheIndex::new(Arc::new(MemoryStore::new()), CachePolicy::default());
            let mut model: HashMap<usize, bool> = HashMap::new();
            let (mut hits, mut misses, mut suppressed) = (0u64, 0u64, 0u64);
            let (mut downloads, mut failures) = (0u64, 0u64);

            for op in ops {
                match op {
                    IndexOp::PutSuccess { url } => {
                        let u = pool_url(url);
                        index.put(&u, CacheEntry::success(&u, format!("/cache/{}.jpg", url))).await;
                        model.insert(url, true);
                        downloads += 1;
                    }
                    IndexOp::PutFailure { url } => {
                        let u = pool_url(url);
                        index.put(&u, CacheEntry::failure(&u, "HTTP 404")).await;
                        model.insert(url, false);
                        failures += 1;
                    }
                    IndexOp::Lookup { url } => {
                        let outcome = index.lookup(&pool_url(url));
                        match model.get(&url) {
                            Some(true) => {
                                prop_assert!(matches!(outcome, Lookup::Hit(_)));
                                hits += 1;
                            }
                            Some(false) => {
                                prop_assert!(matches!(outcome, Lookup::Suppressed(_)));
                                suppressed += 1;
                            }
                            None => {
                                prop_assert_eq!(outcome, Lookup::Miss);
                                misses += 1;
                            }
                        }
                    }
                }
            }

            let stats = index.stats();
            prop_assert_eq!(stats.hits, hits);
            prop_assert_eq!(stats.misses, misses);
            prop_assert_eq!(stats.suppressed, suppressed);
            prop_assert_eq!(stats.downloads, downloads);
            prop_assert_eq!(stats.failures, failures);
            prop_assert_eq!(index.len(), model.len());
            prop_assert_eq!(stats.total_entries, model.len());
            prop_assert_eq!(stats.failed_entries, model.values().filter(|ok| !**ok).count());
            Ok::<(), TestCaseError>(())
        })?;
    }

    // Success entries stay usable until the expiry window; failures suppress
    // retries until the grace window.
    #[test]
    fn prop_entry_windows(
        expiry_hours in 1i64..2000,
        grace_hours in 1i64..100,
        age_ms in 0i64..(2100 * HOUR_MS),
    ) {
        let policy = CachePolicy {
            expiry: Duration::from_millis((expiry_hours * HOUR_MS) as u64),
            failure_grace: Duration::from_millis((grace_hours * HOUR_MS) as u64),
        };
        let now = 10_000 * HOUR_MS;
        let url = "https://i.scdn.co/image/ab67616d0000b273";

        let success = CacheEntry::success(url, "/cache/a.jpg".to_string())
            .with_timestamp(now - age_ms);
        prop_assert_eq!(success.is_usable(now, &policy), age_ms < expiry_hours * HOUR_MS);

        let failure = CacheEntry::failure(url, "HTTP 500").with_timestamp(now - age_ms);
        prop_assert!(!failure.is_usable(now, &policy));
        prop_assert_eq!(failure.suppresses_retry(now, &policy), age_ms < grace_hours * HOUR_MS);
        prop_assert_eq!(
            failure.is_evictable(now, &policy),
            !failure.suppresses_retry(now, &policy) || failure.is_expired(now, &policy)
        );
    }

    // Every error variant produces a JSON body with a string "error" field.
    #[test]
    fn prop_error_response_format(
        detail in "[a-zA-Z0-9 _-]{1,100}",
        status in prop::option::of(400u16..600),
    ) {
        use crate::error::ArtworkError;
        use axum::body::to_bytes;
        use axum::response::IntoResponse;

        let url = "https://image.tmdb.org/t/p/w500/abc123.jpg".to_string();
        let error_variants = vec![
            ArtworkError::Unreachable { url: url.clone(), status },
            ArtworkError::DownloadFailed { url: url.clone(), status, reason: detail.clone() },
            ArtworkError::RecentlyFailed { url, reason: detail.clone() },
            ArtworkError::Storage(detail.clone()),
            ArtworkError::HttpClient(detail.clone()),
            ArtworkError::Persistence(detail.clone()),
            ArtworkError::InvalidRequest(detail.clone()),
        ];

        let rt = tokio::runtime::Runtime::new().unwrap();
        for error in error_variants {
            let expected_msg = error.to_string();
            let expected_status = error.remote_status();
            let response = error.into_response();

            let content_type = response.headers()
                .get("content-type")
                .and_then(|v| v.to_str().ok());
            prop_assert!(
                content_type.map(|ct| ct.contains("application/json")).unwrap_or(false),
                "Response should have JSON content-type"
            );

            let bytes = rt.block_on(async {
                to_bytes(response.into_body(), usize::MAX).await.unwrap()
            });
            let json: serde_json::Value = serde_json::from_slice(&bytes)
                .expect("Response body should be valid JSON");

            prop_assert_eq!(json["error"].as_str(), Some(expected_msg.as_str()));
            prop_assert_eq!(json["remote_status"].as_u64(), expected_status.map(u64::from));
        }
    }
}
