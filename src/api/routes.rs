//! API Routes
//!
//! Configures the Axum router with all artwork service endpoints.

use axum::{
    routing::{delete, get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{
    acquire_handler, cleanup_handler, clear_handler, fallback_handler, health_handler,
    render_failure_handler, resolve_handler, retry_handler, stats_handler, AppState,
};

/// Creates the main router with all endpoints configured.
///
/// # Middleware
/// - CORS: Allows any origin
/// - Tracing: Logs all requests
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/acquire", post(acquire_handler))
        .route("/resolve", post(resolve_handler))
        .route("/resolve/failure", post(render_failure_handler))
        .route("/fallback", get(fallback_handler))
        .route("/retry", get(retry_handler))
        .route("/cleanup", post(cleanup_handler))
        .route("/cache", delete(clear_handler))
        .route("/stats", get(stats_handler))
        .route("/health", get(health_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{CacheIndex, CachePolicy};
    use crate::engine::{ArtworkCache, CacheDirs};
    use crate::error::{ArtworkError, Result};
    use crate::fetch::{Download, ImageFetcher};
    use crate::lookup::NoLookup;
    use crate::resolver::CardImageResolver;
    use crate::retry::RetryPolicy;
    use crate::storage::MemoryStore;
    use async_trait::async_trait;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use std::path::Path;
    use std::sync::Arc;
    use tower::util::ServiceExt;

    struct DownFetcher;

    #[async_trait]
    impl ImageFetcher for DownFetcher {
        async fn check(&self, url: &str) -> Result<u16> {
            Err(ArtworkError::Unreachable {
                url: url.to_string(),
                status: None,
            })
        }

        async fn download(&self, _url: &str, dest: &Path) -> Result<Download> {
            Ok(Download {
                status: 500,
                path: dest.to_path_buf(),
                bytes: 0,
            })
        }
    }

    fn create_test_app() -> Router {
        let index = CacheIndex::new(Arc::new(MemoryStore::new()), CachePolicy::default());
        let cache = ArtworkCache::new(
            index,
            Arc::new(DownFetcher),
            CacheDirs::new("/nonexistent/image_cache", "/nonexistent/img_cache"),
        );
        let resolver = CardImageResolver::new(cache, RetryPolicy::disabled(), Arc::new(NoLookup));
        create_router(AppState::new(resolver))
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        let app = create_test_app();

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_stats_endpoint() {
        let app = create_test_app();

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/stats")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_acquire_unreachable_is_bad_gateway() {
        let app = create_test_app();

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/acquire")
                    .header("content-type", "application/json")
                    .body(Body::from(r#"{"url":"https://i.scdn.co/image/abc"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    }

    #[tokio::test]
    async fn test_acquire_invalid_url_is_bad_request() {
        let app = create_test_app();

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/acquire")
                    .header("content-type", "application/json")
                    .body(Body::from(r#"{"url":"not a url"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_fallback_endpoint() {
        let app = create_test_app();

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/fallback?category=Musique")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_clear_endpoint() {
        let app = create_test_app();

        let response = app
            .oneshot(
                Request::builder()
                    .method("DELETE")
                    .uri("/cache")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }
}
