//! Artwork Cache - HTTP front for the image acquisition service

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use artwork_cache::{
    create_router, spawn_cleanup_task, AppState, ArtworkCache, CacheDirs, CacheIndex,
    CardImageResolver, Config, HttpFetcher, JsonFileStore, MetadataLookup, RetryPolicy,
    SpotifyOEmbedLookup,
};

/// Main entry point for the artwork cache service.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from environment variables
/// 3. Load the persisted index, dropping expired entries
/// 4. Start background housekeeping task
/// 5. Start HTTP server on configured port
/// 6. Handle graceful shutdown on SIGINT/SIGTERM
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "artwork_cache=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting artwork cache service");

    let config = Config::from_env();
    info!(
        "Configuration loaded: root={}, expiry={}d, failure_grace={}h, port={}, cleanup_interval={}s",
        config.cache_root.display(),
        config.expiry_days,
        config.failure_grace_hours,
        config.server_port,
        config.cleanup_interval
    );

    let store = Arc::new(JsonFileStore::new(config.store_dir()));
    let mut index = CacheIndex::new(store, config.cache_policy());
    index.load().await;
    info!("Image cache index loaded with {} entries", index.len());

    let fetcher = Arc::new(HttpFetcher::new(config.http_timeout())?);
    let dirs = CacheDirs::new(config.primary_image_dir(), config.fallback_image_dir());
    let cache = ArtworkCache::new(index, fetcher, dirs);

    let retry = RetryPolicy::new(config.spotify_credentials());
    if !retry.is_enabled() {
        warn!("Spotify credentials not configured, automatic artwork retry disabled");
    }
    let lookup: Arc<dyn MetadataLookup> =
        Arc::new(SpotifyOEmbedLookup::new(config.http_timeout())?);
    let state = AppState::new(CardImageResolver::new(cache, retry, lookup));

    let cleanup_handle = spawn_cleanup_task(state.resolver.clone(), config.cleanup_interval);
    info!("Background housekeeping task started");

    let app = create_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(cleanup_handle))
        .await?;

    info!("Server shutdown complete");
    Ok(())
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM), then aborts housekeeping.
async fn shutdown_signal(cleanup_handle: tokio::task::JoinHandle<()>) {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating shutdown...");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating shutdown...");
        }
    }

    cleanup_handle.abort();
    warn!("Housekeeping task aborted");
}
