//! API Handlers
//!
//! HTTP request handlers for each artwork service endpoint.

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    Json,
};

use crate::engine::ArtworkCache;
use crate::error::{ArtworkError, Result};
use crate::fallback::{resolve_default, GENERIC_ICON};
use crate::models::{
    AcquireRequest, AcquireResponse, FallbackQuery, FallbackResponse, HealthResponse,
    MaintenanceResponse, ResolveRequest, ResolveResponse, RetryQuery, RetryResponse,
    StatsResponse,
};
use crate::resolver::CardImageResolver;

/// Application state shared across all handlers.
///
/// The cache is cheap to clone; the resolver owns the per-session card states.
#[derive(Clone)]
pub struct AppState {
    pub cache: ArtworkCache,
    pub resolver: Arc<CardImageResolver>,
}

impl AppState {
    /// Creates a new AppState around a resolver, sharing its cache.
    pub fn new(resolver: CardImageResolver) -> Self {
        Self {
            cache: resolver.cache().clone(),
            resolver: Arc::new(resolver),
        }
    }
}

/// Handler for POST /acquire
///
/// Returns the local handle for a remote artwork URL, downloading it on a miss.
pub async fn acquire_handler(
    State(state): State<AppState>,
    Json(req): Json<AcquireRequest>,
) -> Result<Json<AcquireResponse>> {
    if let Some(error_msg) = req.validate() {
        return Err(ArtworkError::InvalidRequest(error_msg));
    }

    let url = req.url.trim();
    let handle = state.cache.acquire(url).await?;

    Ok(Json(AcquireResponse::new(url, handle)))
}

/// Handler for POST /resolve
///
/// Resolves what to draw for a card. Never fails once the request is valid.
pub async fn resolve_handler(
    State(state): State<AppState>,
    Json(req): Json<ResolveRequest>,
) -> Result<Json<ResolveResponse>> {
    if let Some(error_msg) = req.validate() {
        return Err(ArtworkError::InvalidRequest(error_msg));
    }

    let card = req.into_card();
    let image = state.resolver.resolve(&card).await;

    Ok(Json(ResolveResponse { id: card.id, image }))
}

/// Handler for POST /resolve/failure
///
/// Reports that a cached image could not be displayed for a card.
pub async fn render_failure_handler(
    State(state): State<AppState>,
    Json(req): Json<ResolveRequest>,
) -> Result<Json<ResolveResponse>> {
    if let Some(error_msg) = req.validate() {
        return Err(ArtworkError::InvalidRequest(error_msg));
    }

    let card = req.into_card();
    let image = state.resolver.report_render_failure(&card).await;

    Ok(Json(ResolveResponse { id: card.id, image }))
}

/// Handler for GET /fallback
pub async fn fallback_handler(Query(query): Query<FallbackQuery>) -> Json<FallbackResponse> {
    let category = query.category();
    let asset = resolve_default(category, query.url.as_deref());
    let icon = category.map_or(GENERIC_ICON, |c| c.icon());

    Json(FallbackResponse { asset, icon })
}

/// Handler for GET /retry
pub async fn retry_handler(
    State(state): State<AppState>,
    Query(query): Query<RetryQuery>,
) -> Json<RetryResponse> {
    let should_retry = state.resolver.retry_policy().should_auto_retry(&query.url);

    Json(RetryResponse {
        url: query.url,
        should_retry,
    })
}

/// Handler for POST /cleanup
///
/// Runs housekeeping immediately instead of waiting for the background task.
pub async fn cleanup_handler(State(state): State<AppState>) -> Json<MaintenanceResponse> {
    let removed = state.cache.cleanup().await;
    state.resolver.prune().await;
    Json(MaintenanceResponse::cleaned(removed))
}

/// Handler for DELETE /cache
pub async fn clear_handler(State(state): State<AppState>) -> Json<MaintenanceResponse> {
    state.cache.clear().await;
    state.resolver.reset().await;
    Json(MaintenanceResponse::cleared())
}

/// Handler for GET /stats
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    Json(StatsResponse::from(state.cache.stats().await))
}

/// Handler for GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}
