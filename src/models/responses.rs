//! Response DTOs for the artwork service API
//!
//! Defines the structure of outgoing HTTP response bodies.

use serde::Serialize;

use crate::cache::CacheStats;
use crate::fallback::Asset;
use crate::resolver::ResolvedImage;

/// Response body for POST /acquire
#[derive(Debug, Clone, Serialize)]
pub struct AcquireResponse {
    /// The requested URL
    pub url: String,
    /// Local path of the cached artwork
    pub local_handle: String,
}

impl AcquireResponse {
    pub fn new(url: impl Into<String>, local_handle: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            local_handle: local_handle.into(),
        }
    }
}

/// Response body for POST /resolve
#[derive(Debug, Clone, Serialize)]
pub struct ResolveResponse {
    pub id: String,
    #[serde(flatten)]
    pub image: ResolvedImage,
}

/// Response body for GET /fallback
#[derive(Debug, Clone, Serialize)]
pub struct FallbackResponse {
    pub asset: Asset,
    pub icon: &'static str,
}

/// Response body for GET /retry
#[derive(Debug, Clone, Serialize)]
pub struct RetryResponse {
    pub url: String,
    pub should_retry: bool,
}

/// Response body for POST /cleanup and DELETE /cache
#[derive(Debug, Clone, Serialize)]
pub struct MaintenanceResponse {
    /// Success message
    pub message: String,
    /// Entries removed, when known
    #[serde(skip_serializing_if = "Option::is_none")]
    pub removed: Option<usize>,
}

impl MaintenanceResponse {
    pub fn cleaned(removed: usize) -> Self {
        Self {
            message: format!("Removed {} cache entries", removed),
            removed: Some(removed),
        }
    }

    pub fn cleared() -> Self {
        Self {
            message: "Image cache cleared".to_string(),
            removed: None,
        }
    }
}

/// Response body for the stats endpoint (GET /stats)
#[derive(Debug, Clone, Serialize)]
pub struct StatsResponse {
    #[serde(flatten)]
    pub stats: CacheStats,
    /// Hit rate (hits / (hits + misses))
    pub hit_rate: f64,
}

impl From<CacheStats> for StatsResponse {
    fn from(stats: CacheStats) -> Self {
        let hit_rate = stats.hit_rate();
        Self { stats, hit_rate }
    }
}

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fallback::GENERIC_ASSET;

    #[test]
    fn test_acquire_response_serialize() {
        let resp = AcquireResponse::new("https://example.com/a.jpg", "/cache/a.jpg");
        let json = serde_json::to_value(&resp).unwrap();
        assert_eq!(json["local_handle"], "/cache/a.jpg");
    }

    #[test]
    fn test_resolve_response_flattens_image() {
        let resp = ResolveResponse {
            id: "7".to_string(),
            image: ResolvedImage::Fallback {
                asset: GENERIC_ASSET,
                icon: "help-circle",
            },
        };
        let json = serde_json::to_value(&resp).unwrap();
        assert_eq!(json["id"], "7");
        assert_eq!(json["source"], "fallback");
        assert_eq!(json["asset"]["file_name"], "logo.jpg");
    }

    #[test]
    fn test_stats_response_hit_rate() {
        let mut stats = CacheStats::new();
        for _ in 0..4 {
            stats.record_hit();
        }
        stats.record_miss();

        let resp = StatsResponse::from(stats);
        assert!((resp.hit_rate - 0.8).abs() < 0.001);

        let json = serde_json::to_value(&resp).unwrap();
        assert_eq!(json["hits"], 4);
    }

    #[test]
    fn test_maintenance_responses() {
        let json = serde_json::to_value(MaintenanceResponse::cleaned(3)).unwrap();
        assert_eq!(json["removed"], 3);

        let json = serde_json::to_value(MaintenanceResponse::cleared()).unwrap();
        assert!(json.get("removed").is_none());
    }

    #[test]
    fn test_health_response_serialize() {
        let resp = HealthResponse::healthy();
        let json = serde_json::to_string(&resp).unwrap();
        assert!(json.contains("healthy"));
        assert!(json.contains("timestamp"));
    }
}
