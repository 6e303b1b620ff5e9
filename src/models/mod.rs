//! Request and Response models for the artwork service API
//!
//! This module defines the DTOs (Data Transfer Objects) used for
//! serializing/deserializing HTTP request and response bodies.

pub mod requests;
pub mod responses;

// Re-export commonly used types
pub use requests::{AcquireRequest, FallbackQuery, ResolveRequest, RetryQuery};
pub use responses::{
    AcquireResponse, FallbackResponse, HealthResponse, MaintenanceResponse, ResolveResponse,
    RetryResponse, StatsResponse,
};
