//! API Module
//!
//! HTTP handlers and routing for the artwork service REST API.
//!
//! # Endpoints
//! - `POST /acquire` - Local handle for a remote artwork URL
//! - `POST /resolve` - What to draw for a card
//! - `POST /resolve/failure` - Report that a card's image failed to render
//! - `GET /fallback` - Default asset for a category or URL
//! - `GET /retry` - Whether a link qualifies for an automatic retry
//! - `POST /cleanup` - Run housekeeping now
//! - `DELETE /cache` - Drop every entry and downloaded file
//! - `GET /stats` - Cache statistics
//! - `GET /health` - Health check endpoint

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
