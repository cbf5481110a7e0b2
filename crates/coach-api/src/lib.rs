//! Axum HTTP API server.
//!
//! This crate provides:
//! - The process-video orchestration endpoint
//! - Mock-mode fallback when no Gemini key is configured
//! - Request logging, CORS, and Prometheus metrics

pub mod config;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod routes;
pub mod state;
pub mod upload;

pub use config::ApiConfig;
pub use error::{ApiError, ApiResult};
pub use routes::create_router;
pub use state::AppState;
pub use upload::StoredUpload;
