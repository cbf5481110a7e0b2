//! Service banner and health check handlers.

use axum::Json;
use chrono::Utc;
use serde::Serialize;

/// Root banner response.
#[derive(Serialize)]
pub struct RootResponse {
    pub message: String,
}

/// Service banner endpoint.
pub async fn root() -> Json<RootResponse> {
    Json(RootResponse {
        message: "AI Coach Backend is running".to_string(),
    })
}

/// Health response.
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: String,
}

/// Health check endpoint (liveness probe).
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: Utc::now().to_rfc3339(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_root_banner_message() {
        let Json(body) = root().await;
        assert_eq!(body.message, "AI Coach Backend is running");
    }

    #[tokio::test]
    async fn test_health_reports_healthy() {
        let Json(body) = health().await;
        assert_eq!(body.status, "healthy");
        assert!(!body.version.is_empty());
    }
}
