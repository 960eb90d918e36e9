//! API Request/Response Types

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tracing::error;

use crate::models::errors::AppError;

// ============================================
// Relay
// ============================================

/// Body of a successful relay
#[derive(Debug, Serialize)]
pub struct RelaySuccess {
    pub success: bool,
}

impl RelaySuccess {
    pub fn ok() -> Self {
        Self { success: true }
    }
}

/// Body of a failed relay; no indication of which stage failed
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

/// Every request-level failure becomes `500 {"error": message}`
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        error!(code = self.code_str(), "❌ Relay failed: {}", self.message);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorBody {
                error: self.message,
            }),
        )
            .into_response()
    }
}

// ============================================
// Health Check
// ============================================

#[derive(Debug, Serialize)]
pub struct HealthData {
    pub status: String,
    pub version: String,
    pub uptime_seconds: u64,
}
