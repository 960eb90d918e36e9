//! API Request Handlers
//!
//! `POST /` runs the whole relay: parse → geolocate → format → send.

use axum::{
    body::Bytes,
    extract::{Json, State},
    http::StatusCode,
    response::IntoResponse,
};
use std::sync::Arc;
use std::time::Instant;
use tracing::info;

use super::types::*;
use crate::core::formatter::MessageFormatter;
use crate::core::resolver::GeoResolver;
use crate::models::config::RelayConfig;
use crate::models::errors::{AppError, AppResult};
use crate::models::types::ClientReport;
use crate::providers::telegram::TelegramNotifier;

/// Shared application state
/// Read-only after startup; one instance serves every request.
pub struct AppState {
    pub config: RelayConfig,
    pub resolver: GeoResolver,
    pub formatter: MessageFormatter,
    pub notifier: TelegramNotifier,
    pub start_time: Instant,
}

impl AppState {
    pub fn new(config: RelayConfig) -> Self {
        let resolver = GeoResolver::with_endpoints(&config.providers, config.geo_timeout);
        let formatter = MessageFormatter::new(config.report_timezone);
        let notifier = TelegramNotifier::new(
            &config.telegram_api_url,
            config.credentials().ok(),
            config.telegram_timeout,
        );

        Self {
            config,
            resolver,
            formatter,
            notifier,
            start_time: Instant::now(),
        }
    }

    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }
}

// ============================================
// Relay
// ============================================

pub async fn relay_report(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Json<RelaySuccess>, AppError> {
    let start = Instant::now();
    process_report(&state, &body).await?;
    info!("📬 Report relayed in {}ms", start.elapsed().as_millis());
    Ok(Json(RelaySuccess::ok()))
}

async fn process_report(state: &AppState, body: &[u8]) -> AppResult<()> {
    let report: ClientReport = serde_json::from_slice(body).map_err(AppError::malformed_request)?;

    let geo = state.resolver.resolve(&report.ip).await;
    let message = state.formatter.format(&report, &geo);
    state.notifier.send(&message).await?;

    Ok(())
}

/// CORS pre-flight; headers come from the router layer
pub async fn preflight() -> StatusCode {
    StatusCode::NO_CONTENT
}

pub async fn method_not_allowed() -> impl IntoResponse {
    (StatusCode::METHOD_NOT_ALLOWED, "Method Not Allowed")
}

// ============================================
// Health Check
// ============================================

pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<HealthData> {
    Json(HealthData {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.uptime_seconds(),
    })
}
