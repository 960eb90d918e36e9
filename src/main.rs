//! Visitor Relay Server
//!
//! Usage:
//!   cargo run --bin visitor_relay
//!
//! Environment:
//!   BOT_TOKEN, CHAT_ID   - Telegram credentials (required for relaying)
//!   PORT / RELAY_PORT    - Server port (default: 8080)
//!   RELAY_HOST           - Server host (default: 0.0.0.0)
//!   REPORT_TIMEZONE      - Display timezone for reports (default: Europe/Moscow)
//!   GEO_TIMEOUT_SECS     - Per-provider lookup timeout (default: 5)
//!   RUST_LOG             - Log level (default: info)

use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use visitor_relay::utils::constants::{APP_NAME, APP_VERSION};
use visitor_relay::{create_router, AppState, RelayConfig};

#[tokio::main]
async fn main() -> eyre::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .compact()
        .init();

    info!("🚀 {} v{}", APP_NAME, APP_VERSION);

    let config = RelayConfig::from_env();
    let addr: SocketAddr = config.bind_addr().parse()?;

    let state = Arc::new(AppState::new(config));
    info!("🌍 Geo providers: {}", state.resolver.provider_names().join(" → "));
    info!("🕒 Report timezone: {}", state.config.report_timezone.name());

    let app = create_router(state);

    info!("📡 Listening on http://{}", addr);
    info!("  POST    /        - Relay a visitor report");
    info!("  OPTIONS /        - CORS pre-flight");
    info!("  GET     /health  - Health check");

    let listener = TcpListener::bind(addr).await?;

    let shutdown_signal = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("⚠️ Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal)
        .await?;

    info!("👋 {} shutdown complete", APP_NAME);
    Ok(())
}
