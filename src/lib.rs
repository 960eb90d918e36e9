//! Visitor Relay Library
//!
//! Receives browser telemetry, geolocates the client IP through an ordered
//! list of public providers, and relays a formatted report to Telegram:
//! - `core`: provider fallback resolver and message formatter
//! - `providers`: ipapi.co / ip-api.com / ipinfo.io parsers, Telegram client
//! - `api`: axum router, handlers and middleware
//! - `models`: data types, configuration, errors

pub mod api;
pub mod core;
pub mod models;
pub mod providers;
pub mod utils;

pub use api::{create_router, AppState};
pub use crate::core::{GeoResolver, MessageFormatter};
pub use models::{AppError, AppResult, ClientReport, Credentials, ErrorCode, GeoRecord, RelayConfig};
pub use providers::{GeoProvider, TelegramNotifier};
