//! Relay HTTP API
//! Single method-dispatched endpoint plus a health probe.

pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod types;

pub use handlers::AppState;
pub use routes::create_router;
pub use types::*;
