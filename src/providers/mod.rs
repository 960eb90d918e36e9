//! Providers Module - External Services
//!
//! Geolocation lookups and the Telegram Bot API.

pub mod geo;
pub mod telegram;

pub use geo::*;
pub use telegram::*;
