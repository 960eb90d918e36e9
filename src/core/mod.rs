//! Core Module - Relay Logic
//!
//! Geolocation fallback and report rendering.

pub mod formatter;
pub mod resolver;

pub use formatter::*;
pub use resolver::*;
