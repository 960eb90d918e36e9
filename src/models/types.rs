//! Core data types: inbound client report and normalized geolocation record

use serde::{Deserialize, Serialize};

use crate::utils::constants::{LOOKUP_ERROR, NOT_AVAILABLE, NO_PROVIDER};

/// Telemetry submitted by the browser snippet.
///
/// Every field is optional on the wire; absent or `null` values become
/// [`NOT_AVAILABLE`] so nothing downstream has to deal with missing data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientReport {
    #[serde(default = "not_available", deserialize_with = "null_as_not_available")]
    pub ip: String,
    #[serde(default = "not_available", deserialize_with = "null_as_not_available")]
    pub user_agent: String,
    #[serde(default = "not_available", deserialize_with = "null_as_not_available")]
    pub screen_resolution: String,
    #[serde(default = "not_available", deserialize_with = "null_as_not_available")]
    pub timezone: String,
}

fn not_available() -> String {
    NOT_AVAILABLE.to_string()
}

fn null_as_not_available<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_else(not_available))
}

impl ClientReport {
    /// Report with only an IP; other fields carry the sentinel
    pub fn from_ip(ip: impl Into<String>) -> Self {
        Self {
            ip: ip.into(),
            user_agent: not_available(),
            screen_resolution: not_available(),
            timezone: not_available(),
        }
    }
}

/// Normalized geolocation result shared by all providers
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GeoRecord {
    pub country: String,
    pub country_code: String,
    pub region: String,
    pub city: String,
    pub isp: String,
    /// Name of the provider that answered
    pub provider: String,
}

impl GeoRecord {
    /// Record produced by a provider parser; `provider` is filled in by the resolver
    pub fn located(
        country: String,
        country_code: String,
        region: String,
        city: String,
        isp: String,
    ) -> Self {
        Self {
            country,
            country_code,
            region,
            city,
            isp,
            provider: String::new(),
        }
    }

    /// Tag the record with the provider that produced it
    pub fn with_provider(mut self, provider: impl Into<String>) -> Self {
        self.provider = provider.into();
        self
    }

    /// Sentinel returned when every provider failed
    pub fn unavailable() -> Self {
        Self {
            country: LOOKUP_ERROR.to_string(),
            country_code: LOOKUP_ERROR.to_string(),
            region: LOOKUP_ERROR.to_string(),
            city: LOOKUP_ERROR.to_string(),
            isp: LOOKUP_ERROR.to_string(),
            provider: NO_PROVIDER.to_string(),
        }
    }

    /// Whether this is the all-providers-failed sentinel
    pub fn is_unavailable(&self) -> bool {
        self.provider == NO_PROVIDER
    }
}
