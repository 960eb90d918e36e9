//! Geolocation Providers - IP lookup strategies
//!
//! Each provider knows how to build its lookup URL and how to turn its own
//! JSON dialect into a [`GeoRecord`]. Field-level fallbacks (`org` vs `isp`)
//! live in the parsers, not in the resolver.
//!
//! | Order | Provider    | Endpoint                    | Failure signal in 2xx body |
//! |-------|-------------|-----------------------------|----------------------------|
//! | 1     | ipapi.co    | `/{ip}/json/`               | `"error": true`            |
//! | 2     | ip-api.com  | `/json/{ip}`                | `"status" != "success"`    |
//! | 3     | ipinfo.io   | `/{ip}/json`                | `error` object, `bogon`    |

use serde::Deserialize;
use std::net::IpAddr;

use crate::models::config::ProviderEndpoints;
use crate::models::errors::{AppError, AppResult};
use crate::models::types::GeoRecord;
use crate::utils::constants::{or_unknown, IPAPI_CO_NAME, IPINFO_NAME, IP_API_COM_NAME};

/// A geolocation lookup strategy
pub trait GeoProvider: Send + Sync {
    /// Provider name reported in [`GeoRecord::provider`]
    fn name(&self) -> &'static str;

    /// Full lookup URL for an address
    fn lookup_url(&self, ip: &IpAddr) -> String;

    /// Normalize a raw response body
    fn parse(&self, body: &[u8]) -> AppResult<GeoRecord>;
}

/// The three public providers in fallback order
pub fn default_providers(endpoints: &ProviderEndpoints) -> Vec<Box<dyn GeoProvider>> {
    vec![
        Box::new(IpApiCo::new(&endpoints.ipapi_co)),
        Box::new(IpApiCom::new(&endpoints.ip_api_com)),
        Box::new(IpInfo::new(&endpoints.ipinfo)),
    ]
}

fn trim_base(base_url: &str) -> String {
    base_url.trim_end_matches('/').to_string()
}

// ============================================
// ipapi.co
// ============================================

#[derive(Debug, Deserialize)]
struct IpApiCoResponse {
    country_name: Option<String>,
    country_code: Option<String>,
    region: Option<String>,
    city: Option<String>,
    org: Option<String>,
    #[serde(default)]
    error: bool,
    reason: Option<String>,
}

/// ipapi.co JSON API
pub struct IpApiCo {
    base_url: String,
}

impl IpApiCo {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: trim_base(base_url),
        }
    }
}

impl GeoProvider for IpApiCo {
    fn name(&self) -> &'static str {
        IPAPI_CO_NAME
    }

    fn lookup_url(&self, ip: &IpAddr) -> String {
        format!("{}/{}/json/", self.base_url, ip)
    }

    fn parse(&self, body: &[u8]) -> AppResult<GeoRecord> {
        let data: IpApiCoResponse = serde_json::from_slice(body)?;
        if data.error {
            return Err(AppError::geo_rejected(
                self.name(),
                data.reason.as_deref().unwrap_or("unspecified"),
            ));
        }

        Ok(GeoRecord::located(
            or_unknown(data.country_name),
            or_unknown(data.country_code),
            or_unknown(data.region),
            or_unknown(data.city),
            or_unknown(data.org),
        ))
    }
}

// ============================================
// ip-api.com
// ============================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct IpApiComResponse {
    status: Option<String>,
    message: Option<String>,
    country: Option<String>,
    country_code: Option<String>,
    region_name: Option<String>,
    city: Option<String>,
    isp: Option<String>,
    org: Option<String>,
}

/// ip-api.com JSON API
pub struct IpApiCom {
    base_url: String,
}

impl IpApiCom {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: trim_base(base_url),
        }
    }
}

impl GeoProvider for IpApiCom {
    fn name(&self) -> &'static str {
        IP_API_COM_NAME
    }

    fn lookup_url(&self, ip: &IpAddr) -> String {
        format!("{}/json/{}", self.base_url, ip)
    }

    fn parse(&self, body: &[u8]) -> AppResult<GeoRecord> {
        let data: IpApiComResponse = serde_json::from_slice(body)?;
        if data.status.as_deref() != Some("success") {
            return Err(AppError::geo_rejected(
                self.name(),
                data.message
                    .or(data.status)
                    .unwrap_or_else(|| "missing status".to_string()),
            ));
        }

        Ok(GeoRecord::located(
            or_unknown(data.country),
            or_unknown(data.country_code),
            or_unknown(data.region_name),
            or_unknown(data.city),
            or_unknown(data.isp.filter(|s| !s.trim().is_empty()).or(data.org)),
        ))
    }
}

// ============================================
// ipinfo.io
// ============================================

#[derive(Debug, Deserialize)]
struct IpInfoError {
    title: Option<String>,
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct IpInfoResponse {
    /// ISO country code; ipinfo has no full country name on the free tier
    country: Option<String>,
    region: Option<String>,
    city: Option<String>,
    org: Option<String>,
    #[serde(default)]
    bogon: bool,
    error: Option<IpInfoError>,
}

/// ipinfo.io JSON API
pub struct IpInfo {
    base_url: String,
}

impl IpInfo {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: trim_base(base_url),
        }
    }
}

impl GeoProvider for IpInfo {
    fn name(&self) -> &'static str {
        IPINFO_NAME
    }

    fn lookup_url(&self, ip: &IpAddr) -> String {
        format!("{}/{}/json", self.base_url, ip)
    }

    fn parse(&self, body: &[u8]) -> AppResult<GeoRecord> {
        let data: IpInfoResponse = serde_json::from_slice(body)?;
        if let Some(err) = data.error {
            let reason = err.message.or(err.title).unwrap_or_else(|| "unspecified".to_string());
            return Err(AppError::geo_rejected(self.name(), reason));
        }
        if data.bogon {
            return Err(AppError::geo_rejected(self.name(), "bogon address"));
        }

        Ok(GeoRecord::located(
            or_unknown(data.country.clone()),
            or_unknown(data.country),
            or_unknown(data.region),
            or_unknown(data.city),
            or_unknown(data.org),
        ))
    }
}
