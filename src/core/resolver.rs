//! Geo Resolver - ordered provider fallback
//!
//! Providers are tried strictly in order, one request each. The first one
//! that yields a parsed record wins; every failure is logged and skipped.
//! `resolve` never fails: total exhaustion yields [`GeoRecord::unavailable`].

use reqwest::header::USER_AGENT;
use std::net::IpAddr;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

use crate::models::config::ProviderEndpoints;
use crate::models::errors::{AppError, AppResult};
use crate::models::types::GeoRecord;
use crate::providers::geo::{default_providers, GeoProvider};
use crate::utils::constants::GEO_USER_AGENT;

/// Multi-provider IP geolocation
pub struct GeoResolver {
    client: reqwest::Client,
    providers: Vec<Box<dyn GeoProvider>>,
    timeout: Duration,
}

impl GeoResolver {
    /// Resolver over an explicit provider list
    pub fn new(providers: Vec<Box<dyn GeoProvider>>, timeout: Duration) -> Self {
        Self {
            client: reqwest::Client::new(),
            providers,
            timeout,
        }
    }

    /// Resolver over the three public providers
    pub fn with_endpoints(endpoints: &ProviderEndpoints, timeout: Duration) -> Self {
        Self::new(default_providers(endpoints), timeout)
    }

    /// Provider names in lookup order
    pub fn provider_names(&self) -> Vec<&'static str> {
        self.providers.iter().map(|p| p.name()).collect()
    }

    /// Geolocate an address, falling back through providers
    pub async fn resolve(&self, ip: &str) -> GeoRecord {
        let addr = match parse_ip(ip) {
            Ok(addr) => addr,
            Err(e) => {
                warn!("⚠️ Geo lookup skipped: {}", e);
                return GeoRecord::unavailable();
            }
        };

        for provider in &self.providers {
            let start = Instant::now();
            match self.lookup(provider.as_ref(), &addr).await {
                Ok(record) => {
                    info!(
                        "🌍 {} resolved {} in {}ms",
                        provider.name(),
                        addr,
                        start.elapsed().as_millis()
                    );
                    return record.with_provider(provider.name());
                }
                Err(e) if e.code.is_provider_failure() => {
                    warn!(
                        provider = provider.name(),
                        code = e.code_str(),
                        "⚠️ Geo provider failed: {}",
                        e.message
                    );
                }
                Err(e) => {
                    error!(
                        provider = provider.name(),
                        code = e.code_str(),
                        "❌ Geo lookup error: {}",
                        e.message
                    );
                }
            }
        }

        warn!("❌ All geo providers failed for {}", addr);
        GeoRecord::unavailable()
    }

    /// Single attempt against one provider
    async fn lookup(&self, provider: &dyn GeoProvider, addr: &IpAddr) -> AppResult<GeoRecord> {
        let url = provider.lookup_url(addr);
        debug!("🔍 {}: GET {}", provider.name(), url);

        let response = self
            .client
            .get(&url)
            .header(USER_AGENT, GEO_USER_AGENT)
            .timeout(self.timeout)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::geo_status(provider.name(), status.as_u16()));
        }

        let body = response.bytes().await?;
        provider.parse(&body)
    }
}

fn parse_ip(ip: &str) -> AppResult<IpAddr> {
    ip.trim().parse().map_err(|_| AppError::invalid_ip(ip))
}
