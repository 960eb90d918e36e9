//! Relay configuration
//!
//! Loaded once at startup from the environment and shared read-only through
//! the handler state. Tests build `RelayConfig` directly instead of mutating
//! the process environment.

use chrono_tz::Tz;
use std::fmt;
use std::time::Duration;
use tracing::{info, warn};

use crate::models::errors::{AppError, AppResult};
use crate::utils::constants::{
    DEFAULT_GEO_TIMEOUT_SECS, DEFAULT_HOST, DEFAULT_PORT, DEFAULT_REPORT_TIMEZONE,
    DEFAULT_TELEGRAM_TIMEOUT_SECS, IPAPI_CO_BASE_URL, IPINFO_BASE_URL, IP_API_COM_BASE_URL,
    TELEGRAM_API_BASE_URL,
};

/// Telegram bot credentials
/// The token is never logged; `Debug` redacts it.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub bot_token: String,
    pub chat_id: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("bot_token", &"<redacted>")
            .field("chat_id", &self.chat_id)
            .finish()
    }
}

/// Base URLs of the geolocation providers, in lookup order
#[derive(Debug, Clone)]
pub struct ProviderEndpoints {
    pub ipapi_co: String,
    pub ip_api_com: String,
    pub ipinfo: String,
}

impl Default for ProviderEndpoints {
    fn default() -> Self {
        Self {
            ipapi_co: IPAPI_CO_BASE_URL.to_string(),
            ip_api_com: IP_API_COM_BASE_URL.to_string(),
            ipinfo: IPINFO_BASE_URL.to_string(),
        }
    }
}

/// Configuration for the relay server
/// `Debug` redacts the bot token.
#[derive(Clone)]
pub struct RelayConfig {
    /// Listen host
    pub host: String,
    /// Listen port
    pub port: u16,
    /// Telegram bot token (BOT_TOKEN)
    pub bot_token: Option<String>,
    /// Destination chat (CHAT_ID)
    pub chat_id: Option<String>,
    /// Telegram Bot API base URL
    pub telegram_api_url: String,
    /// Geolocation provider base URLs
    pub providers: ProviderEndpoints,
    /// Timeout for each provider lookup
    pub geo_timeout: Duration,
    /// Timeout for the Telegram call
    pub telegram_timeout: Duration,
    /// Display timezone for report timestamps
    pub report_timezone: Tz,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            bot_token: None,
            chat_id: None,
            telegram_api_url: TELEGRAM_API_BASE_URL.to_string(),
            providers: ProviderEndpoints::default(),
            geo_timeout: Duration::from_secs(DEFAULT_GEO_TIMEOUT_SECS),
            telegram_timeout: Duration::from_secs(DEFAULT_TELEGRAM_TIMEOUT_SECS),
            report_timezone: chrono_tz::Europe::Moscow,
        }
    }
}

impl fmt::Debug for RelayConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RelayConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("bot_token", &self.bot_token.as_ref().map(|_| "<redacted>"))
            .field("chat_id", &self.chat_id)
            .field("telegram_api_url", &self.telegram_api_url)
            .field("providers", &self.providers)
            .field("geo_timeout", &self.geo_timeout)
            .field("telegram_timeout", &self.telegram_timeout)
            .field("report_timezone", &self.report_timezone.name())
            .finish()
    }
}

impl RelayConfig {
    /// Load configuration from the process environment
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup
    /// Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let defaults = Self::default();

        let port = get("PORT")
            .or_else(|| get("RELAY_PORT"))
            .and_then(|p| parse_or_warn::<u16>("PORT", &p))
            .unwrap_or(defaults.port);

        let geo_timeout = get("GEO_TIMEOUT_SECS")
            .and_then(|s| parse_or_warn::<u64>("GEO_TIMEOUT_SECS", &s))
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
            .unwrap_or(defaults.geo_timeout);

        let report_timezone = get("REPORT_TIMEZONE")
            .and_then(|name| match parse_timezone(&name) {
                Ok(tz) => Some(tz),
                Err(e) => {
                    warn!("⚠️ {}, using {}", e.message, DEFAULT_REPORT_TIMEZONE);
                    None
                }
            })
            .unwrap_or(defaults.report_timezone);

        let bot_token = get("BOT_TOKEN");
        let chat_id = get("CHAT_ID");
        if bot_token.is_some() && chat_id.is_some() {
            info!("🔑 Telegram credentials configured (token hidden)");
        } else {
            warn!("⚠️ BOT_TOKEN or CHAT_ID not set - relay requests will fail");
        }

        Self {
            host: get("RELAY_HOST").unwrap_or(defaults.host),
            port,
            bot_token,
            chat_id,
            telegram_api_url: get("TELEGRAM_API_URL").unwrap_or(defaults.telegram_api_url),
            providers: ProviderEndpoints {
                ipapi_co: get("IPAPI_CO_URL").unwrap_or(defaults.providers.ipapi_co),
                ip_api_com: get("IP_API_COM_URL").unwrap_or(defaults.providers.ip_api_com),
                ipinfo: get("IPINFO_URL").unwrap_or(defaults.providers.ipinfo),
            },
            geo_timeout,
            telegram_timeout: defaults.telegram_timeout,
            report_timezone,
        }
    }

    /// Credentials for the messaging API, or a request-level error if unset
    pub fn credentials(&self) -> AppResult<Credentials> {
        match (&self.bot_token, &self.chat_id) {
            (Some(bot_token), Some(chat_id)) => Ok(Credentials {
                bot_token: bot_token.clone(),
                chat_id: chat_id.clone(),
            }),
            _ => Err(AppError::missing_credentials()),
        }
    }

    /// Socket address string for the listener
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Parse an IANA timezone name
pub fn parse_timezone(name: &str) -> AppResult<Tz> {
    name.parse::<Tz>()
        .map_err(|_| AppError::invalid_config(format!("Unknown timezone: {}", name)))
}

fn parse_or_warn<T: std::str::FromStr>(key: &str, raw: &str) -> Option<T> {
    match raw.parse() {
        Ok(v) => Some(v),
        Err(_) => {
            warn!("⚠️ Ignoring invalid {}={:?}", key, raw);
            None
        }
    }
}
