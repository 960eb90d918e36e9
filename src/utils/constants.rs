//! Constants Module - Single Source of Truth
//!
//! Provider endpoints, sentinel strings, header values and timeouts used
//! across the relay. Other modules import from here instead of hardcoding.

// ============================================
// APPLICATION CONSTANTS
// ============================================

/// Application name
pub const APP_NAME: &str = "VisitorRelay";

/// Application version
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// User-Agent sent to geolocation providers (some block unknown clients)
pub const GEO_USER_AGENT: &str = "Mozilla/5.0";

// ============================================
// SERVER DEFAULTS
// ============================================

/// Default listen host
pub const DEFAULT_HOST: &str = "0.0.0.0";

/// Default listen port
pub const DEFAULT_PORT: u16 = 8080;

// ============================================
// TIMEOUTS
// ============================================

/// Per-provider lookup timeout (seconds)
pub const DEFAULT_GEO_TIMEOUT_SECS: u64 = 5;

/// Telegram sendMessage timeout (seconds)
pub const DEFAULT_TELEGRAM_TIMEOUT_SECS: u64 = 10;

// ============================================
// GEOLOCATION PROVIDERS
// ============================================

/// ipapi.co - primary provider
pub const IPAPI_CO_NAME: &str = "ipapi.co";
pub const IPAPI_CO_BASE_URL: &str = "https://ipapi.co";

/// ip-api.com - free tier is plain HTTP only
pub const IP_API_COM_NAME: &str = "ip-api.com";
pub const IP_API_COM_BASE_URL: &str = "http://ip-api.com";

/// ipinfo.io - last resort
pub const IPINFO_NAME: &str = "ipinfo.io";
pub const IPINFO_BASE_URL: &str = "https://ipinfo.io";

// ============================================
// TELEGRAM
// ============================================

/// Telegram Bot API base URL
pub const TELEGRAM_API_BASE_URL: &str = "https://api.telegram.org";

/// Markup mode for outgoing messages
pub const TELEGRAM_PARSE_MODE: &str = "HTML";

// ============================================
// SENTINELS
// ============================================

/// Client report field that the caller did not supply
pub const NOT_AVAILABLE: &str = "not available";

/// Geo field the winning provider did not return
pub const UNKNOWN: &str = "Unknown";

/// Geo field value when every provider failed
pub const LOOKUP_ERROR: &str = "Error";

/// Provider marker when every provider failed
pub const NO_PROVIDER: &str = "none available";

// ============================================
// REPORT FORMATTING
// ============================================

/// Default display timezone for report timestamps
pub const DEFAULT_REPORT_TIMEZONE: &str = "Europe/Moscow";

/// Timestamp layout (dd.mm.yyyy, HH:MM:SS)
pub const REPORT_TIME_FORMAT: &str = "%d.%m.%Y, %H:%M:%S";

/// Replace a missing or blank provider value with [`UNKNOWN`]
pub fn or_unknown(value: Option<String>) -> String {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| UNKNOWN.to_string())
}

/// Mask a bot token inside a URL for logging
pub fn mask_token(url: &str, token: &str) -> String {
    if token.is_empty() {
        return url.to_string();
    }
    url.replace(token, "***")
}
