//! Centralized Error Handling Module
//!
//! Every failure carries a unique code so log lines can be grepped by stage.
//!
//! Error codes follow pattern: CATEGORY_SPECIFIC_ERROR
//! - REQ_xxx: Inbound request errors
//! - GEO_xxx: Geolocation provider errors (absorbed by the resolver)
//! - TG_xxx: Telegram delivery errors
//! - CFG_xxx: Configuration errors

use std::fmt;

/// Application-wide error type
#[derive(Debug)]
pub struct AppError {
    /// Unique error code for logging/monitoring
    pub code: ErrorCode,
    /// Human-readable message
    pub message: String,
    /// Optional underlying error
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl AppError {
    /// Create a new AppError
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            source: None,
        }
    }

    /// Create AppError with source error
    pub fn with_source(
        code: ErrorCode,
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            code,
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Get error code as string (for logging)
    pub fn code_str(&self) -> &'static str {
        self.code.as_str()
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code.as_str(), self.message)
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source.as_ref().map(|e| e.as_ref() as &(dyn std::error::Error + 'static))
    }
}

/// Unique error codes for monitoring
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    // ============================================
    // Request Errors
    // ============================================
    /// Inbound body is not valid JSON for a client report
    RequestMalformed,

    // ============================================
    // Geolocation Provider Errors
    // ============================================
    /// Provider connection failed
    GeoConnectionFailed,
    /// Provider request timeout
    GeoTimeout,
    /// Provider answered with non-2xx status
    GeoHttpStatus,
    /// Provider body is not the JSON we expect
    GeoInvalidResponse,
    /// Provider signalled an error inside a 2xx body
    GeoRejected,
    /// Address is not a valid IPv4/IPv6 literal
    GeoInvalidIp,

    // ============================================
    // Telegram Errors
    // ============================================
    /// Telegram API returned an error response
    TelegramError,
    /// Telegram request could not be delivered
    TelegramUnreachable,

    // ============================================
    // Configuration Errors
    // ============================================
    /// Missing environment variable
    ConfigMissingEnv,
    /// Invalid configuration value
    ConfigInvalidValue,

    // ============================================
    // Generic Errors
    // ============================================
    /// Unknown error
    Unknown,
}

impl ErrorCode {
    /// Get string representation of error code
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::RequestMalformed => "REQ_MALFORMED",

            Self::GeoConnectionFailed => "GEO_CONNECTION_FAILED",
            Self::GeoTimeout => "GEO_TIMEOUT",
            Self::GeoHttpStatus => "GEO_HTTP_STATUS",
            Self::GeoInvalidResponse => "GEO_INVALID_RESPONSE",
            Self::GeoRejected => "GEO_REJECTED",
            Self::GeoInvalidIp => "GEO_INVALID_IP",

            Self::TelegramError => "TG_API_ERROR",
            Self::TelegramUnreachable => "TG_UNREACHABLE",

            Self::ConfigMissingEnv => "CFG_MISSING_ENV",
            Self::ConfigInvalidValue => "CFG_INVALID_VALUE",

            Self::Unknown => "UNKNOWN_ERROR",
        }
    }

    /// Provider-side failure that the resolver absorbs by moving on
    pub fn is_provider_failure(&self) -> bool {
        matches!(
            self,
            Self::GeoConnectionFailed
                | Self::GeoTimeout
                | Self::GeoHttpStatus
                | Self::GeoInvalidResponse
                | Self::GeoRejected
        )
    }
}

// ============================================
// Convenience constructors
// ============================================

impl AppError {
    /// Inbound request body could not be parsed
    pub fn malformed_request(source: serde_json::Error) -> Self {
        Self::new(
            ErrorCode::RequestMalformed,
            format!("Invalid request body: {}", source),
        )
    }

    /// Provider answered with non-success status
    pub fn geo_status(provider: &str, status: u16) -> Self {
        Self::new(
            ErrorCode::GeoHttpStatus,
            format!("{} returned HTTP {}", provider, status),
        )
    }

    /// Provider reported an error in its payload
    pub fn geo_rejected(provider: &str, reason: impl fmt::Display) -> Self {
        Self::new(
            ErrorCode::GeoRejected,
            format!("{} returned an error: {}", provider, reason),
        )
    }

    /// Address is not an IP literal
    pub fn invalid_ip(ip: &str) -> Self {
        Self::new(ErrorCode::GeoInvalidIp, format!("Not an IP address: {:?}", ip))
    }

    /// Bot token or chat id is not configured
    pub fn missing_credentials() -> Self {
        Self::new(
            ErrorCode::ConfigMissingEnv,
            "BOT_TOKEN or CHAT_ID is not set in the environment",
        )
    }

    /// Telegram rejected the message
    pub fn telegram(detail: impl fmt::Display) -> Self {
        Self::new(
            ErrorCode::TelegramError,
            format!("Telegram API error: {}", detail),
        )
    }

    /// Invalid configuration value
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::ConfigInvalidValue, msg)
    }
}

// ============================================
// Result type alias
// ============================================

/// Application Result type
pub type AppResult<T> = Result<T, AppError>;

// ============================================
// Conversion from common error types
// ============================================

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::new(ErrorCode::GeoTimeout, "Request timeout")
        } else if err.is_connect() {
            Self::new(ErrorCode::GeoConnectionFailed, "Connection failed")
        } else if err.is_decode() {
            Self::with_source(ErrorCode::GeoInvalidResponse, "Invalid response body", err)
        } else {
            Self::new(ErrorCode::Unknown, err.to_string())
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        Self::with_source(ErrorCode::GeoInvalidResponse, "JSON parse error", err)
    }
}
