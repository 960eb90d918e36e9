//! Telegram Bot API Client
//!
//! Delivers formatted reports through `sendMessage`. One POST per report,
//! no retries. The bot token lives in the URL path, so every URL that reaches
//! the logs goes through [`mask_token`] first.
//!
//! API: POST {api_base}/bot{token}/sendMessage

use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info};

use crate::models::config::Credentials;
use crate::models::errors::{AppError, AppResult, ErrorCode};
use crate::utils::constants::{mask_token, TELEGRAM_PARSE_MODE};

/// sendMessage request body
#[derive(Debug, Serialize)]
pub struct SendMessageRequest<'a> {
    pub chat_id: &'a str,
    pub text: &'a str,
    pub parse_mode: &'a str,
}

/// Subset of the Bot API envelope we care about
#[derive(Debug, Deserialize)]
struct TelegramEnvelope {
    ok: bool,
    description: Option<String>,
    result: Option<SentMessage>,
}

/// Message accepted by Telegram
#[derive(Debug, Clone, Deserialize)]
pub struct SentMessage {
    pub message_id: i64,
}

/// Telegram sendMessage client
pub struct TelegramNotifier {
    client: reqwest::Client,
    api_base: String,
    credentials: Option<Credentials>,
    timeout: Duration,
}

impl TelegramNotifier {
    /// `credentials` may be absent; `send` then fails per request instead of at startup
    pub fn new(api_base: &str, credentials: Option<Credentials>, timeout: Duration) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_base: api_base.trim_end_matches('/').to_string(),
            credentials,
            timeout,
        }
    }

    fn send_message_url(&self, token: &str) -> String {
        format!("{}/bot{}/sendMessage", self.api_base, token)
    }

    /// Post a message to the configured chat
    /// `ok: true` without a `result` still counts as delivered.
    pub async fn send(&self, text: &str) -> AppResult<Option<SentMessage>> {
        let credentials = self
            .credentials
            .as_ref()
            .ok_or_else(AppError::missing_credentials)?;

        let url = self.send_message_url(&credentials.bot_token);
        debug!("📨 Telegram: POST {}", mask_token(&url, &credentials.bot_token));

        let body = SendMessageRequest {
            chat_id: &credentials.chat_id,
            text,
            parse_mode: TELEGRAM_PARSE_MODE,
        };

        let response = self
            .client
            .post(&url)
            .timeout(self.timeout)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                // reqwest errors embed the URL, which embeds the token
                let e = e.without_url();
                AppError::with_source(
                    ErrorCode::TelegramUnreachable,
                    format!("Telegram request failed: {}", e),
                    e,
                )
            })?;

        let status = response.status();
        let raw = response.text().await.map_err(|e| {
            let e = e.without_url();
            AppError::with_source(ErrorCode::TelegramUnreachable, "Failed to read Telegram response", e)
        })?;

        if !status.is_success() {
            return Err(AppError::telegram(raw));
        }

        let envelope: TelegramEnvelope = serde_json::from_str(&raw)
            .map_err(|e| AppError::with_source(ErrorCode::TelegramError, "Invalid Telegram response", e))?;

        if !envelope.ok {
            return Err(AppError::telegram(
                envelope.description.unwrap_or(raw),
            ));
        }

        match &envelope.result {
            Some(sent) => info!("✅ Telegram: message {} delivered", sent.message_id),
            None => info!("✅ Telegram: message delivered"),
        }
        Ok(envelope.result)
    }
}
