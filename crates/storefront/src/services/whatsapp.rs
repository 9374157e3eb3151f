//! WhatsApp Cloud API client for store alerts.
//!
//! Sends plain text messages to the bakery's own WhatsApp number when an
//! order or custom request comes in.

use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use secrecy::ExposeSecret;
use serde::Serialize;
use thiserror::Error;

use crate::config::WhatsAppConfig;

/// WhatsApp caps text bodies at 4096 characters.
const MAX_BODY_CHARS: usize = 4096;

#[derive(Debug, Error)]
pub enum WhatsAppError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// API returned an error response.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Client could not be configured.
    #[error("Config error: {0}")]
    Config(String),
}

#[derive(Serialize)]
struct TextMessage<'a> {
    messaging_product: &'static str,
    to: &'a str,
    #[serde(rename = "type")]
    kind: &'static str,
    text: TextBody<'a>,
}

#[derive(Serialize)]
struct TextBody<'a> {
    preview_url: bool,
    body: &'a str,
}

#[derive(Clone)]
pub struct WhatsAppClient {
    client: reqwest::Client,
    messages_url: String,
}

impl WhatsAppClient {
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build.
    pub fn new(config: &WhatsAppConfig) -> Result<Self, WhatsAppError> {
        let mut headers = HeaderMap::new();

        let auth_value = format!("Bearer {}", config.access_token.expose_secret());
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&auth_value)
                .map_err(|e| WhatsAppError::Config(format!("Invalid access token format: {e}")))?,
        );
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(std::time::Duration::from_secs(10))
            .build()?;

        Ok(Self {
            client,
            messages_url: format!(
                "{}/{}/messages",
                config.api_base.trim_end_matches('/'),
                config.phone_number_id
            ),
        })
    }

    /// Send a text message to a number given as bare digits with country code.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the API rejects the message.
    pub async fn send_text(&self, to_digits: &str, body: &str) -> Result<(), WhatsAppError> {
        let body = truncate(body, MAX_BODY_CHARS);
        let payload = TextMessage {
            messaging_product: "whatsapp",
            to: to_digits,
            kind: "text",
            text: TextBody {
                preview_url: false,
                body: &body,
            },
        };

        let response = self
            .client
            .post(&self.messages_url)
            .json(&payload)
            .send()
            .await?;
        let status = response.status();

        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(WhatsAppError::Api {
                status: status.as_u16(),
                message,
            });
        }

        tracing::info!(to = %to_digits, "WhatsApp message sent");
        Ok(())
    }
}

fn truncate(body: &str, max_chars: usize) -> String {
    if body.chars().count() <= max_chars {
        return body.to_owned();
    }
    let mut out: String = body.chars().take(max_chars.saturating_sub(1)).collect();
    out.push('…');
    out
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use secrecy::SecretString;

    use super::*;

    #[test]
    fn test_messages_url() {
        let client = WhatsAppClient::new(&WhatsAppConfig {
            api_base: "https://graph.facebook.com/v21.0/".to_owned(),
            phone_number_id: "1055501234".to_owned(),
            access_token: SecretString::from("EAAG3xk9Qm2Lz7Pw"),
        })
        .unwrap();
        assert_eq!(
            client.messages_url,
            "https://graph.facebook.com/v21.0/1055501234/messages"
        );
    }

    #[test]
    fn test_payload_shape() {
        let payload = TextMessage {
            messaging_product: "whatsapp",
            to: "15555550100",
            kind: "text",
            text: TextBody {
                preview_url: false,
                body: "New order",
            },
        };
        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["type"], "text");
        assert_eq!(json["to"], "15555550100");
        assert_eq!(json["text"]["body"], "New order");
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        let long = truncate(&"a".repeat(20), 10);
        assert_eq!(long.chars().count(), 10);
        assert!(long.ends_with('…'));
    }
}
