//! Discord REST gateway.
//!
//! Implements [`MessageGateway`] against the channel messages endpoint:
//! `POST /channels/{id}/messages` to dispatch a command and
//! `GET /channels/{id}/messages?limit=N` to read replies. Requests are sent
//! one at a time and awaited, so command order in the channel matches call
//! order.

use async_trait::async_trait;
use gemfarm_config::{AppConfig, ConfigError};
use gemfarm_core::channel::{DeliveryOutcome, MessageGateway};
use gemfarm_core::error::GatewayError;
use gemfarm_core::message::Message;
use std::time::Duration;
use tracing::{debug, warn};

/// Discord gateway configuration.
#[derive(Clone)]
pub struct DiscordConfig {
    /// Account token sent as the `authorization` header.
    pub token: String,
    /// Channel the commands go to.
    pub channel_id: String,
    /// Browser URL of the channel, sent as the referer.
    pub channel_url: String,
    /// REST base, e.g. `https://discord.com/api/v9`.
    pub api_base: String,
    pub user_agent: String,
    pub timeout: Duration,
}

impl std::fmt::Debug for DiscordConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DiscordConfig")
            .field("token", &"[REDACTED]")
            .field("channel_id", &self.channel_id)
            .field("channel_url", &self.channel_url)
            .field("api_base", &self.api_base)
            .field("user_agent", &self.user_agent)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl DiscordConfig {
    /// Build from application config; fails when token or channel is missing.
    pub fn from_app_config(config: &AppConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            token: config.require_token()?.to_string(),
            channel_id: config.require_channel()?.to_string(),
            channel_url: config.channel.channel_url(),
            api_base: config.channel.api_base.trim_end_matches('/').to_string(),
            user_agent: config.channel.user_agent.clone(),
            timeout: Duration::from_secs(config.channel.request_timeout_secs),
        })
    }
}

/// Discord channel gateway.
pub struct DiscordGateway {
    config: DiscordConfig,
    messages_url: String,
    client: reqwest::Client,
}

impl DiscordGateway {
    pub fn new(config: DiscordConfig) -> Result<Self, GatewayError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| GatewayError::Network(format!("Failed to create HTTP client: {e}")))?;

        let messages_url = format!(
            "{}/channels/{}/messages",
            config.api_base.trim_end_matches('/'),
            config.channel_id
        );

        Ok(Self {
            config,
            messages_url,
            client,
        })
    }

    pub fn messages_url(&self) -> &str {
        &self.messages_url
    }

    async fn try_post(&self, text: &str) -> Result<(), GatewayError> {
        let response = self
            .client
            .post(&self.messages_url)
            .header("authorization", &self.config.token)
            .header("referer", &self.config.channel_url)
            .json(&serde_json::json!({ "content": text }))
            .send()
            .await
            .map_err(|e| GatewayError::Network(e.to_string()))?;

        check_status(response).await?;
        Ok(())
    }

    async fn try_fetch(&self, limit: u8) -> Result<Vec<Message>, GatewayError> {
        let response = self
            .client
            .get(&self.messages_url)
            .query(&[("limit", limit)])
            .header("authorization", &self.config.token)
            .header("referer", &self.config.channel_url)
            .send()
            .await
            .map_err(|e| GatewayError::Network(e.to_string()))?;

        let response = check_status(response).await?;
        response
            .json::<Vec<Message>>()
            .await
            .map_err(|e| GatewayError::InvalidPayload(e.to_string()))
    }
}

/// Map a non-success status to a [`GatewayError`].
pub(crate) async fn check_status(
    response: reqwest::Response,
) -> Result<reqwest::Response, GatewayError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let code = status.as_u16();
    if code == 429 {
        let retry_after_secs = response
            .headers()
            .get("retry-after")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse::<f64>().ok())
            .map(|secs| secs.ceil() as u64)
            .unwrap_or(5);
        return Err(GatewayError::RateLimited { retry_after_secs });
    }

    if code == 401 || code == 403 {
        return Err(GatewayError::AuthenticationFailed(format!(
            "status {code}: invalid token or missing channel access"
        )));
    }

    let body = response.text().await.unwrap_or_default();
    Err(GatewayError::ApiError {
        status_code: code,
        message: body,
    })
}

#[async_trait]
impl MessageGateway for DiscordGateway {
    fn name(&self) -> &str {
        "discord"
    }

    async fn post_command(&self, text: &str) -> DeliveryOutcome {
        match self.try_post(text).await {
            Ok(()) => {
                debug!(command = %text, "Command delivered");
                DeliveryOutcome::Delivered
            }
            Err(e) => {
                warn!(command = %text, error = %e, "Command delivery failed");
                DeliveryOutcome::Unknown
            }
        }
    }

    async fn fetch_recent(&self, limit: u8) -> Vec<Message> {
        match self.try_fetch(limit).await {
            Ok(messages) => {
                debug!(limit, count = messages.len(), "Fetched recent messages");
                messages
            }
            Err(e) => {
                warn!(limit, error = %e, "Message fetch failed, treating as empty");
                Vec::new()
            }
        }
    }
}
