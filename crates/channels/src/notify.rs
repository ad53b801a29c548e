//! Alert notifiers.
//!
//! - **LogNotifier** — loud `warn!` banner in the process log, always on
//! - **DiscordDmNotifier** — direct message from a secondary account
//! - **CompositeNotifier** — fans one alert out to several notifiers
//!
//! Every implementation is best-effort: failures are logged and dropped.

use async_trait::async_trait;
use gemfarm_config::AppConfig;
use gemfarm_core::error::{GatewayError, NotifyError};
use gemfarm_core::notify::Notifier;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

use crate::discord::check_status;

/// Writes alerts to the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    fn name(&self) -> &str {
        "log"
    }

    async fn alert(&self, message: &str) {
        warn!("==================================================");
        warn!("ALERT: {message}");
        warn!("==================================================");
    }
}

/// Sends alerts as a Discord direct message.
pub struct DiscordDmNotifier {
    token: String,
    recipient_id: String,
    api_base: String,
    user_agent: String,
    client: reqwest::Client,
}

#[derive(Deserialize)]
struct DmChannel {
    #[serde(default)]
    id: Option<String>,
}

impl std::fmt::Debug for DiscordDmNotifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DiscordDmNotifier")
            .field("token", &"[REDACTED]")
            .field("recipient_id", &self.recipient_id)
            .field("api_base", &self.api_base)
            .finish()
    }
}

impl DiscordDmNotifier {
    pub fn new(
        token: impl Into<String>,
        recipient_id: impl Into<String>,
        api_base: impl Into<String>,
        user_agent: impl Into<String>,
    ) -> Result<Self, NotifyError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(15))
            .build()
            .map_err(|e| NotifyError::NotConfigured(format!("HTTP client: {e}")))?;

        Ok(Self {
            token: token.into(),
            recipient_id: recipient_id.into(),
            api_base: api_base.into().trim_end_matches('/').to_string(),
            user_agent: user_agent.into(),
            client,
        })
    }

    /// Build from the `[notify]` section; `None` when DM alerts are off.
    pub fn from_app_config(config: &AppConfig) -> Option<Result<Self, NotifyError>> {
        if !config.notify.dm_enabled() {
            return None;
        }
        let token = config.notify.token.clone().unwrap_or_default();
        let user_id = config.notify.user_id.clone().unwrap_or_default();
        Some(Self::new(
            token,
            user_id,
            config.channel.api_base.clone(),
            config.channel.user_agent.clone(),
        ))
    }

    async fn open_dm_channel(&self) -> Result<String, GatewayError> {
        let response = self
            .client
            .post(format!("{}/users/@me/channels", self.api_base))
            .header("authorization", &self.token)
            .header("user-agent", &self.user_agent)
            .json(&serde_json::json!({ "recipient_id": self.recipient_id }))
            .send()
            .await
            .map_err(|e| GatewayError::Network(e.to_string()))?;

        let channel: DmChannel = check_status(response)
            .await?
            .json()
            .await
            .map_err(|e| GatewayError::InvalidPayload(e.to_string()))?;

        channel
            .id
            .filter(|id| !id.is_empty())
            .ok_or_else(|| GatewayError::InvalidPayload("DM channel response had no id".into()))
    }

    /// Send one DM; the error is returned so `notify-test` can report it.
    pub async fn send(&self, message: &str) -> Result<(), NotifyError> {
        let failed = |e: GatewayError| NotifyError::DeliveryFailed {
            notifier: "discord_dm".into(),
            reason: e.to_string(),
        };

        let channel_id = self.open_dm_channel().await.map_err(failed)?;
        let response = self
            .client
            .post(format!("{}/channels/{channel_id}/messages", self.api_base))
            .header("authorization", &self.token)
            .header("user-agent", &self.user_agent)
            .json(&serde_json::json!({ "content": message }))
            .send()
            .await
            .map_err(|e| failed(GatewayError::Network(e.to_string())))?;

        check_status(response).await.map_err(failed)?;
        Ok(())
    }
}

#[async_trait]
impl Notifier for DiscordDmNotifier {
    fn name(&self) -> &str {
        "discord_dm"
    }

    async fn alert(&self, message: &str) {
        match self.send(message).await {
            Ok(()) => info!(recipient = %self.recipient_id, "Alert DM sent"),
            Err(e) => warn!(error = %e, "Alert DM failed"),
        }
    }
}

/// Delivers each alert to every inner notifier, in order.
#[derive(Default)]
pub struct CompositeNotifier {
    notifiers: Vec<Arc<dyn Notifier>>,
}

impl CompositeNotifier {
    pub fn new(notifiers: Vec<Arc<dyn Notifier>>) -> Self {
        Self { notifiers }
    }

    pub fn push(&mut self, notifier: Arc<dyn Notifier>) {
        self.notifiers.push(notifier);
    }

    pub fn names(&self) -> Vec<&str> {
        self.notifiers.iter().map(|n| n.name()).collect()
    }

    /// Log banner plus a DM notifier when configured.
    pub fn from_app_config(config: &AppConfig) -> Self {
        let mut composite = Self::new(vec![Arc::new(LogNotifier)]);
        match DiscordDmNotifier::from_app_config(config) {
            Some(Ok(dm)) => composite.push(Arc::new(dm)),
            Some(Err(e)) => warn!(error = %e, "DM notifier unavailable"),
            None => {}
        }
        composite
    }
}

#[async_trait]
impl Notifier for CompositeNotifier {
    fn name(&self) -> &str {
        "composite"
    }

    async fn alert(&self, message: &str) {
        for notifier in &self.notifiers {
            notifier.alert(message).await;
        }
    }
}
