use crate::config::DiscordConfig;
use crate::error::{PingError, Result};
use crate::notify::Channel;
use crate::notify::traits::Notifier;
use async_trait::async_trait;
use serde_json::json;
use std::time::Duration;

/// Discord notifier posting to one incoming webhook per channel.
pub struct DiscordWebhookNotifier {
    public_webhook: String,
    private_webhook: String,
    client: reqwest::Client,
}

impl DiscordWebhookNotifier {
    pub fn new(config: &DiscordConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| PingError::Delivery(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            public_webhook: config.public_webhook.clone(),
            private_webhook: config.private_webhook.clone(),
            client,
        })
    }

    fn webhook_for(&self, channel: Channel) -> &str {
        match channel {
            Channel::Public => &self.public_webhook,
            Channel::Private => &self.private_webhook,
        }
    }
}

#[async_trait]
impl Notifier for DiscordWebhookNotifier {
    fn id(&self) -> &'static str {
        "discord"
    }

    async fn send(&self, channel: Channel, text: &str) -> Result<()> {
        let url = self.webhook_for(channel);
        if url.trim().is_empty() {
            return Err(PingError::Delivery(format!(
                "no webhook configured for {channel} channel"
            )));
        }

        // Patron names are user-controlled; never let them ping anyone.
        let body = json!({
            "content": text,
            "allowed_mentions": {"parse": []}
        });
        let response = self
            .client
            .post(url)
            .json(&body)
            .send()
            .await
            .map_err(|e| PingError::Delivery(format!("discord webhook request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(PingError::Delivery(format!(
                "discord webhook failed ({status}): {body}"
            )));
        }
        Ok(())
    }
}
