use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;
use std::time::Duration;
use tracing::warn;

use super::{Notifier, NotifierError, ParseMode};

#[derive(Debug, Clone)]
pub struct TelegramNotifierConfig {
    /// Bot API base, e.g. `https://api.telegram.org`. Overridable for tests.
    pub api_base: String,
    pub bot_token: String,
    pub request_timeout: Duration,
}

/// Telegram Bot API client. Each send gets a bounded timeout and at most one
/// retry; the caller's result is never blocked on delivery.
pub struct TelegramNotifier {
    client: Client,
    config: TelegramNotifierConfig,
}

impl TelegramNotifier {
    pub fn new(config: TelegramNotifierConfig) -> Result<Self, NotifierError> {
        let client = Client::builder().timeout(config.request_timeout).build()?;
        Ok(Self { client, config })
    }

    fn send_message_url(&self) -> String {
        format!(
            "{}/bot{}/sendMessage",
            self.config.api_base.trim_end_matches('/'),
            self.config.bot_token
        )
    }

    async fn send_once(
        &self,
        chat_id: i64,
        text: &str,
        mode: ParseMode,
    ) -> Result<(), NotifierError> {
        let mut payload = json!({
            "chat_id": chat_id,
            "text": text,
        });
        if mode == ParseMode::Html {
            payload["parse_mode"] = json!("HTML");
        }

        let response = self
            .client
            .post(self.send_message_url())
            .json(&payload)
            .send()
            .await?;

        if response.status().is_success() {
            Ok(())
        } else {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            Err(NotifierError::Api { status, body })
        }
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    async fn send(&self, chat_id: i64, text: &str, mode: ParseMode) -> Result<(), NotifierError> {
        match self.send_once(chat_id, text, mode).await {
            Ok(()) => Ok(()),
            Err(first) => {
                warn!(error = %first, chat_id, "telegram send failed, retrying once");
                self.send_once(chat_id, text, mode).await
            }
        }
    }
}
