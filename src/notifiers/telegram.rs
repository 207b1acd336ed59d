//! Telegram Bot API notifier

use crate::{
    constants::{REQUEST_TIMEOUT_SECS, TELEGRAM_API_URL, USER_AGENT},
    error::NotifyError,
    notifier::Notifier,
};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Serialize)]
struct SendMessageRequest<'a> {
    chat_id: &'a str,
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct SendMessageResponse {
    ok: bool,
    #[serde(default)]
    description: Option<String>,
}

/// Sends digests to one chat through a Telegram bot
pub struct TelegramNotifier {
    client: Client,
    endpoint: String,
    chat_id: String,
}

impl TelegramNotifier {
    /// Creates a notifier for `chat_id` using the bot `token`
    pub fn new(token: &str, chat_id: impl Into<String>) -> Result<Self, NotifyError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .user_agent(USER_AGENT)
            .build()
            .map_err(NotifyError::NetworkError)?;

        Ok(Self {
            client,
            endpoint: send_message_url(TELEGRAM_API_URL, token),
            chat_id: chat_id.into(),
        })
    }

    async fn send_one(&self, text: &str) -> Result<(), NotifyError> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(&SendMessageRequest {
                chat_id: &self.chat_id,
                text,
            })
            .send()
            .await?;

        let status = response.status();
        let body: SendMessageResponse = response.json().await?;
        if !status.is_success() || !body.ok {
            return Err(NotifyError::ApiError(format!(
                "HTTP {}: {}",
                status,
                body.description.unwrap_or_default()
            )));
        }

        Ok(())
    }
}

fn send_message_url(base: &str, token: &str) -> String {
    format!("{}/bot{}/sendMessage", base.trim_end_matches('/'), token)
}

/// Sends every unit, carrying on past failed ones
///
/// Succeeds when at least one unit was delivered, so a digest that partly
/// went out is not sent again in full. Fails with the last error when
/// nothing was delivered.
async fn deliver_each<'a, F, Fut>(messages: &'a [String], mut send: F) -> Result<(), NotifyError>
where
    F: FnMut(&'a str) -> Fut,
    Fut: std::future::Future<Output = Result<(), NotifyError>>,
{
    let mut delivered = 0;
    let mut last_error = None;

    for (part, message) in messages.iter().enumerate() {
        match send(message).await {
            Ok(()) => delivered += 1,
            Err(e) => {
                tracing::warn!(part, error = %e, "Failed to deliver digest message");
                last_error = Some(e);
            }
        }
    }

    match last_error {
        Some(e) if delivered == 0 => Err(e),
        _ => {
            tracing::debug!(delivered, total = messages.len(), "Sent Telegram messages");
            Ok(())
        }
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    async fn send(&self, messages: &[String]) -> Result<(), NotifyError> {
        deliver_each(messages, |text| self.send_one(text)).await
    }

    fn channel_name(&self) -> &'static str {
        "telegram"
    }
}
