//! Notification Gateway
//!
//! The send-message capability the lifecycle engine fans out through.
//! Fire-and-forget: the core never tracks delivery receipts, and a
//! failed send never rolls back a committed transition.

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

/// Gateway error (non-fatal, logged by the caller)
#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("transport error: {0}")]
    Transport(String),

    #[error("Telegram API rejected the message: {0}")]
    Rejected(String),
}

/// Send-message boundary towards the chat platform
#[async_trait]
pub trait NotificationGateway: Send + Sync {
    /// Deliver `text` to the given chat identity (best effort)
    async fn send(&self, chat_id: &str, text: &str) -> Result<(), NotifyError>;
}

/// Telegram Bot API gateway
#[derive(Debug, Clone)]
pub struct TelegramGateway {
    client: reqwest::Client,
    api_url: String,
}

#[derive(Serialize)]
struct SendMessage<'a> {
    chat_id: &'a str,
    text: &'a str,
    parse_mode: &'static str,
}

impl TelegramGateway {
    pub fn new(bot_token: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_url: format!("https://api.telegram.org/bot{}/sendMessage", bot_token),
        }
    }

    /// Point the gateway at a different endpoint (test servers)
    pub fn with_api_url(api_url: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_url,
        }
    }
}

#[async_trait]
impl NotificationGateway for TelegramGateway {
    async fn send(&self, chat_id: &str, text: &str) -> Result<(), NotifyError> {
        let body = SendMessage {
            chat_id,
            text,
            parse_mode: "Markdown",
        };

        let response = self
            .client
            .post(&self.api_url)
            .json(&body)
            .send()
            .await
            .map_err(|e| NotifyError::Transport(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let detail = response.text().await.unwrap_or_default();
            return Err(NotifyError::Rejected(format!("{}: {}", status, detail)));
        }

        Ok(())
    }
}

/// No-op gateway used when no bot token is configured
///
/// Logs the message instead of sending it, so local setups still show
/// what would have gone out.
#[derive(Debug, Clone)]
pub struct NoopGateway;

#[async_trait]
impl NotificationGateway for NoopGateway {
    async fn send(&self, chat_id: &str, text: &str) -> Result<(), NotifyError> {
        tracing::info!(target: "notify", chat_id = %chat_id, "Notification (not sent): {}", text);
        Ok(())
    }
}

/// Recording gateway for tests
///
/// Captures every (chat_id, text) pair; can be told to fail for a
/// given chat to exercise the best-effort fan-out contract.
#[derive(Debug, Default)]
pub struct RecordingGateway {
    sent: std::sync::Mutex<Vec<(String, String)>>,
    fail_for: std::sync::Mutex<Vec<String>>,
}

impl RecordingGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// All messages sent so far
    pub fn sent(&self) -> Vec<(String, String)> {
        self.sent.lock().expect("gateway lock").clone()
    }

    /// Messages sent to one chat
    pub fn sent_to(&self, chat_id: &str) -> Vec<String> {
        self.sent()
            .into_iter()
            .filter(|(c, _)| c == chat_id)
            .map(|(_, t)| t)
            .collect()
    }

    /// Make future sends to `chat_id` fail
    pub fn fail_for(&self, chat_id: &str) {
        self.fail_for
            .lock()
            .expect("gateway lock")
            .push(chat_id.to_string());
    }
}

#[async_trait]
impl NotificationGateway for RecordingGateway {
    async fn send(&self, chat_id: &str, text: &str) -> Result<(), NotifyError> {
        if self
            .fail_for
            .lock()
            .expect("gateway lock")
            .iter()
            .any(|c| c == chat_id)
        {
            return Err(NotifyError::Transport(format!(
                "simulated failure for {}",
                chat_id
            )));
        }
        self.sent
            .lock()
            .expect("gateway lock")
            .push((chat_id.to_string(), text.to_string()));
        Ok(())
    }
}
