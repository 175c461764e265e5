//! Telegram Webhook Handlers
//!
//! One endpoint, two payload shapes:
//!
//! - `{"action": "NOTIFY", "secret", "chat_id", "text"}` - outbound
//!   relay for trusted internal callers, gated by the shared secret
//! - `{"message": {...}}` - inbound Telegram update; `/start <code>`
//!   links a customer chat to a claim, `/start EMP-<id>` links an
//!   employee chat to their profile
//!
//! The handler always answers `200 OK`. Telegram retries non-2xx
//! responses and a retry storm helps nobody; failures are logged.

use axum::extract::State;
use axum::Json;
use serde::Deserialize;

use crate::core::ServerState;
use crate::db::repository::{ClaimRepository, ProfileRepository};
use crate::security_log;
use shared::claim::normalize_code;

#[derive(Debug, Deserialize)]
pub struct WebhookPayload {
    // NOTIFY relay shape
    #[serde(default)]
    pub action: Option<String>,
    #[serde(default)]
    pub secret: Option<String>,
    #[serde(default)]
    pub chat_id: Option<serde_json::Value>,
    #[serde(default)]
    pub text: Option<String>,

    // Inbound Telegram update shape
    #[serde(default)]
    pub message: Option<IncomingMessage>,
}

#[derive(Debug, Deserialize)]
pub struct IncomingMessage {
    pub chat: IncomingChat,
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct IncomingChat {
    pub id: i64,
    #[serde(default)]
    pub first_name: Option<String>,
}

/// Webhook entrypoint
pub async fn webhook(
    State(state): State<ServerState>,
    Json(payload): Json<WebhookPayload>,
) -> &'static str {
    if payload.action.as_deref() == Some("NOTIFY") {
        handle_notify_relay(&state, &payload).await;
    } else if let Some(message) = &payload.message {
        handle_incoming(&state, message).await;
    }
    "OK"
}

/// Outbound relay for internal callers that cannot reach the Bot API
async fn handle_notify_relay(state: &ServerState, payload: &WebhookPayload) {
    let secret = &state.config.webhook_secret;
    if secret.is_empty() || payload.secret.as_deref() != Some(secret.as_str()) {
        security_log!("WARN", "webhook_relay_denied", reason = "missing or wrong secret");
        return;
    }

    // chat_id arrives as number or string depending on the caller
    let chat_id = match &payload.chat_id {
        Some(serde_json::Value::String(s)) => s.clone(),
        Some(serde_json::Value::Number(n)) => n.to_string(),
        _ => {
            tracing::warn!(target: "notify", "Relay payload without chat_id");
            return;
        }
    };
    let Some(text) = &payload.text else {
        tracing::warn!(target: "notify", "Relay payload without text");
        return;
    };

    reply(state, &chat_id, text).await;
}

/// Inbound Telegram message; only `/start` carries workflow meaning
async fn handle_incoming(state: &ServerState, message: &IncomingMessage) {
    let chat_id = message.chat.id.to_string();
    let first_name = message.chat.first_name.as_deref().unwrap_or("there");
    let text = message.text.as_deref().unwrap_or("").trim();

    let Some(token) = text.strip_prefix("/start") else {
        if !text.is_empty() {
            reply(
                state,
                &chat_id,
                "🤖 I only send automated claim notifications. To follow a claim, open the link your sales agent gave you.",
            )
            .await;
        }
        return;
    };
    let token = token.trim();

    if token.is_empty() {
        reply(
            state,
            &chat_id,
            "⚠️ The claim code is missing. Please open the exact link your sales agent gave you.",
        )
        .await;
        return;
    }

    if let Some(profile_id) = token.strip_prefix("EMP-") {
        link_employee(state, &chat_id, profile_id).await;
    } else {
        link_customer(state, &chat_id, first_name, token).await;
    }
}

/// `/start EMP-<id>` - link an employee chat to their profile
async fn link_employee(state: &ServerState, chat_id: &str, profile_id: &str) {
    let repo = ProfileRepository::new(state.db.clone());
    let linked = repo
        .set_chat_id(&format!("profile:{}", profile_id), chat_id)
        .await;

    match linked {
        Ok(Some(profile)) => {
            tracing::info!(target: "notify", profile = %profile.display_name, "Employee chat linked");
            reply(
                state,
                chat_id,
                &format!(
                    "✅ *Welcome, {}!*\n\nYou will receive claim workflow alerts in this chat.",
                    profile.display_name
                ),
            )
            .await;
        }
        Ok(None) => {
            security_log!("WARN", "employee_link_miss", chat_id = chat_id.to_string());
            reply(
                state,
                chat_id,
                "❌ We could not link this chat. Please ask your administrator for a new link.",
            )
            .await;
        }
        Err(e) => {
            tracing::error!(target: "notify", error = %e, "Employee chat link failed");
        }
    }
}

/// `/start <code>` - link a customer chat to their claim
async fn link_customer(state: &ServerState, chat_id: &str, first_name: &str, token: &str) {
    let code = normalize_code(token);
    let repo = ClaimRepository::new(state.db.clone());

    match repo.set_customer_chat(&code, chat_id).await {
        Ok(Some(claim)) => {
            tracing::info!(target: "notify", code = %claim.code, "Customer chat linked");
            reply(
                state,
                chat_id,
                &format!(
                    "✅ *Linked!*\n\nHi {}, we will keep you posted about your claim *{}* in this chat.",
                    first_name, claim.code
                ),
            )
            .await;
        }
        Ok(None) => {
            reply(
                state,
                chat_id,
                &format!("❌ We could not find a claim with code *{}*. Please check the link with your sales agent.", code),
            )
            .await;
        }
        Err(e) => {
            tracing::error!(target: "notify", error = %e, "Customer chat link failed");
        }
    }
}

/// Best-effort bot reply
async fn reply(state: &ServerState, chat_id: &str, text: &str) {
    if let Err(e) = state.gateway.send(chat_id, text).await {
        tracing::warn!(target: "notify", chat_id = %chat_id, error = %e, "Bot reply failed");
    }
}
