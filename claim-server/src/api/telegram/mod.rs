//! Telegram Webhook API Module
//!
//! Bot 入站消息和 NOTIFY 中继的单一入口，无需 JWT 认证：
//! 入站消息来自 Telegram 本身，NOTIFY 中继用 payload 里的共享密钥校验。

mod handler;

use axum::{Router, routing::post};

use crate::core::ServerState;

/// Telegram webhook router
pub fn router() -> Router<ServerState> {
    Router::new().route("/api/telegram/webhook", post(handler::webhook))
}
