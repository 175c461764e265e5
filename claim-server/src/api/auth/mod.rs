//! Session API Module
//!
//! 令牌由外部身份提供方签发；这里只回显校验后的会话信息。

mod handler;

use axum::{Router, routing::post};

use crate::core::ServerState;

/// Session router
pub fn router() -> Router<ServerState> {
    Router::new().route("/api/auth/session", post(handler::session))
}
