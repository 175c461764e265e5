//! Public Lookup API Module
//!
//! 客户自助查询接口，无需认证。

mod handler;

use axum::{Router, routing::get};

use crate::core::ServerState;

/// Public lookup router
pub fn router() -> Router<ServerState> {
    Router::new().route("/api/public/claims/{code}", get(handler::lookup))
}
