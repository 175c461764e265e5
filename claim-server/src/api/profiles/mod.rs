//! Profile API Module

mod handler;

use axum::{Router, middleware, routing::get, routing::post};

use crate::auth::require_role;
use crate::core::ServerState;
use shared::Role;

/// Profile router
pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/profiles", routes())
}

fn routes() -> Router<ServerState> {
    // 看板联接：任何已认证角色可以解析建单人显示名
    let read_routes = Router::new().route("/display-names", post(handler::display_names));

    // 目录管理：仅管理员
    let manage_routes = Router::new()
        .route("/", get(handler::list).post(handler::create))
        .layer(middleware::from_fn(require_role(&[Role::Admin])));

    read_routes.merge(manage_routes)
}
