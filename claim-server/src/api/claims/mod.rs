//! Claim API Module

mod handler;

use axum::{Router, middleware, routing::get, routing::post};

use crate::auth::require_role;
use crate::core::ServerState;
use shared::Role;

/// Claim router
pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/claims", routes())
}

fn routes() -> Router<ServerState> {
    // 读取路由：任何已认证角色 (看板是共享视图)
    let read_routes = Router::new()
        .route("/", get(handler::list))
        .route("/{id}", get(handler::get_by_id));

    // 业务员路由：建单、关闭、个人待办队列
    let sales_routes = Router::new()
        .route("/", post(handler::create))
        .route("/queue", get(handler::queue))
        .route("/{id}/close", post(handler::close))
        .layer(middleware::from_fn(require_role(&[Role::Sales])));

    // 实验室路由：签发技术判定
    let lab_routes = Router::new()
        .route("/{id}/verdict", post(handler::verdict))
        .layer(middleware::from_fn(require_role(&[Role::Lab, Role::Admin])));

    read_routes.merge(sales_routes).merge(lab_routes)
}
