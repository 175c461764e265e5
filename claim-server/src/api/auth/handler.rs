//! Session API Handlers

use axum::{Json, extract::State};
use serde::Serialize;

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::repository::ProfileRepository;
use crate::utils::{AppResponse, AppResult, ok};
use shared::Role;

/// Session info echoed back to the dashboard after login
#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub id: String,
    pub email: String,
    pub display_name: String,
    pub role: Role,
    /// Whether the employee has linked their Telegram chat
    pub chat_linked: bool,
}

/// Validate the bearer token and return the caller's session info
///
/// The auth middleware has already verified the JWT; this handler adds
/// the directory-side details the dashboard needs at startup.
pub async fn session(
    State(state): State<ServerState>,
    user: CurrentUser,
) -> AppResult<Json<AppResponse<SessionResponse>>> {
    let repo = ProfileRepository::new(state.db.clone());
    let chat_linked = repo
        .find_by_id(&user.id)
        .await
        .ok()
        .flatten()
        .is_some_and(|p| p.chat_id.is_some());

    Ok(ok(SessionResponse {
        id: user.id,
        email: user.email,
        display_name: user.display_name,
        role: user.role,
        chat_linked,
    }))
}
