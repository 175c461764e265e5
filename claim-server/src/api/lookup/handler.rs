//! Public Lookup Handlers

use axum::{
    Json,
    extract::{Path, State},
};

use crate::claims::{LifecycleEngine, PublicStatus};
use crate::core::ServerState;
use crate::utils::{AppError, AppResponse, AppResult, ok};

/// Look up a claim by its customer-facing code (case-insensitive)
///
/// Returns only the friendly status projection. An unknown code gets a
/// neutral not-found; the message never hints whether similar codes
/// exist.
pub async fn lookup(
    State(state): State<ServerState>,
    Path(code): Path<String>,
) -> AppResult<Json<AppResponse<PublicStatus>>> {
    let engine = LifecycleEngine::new(state.db.clone(), state.gateway.clone(), &state.config);
    let status = engine
        .lookup(&code)
        .await?
        .ok_or_else(|| AppError::not_found("No claim found with that code"))?;
    Ok(ok(status))
}
