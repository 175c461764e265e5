//! Claim API Handlers

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::{Deserialize, Serialize};

use crate::auth::CurrentUser;
use crate::claims::{Actor, LifecycleEngine};
use crate::core::ServerState;
use crate::db::models::{Claim, ClaimCreate, ClaimFilter};
use crate::utils::{AppResponse, AppResult, ok};
use shared::{Page, ResolutionType, Verdict};

fn engine(state: &ServerState) -> LifecycleEngine {
    LifecycleEngine::new(state.db.clone(), state.gateway.clone(), &state.config)
}

/// Filtered, paginated claim list (dashboard)
pub async fn list(
    State(state): State<ServerState>,
    Query(filter): Query<ClaimFilter>,
) -> AppResult<Json<AppResponse<Page<Claim>>>> {
    let page = engine(&state).list_claims(&filter).await?;
    Ok(ok(page))
}

/// Single claim by id
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<AppResponse<Claim>>> {
    let claim = engine(&state).get_claim(&id).await?;
    Ok(ok(claim))
}

/// The calling agent's IN_REVIEW queue (claims awaiting their closure)
pub async fn queue(
    State(state): State<ServerState>,
    user: CurrentUser,
) -> AppResult<Json<AppResponse<Vec<Claim>>>> {
    let claims = engine(&state).agent_queue(&Actor::from(&user)).await?;
    Ok(ok(claims))
}

/// Filed claim plus the deep link the agent hands to the customer
#[derive(Debug, Serialize)]
pub struct ClaimCreated {
    pub claim: Claim,
    /// t.me link the customer opens to receive updates
    pub customer_link: String,
}

/// File a new claim (Transition 1)
pub async fn create(
    State(state): State<ServerState>,
    user: CurrentUser,
    Json(payload): Json<ClaimCreate>,
) -> AppResult<Json<AppResponse<ClaimCreated>>> {
    let claim = engine(&state)
        .file_claim(&Actor::from(&user), payload)
        .await?;
    let customer_link = state.config.claim_deep_link(&claim.code);
    Ok(ok(ClaimCreated {
        claim,
        customer_link,
    }))
}

#[derive(Debug, Deserialize)]
pub struct VerdictRequest {
    pub verdict: Verdict,
}

/// Issue the technical verdict (Transition 2)
pub async fn verdict(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    user: CurrentUser,
    Json(payload): Json<VerdictRequest>,
) -> AppResult<Json<AppResponse<Claim>>> {
    let claim = engine(&state)
        .issue_verdict(&Actor::from(&user), &id, payload.verdict)
        .await?;
    Ok(ok(claim))
}

#[derive(Debug, Deserialize)]
pub struct CloseRequest {
    pub resolution_type: ResolutionType,
    pub resolution_note: String,
}

/// Close the case with its administrative resolution (Transition 3)
pub async fn close(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    user: CurrentUser,
    Json(payload): Json<CloseRequest>,
) -> AppResult<Json<AppResponse<Claim>>> {
    let claim = engine(&state)
        .close_claim(
            &Actor::from(&user),
            &id,
            payload.resolution_type,
            &payload.resolution_note,
        )
        .await?;
    Ok(ok(claim))
}
