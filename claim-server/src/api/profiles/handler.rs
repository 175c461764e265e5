//! Profile API Handlers

use std::collections::HashMap;

use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::core::ServerState;
use crate::db::models::{Profile, ProfileCreate};
use crate::db::repository::ProfileRepository;
use crate::utils::{AppError, AppResponse, AppResult, ok};

/// List active profiles (directory view)
pub async fn list(State(state): State<ServerState>) -> AppResult<Json<AppResponse<Vec<Profile>>>> {
    let repo = ProfileRepository::new(state.db.clone());
    let profiles = repo.find_all().await?;
    Ok(ok(profiles))
}

/// Provisioned profile plus the deep link for chat self-linking
#[derive(Debug, Serialize)]
pub struct ProfileCreated {
    pub profile: Profile,
    /// t.me link the employee opens to receive workflow alerts
    pub employee_link: Option<String>,
}

/// Provision a profile (Admin)
pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<ProfileCreate>,
) -> AppResult<Json<AppResponse<ProfileCreated>>> {
    payload
        .validate()
        .map_err(|e| AppError::validation(e.to_string()))?;

    let repo = ProfileRepository::new(state.db.clone());
    let profile = repo.create(payload).await?;
    let employee_link = profile
        .id
        .as_ref()
        .map(|id| state.config.employee_deep_link(&id.key().to_string()));

    Ok(ok(ProfileCreated {
        profile,
        employee_link,
    }))
}

#[derive(Debug, Deserialize)]
pub struct DisplayNamesRequest {
    pub ids: Vec<String>,
}

/// Batch id -> display name resolution for dashboard joins
pub async fn display_names(
    State(state): State<ServerState>,
    Json(payload): Json<DisplayNamesRequest>,
) -> AppResult<Json<AppResponse<HashMap<String, String>>>> {
    let repo = ProfileRepository::new(state.db.clone());
    let profiles = repo.display_names(&payload.ids).await?;
    let names: HashMap<String, String> = profiles
        .into_iter()
        .filter_map(|p| p.id.map(|id| (id.to_string(), p.display_name)))
        .collect();
    Ok(ok(names))
}
