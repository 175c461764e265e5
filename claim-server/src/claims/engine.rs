//! Lifecycle Engine
//!
//! The authority for every claim transition. Each operation takes an
//! explicit [`Actor`] context instead of reading ambient session
//! state, so the engine is deterministic under test.
//!
//! Transition writes are conditional single-statement updates in the
//! repository; the engine's job is the role gate, the resolution
//! table check, and the notification fan-out that follows a commit.

use std::collections::HashMap;
use std::sync::Arc;

use surrealdb::Surreal;
use surrealdb::engine::local::Db;
use validator::Validate;

use crate::auth::CurrentUser;
use crate::core::Config;
use crate::claims::notify;
use crate::db::models::{Claim, ClaimCreate, ClaimFilter};
use crate::db::repository::{ClaimRepository, ProfileRepository, RepoError};
use crate::services::NotificationGateway;
use crate::utils::{AppError, AppResult};
use shared::{ClaimState, Page, PAGE_SIZE, ResolutionType, Role, TransitionError, Verdict, claim};

/// Acting identity for an engine operation
#[derive(Debug, Clone)]
pub struct Actor {
    /// Profile id ("profile:xxx")
    pub id: String,
    pub display_name: String,
    pub role: Role,
}

impl From<&CurrentUser> for Actor {
    fn from(user: &CurrentUser) -> Self {
        Self {
            id: user.id.clone(),
            display_name: user.display_name.clone(),
            role: user.role,
        }
    }
}

/// Claim lifecycle engine
#[derive(Clone)]
pub struct LifecycleEngine {
    claims: ClaimRepository,
    profiles: ProfileRepository,
    gateway: Arc<dyn NotificationGateway>,
    restrict_close_to_filer: bool,
}

impl LifecycleEngine {
    pub fn new(
        db: Surreal<Db>,
        gateway: Arc<dyn NotificationGateway>,
        config: &Config,
    ) -> Self {
        Self {
            claims: ClaimRepository::new(db.clone()),
            profiles: ProfileRepository::new(db),
            gateway,
            restrict_close_to_filer: config.restrict_close_to_filer,
        }
    }

    // ========== Transitions ==========

    /// Transition 1 - file a claim (Sales)
    ///
    /// Creates the claim in PENDING and alerts the lab roster.
    pub async fn file_claim(&self, actor: &Actor, data: ClaimCreate) -> AppResult<Claim> {
        require_role(actor, &[Role::Sales])?;
        data.validate()
            .map_err(|e| AppError::validation(e.to_string()))?;

        let created_by = actor
            .id
            .parse()
            .map_err(|_| AppError::validation(format!("Invalid actor id: {}", actor.id)))?;
        let claim = self.claims.create(data, created_by).await?;

        // Best-effort alert to every lab profile with a linked chat
        let text = notify::new_claim_alert(
            &claim.code,
            &claim.customer_name,
            &actor.display_name,
            &claim.reason,
        );
        let recipients = self
            .lab_recipients(&text)
            .await
            .unwrap_or_else(|e| {
                tracing::warn!(target: "notify", error = %e, "Failed to load lab roster");
                Vec::new()
            });
        notify::fan_out(&self.gateway, recipients).await;

        Ok(claim)
    }

    /// Transition 2 - issue verdict (Lab or Admin)
    ///
    /// `PENDING -> IN_REVIEW`; the conditional update in the
    /// repository guarantees exactly one of two concurrent verdicts
    /// wins, the loser surfaces `InvalidState`.
    pub async fn issue_verdict(
        &self,
        actor: &Actor,
        claim_id: &str,
        verdict: Verdict,
    ) -> AppResult<Claim> {
        require_role(actor, &[Role::Lab, Role::Admin])?;

        let current = self
            .claims
            .find_by_id(claim_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Claim {} not found", claim_id)))?;
        claim::check_issue_verdict(current.state)?;

        let id = current
            .id
            .clone()
            .ok_or_else(|| AppError::internal("Claim record without id"))?;
        let updated = self.claims.issue_verdict(&id, verdict).await?;

        // Customer first, then the filing agent; both best-effort
        let mut recipients = Vec::new();
        if let Some(chat_id) = &updated.customer_chat_id {
            recipients.push((
                chat_id.clone(),
                notify::verdict_customer_message(&updated.code, verdict),
            ));
        }
        match self.profiles.find_by_id(&updated.created_by.to_string()).await {
            Ok(Some(agent)) => {
                if let Some(chat_id) = &agent.chat_id {
                    recipients.push((
                        chat_id.clone(),
                        notify::verdict_agent_message(&updated.code, verdict),
                    ));
                }
            }
            Ok(None) => {}
            Err(e) => {
                tracing::warn!(target: "notify", error = %e, "Failed to resolve filing agent");
            }
        }
        notify::fan_out(&self.gateway, recipients).await;

        Ok(updated)
    }

    /// Transition 3 - close the case (Sales)
    ///
    /// `IN_REVIEW -> CLOSED`; the resolution type must belong to the
    /// stored verdict's allowed set and the note must be non-empty.
    pub async fn close_claim(
        &self,
        actor: &Actor,
        claim_id: &str,
        resolution_type: ResolutionType,
        resolution_note: &str,
    ) -> AppResult<Claim> {
        require_role(actor, &[Role::Sales])?;

        let current = self
            .claims
            .find_by_id(claim_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Claim {} not found", claim_id)))?;

        // A claim in review always carries a verdict; without one the
        // claim never left PENDING and the state error applies
        let Some(verdict) = current.verdict else {
            if current.state == ClaimState::InReview {
                return Err(AppError::internal("Claim in review without verdict"));
            }
            return Err(TransitionError::InvalidState {
                expected: ClaimState::InReview.as_str(),
                actual: current.state.as_str(),
            }
            .into());
        };
        claim::check_close(current.state, verdict, resolution_type, resolution_note)?;

        if self.restrict_close_to_filer && current.created_by.to_string() != actor.id {
            return Err(AppError::forbidden(
                "Only the filing agent may close this claim",
            ));
        }

        let id = current
            .id
            .clone()
            .ok_or_else(|| AppError::internal("Claim record without id"))?;
        let updated = self
            .claims
            .close(&id, resolution_type, resolution_note.trim().to_string())
            .await?;

        let text = notify::close_summary(
            &updated.code,
            resolution_type,
            updated.resolution_note.as_deref().unwrap_or(""),
        );
        let recipients = self
            .lab_recipients(&text)
            .await
            .unwrap_or_else(|e| {
                tracing::warn!(target: "notify", error = %e, "Failed to load lab roster");
                Vec::new()
            });
        notify::fan_out(&self.gateway, recipients).await;

        Ok(updated)
    }

    // ========== Queries ==========

    /// Filtered, paginated dashboard list
    pub async fn list_claims(&self, filter: &ClaimFilter) -> AppResult<Page<Claim>> {
        let page = filter.page.unwrap_or(1).max(1);
        let (claims, total) = self.claims.list(filter).await?;
        Ok(Page::new(claims, total, page, PAGE_SIZE))
    }

    /// Single claim by id
    pub async fn get_claim(&self, claim_id: &str) -> AppResult<Claim> {
        self.claims
            .find_by_id(claim_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Claim {} not found", claim_id)))
    }

    /// The acting agent's IN_REVIEW queue
    pub async fn agent_queue(&self, actor: &Actor) -> AppResult<Vec<Claim>> {
        require_role(actor, &[Role::Sales])?;
        let agent = actor
            .id
            .parse()
            .map_err(|_| AppError::validation(format!("Invalid actor id: {}", actor.id)))?;
        Ok(self.claims.in_review_for_agent(&agent).await?)
    }

    /// Batch id -> display name map for dashboard joins
    pub async fn resolve_display_names(
        &self,
        ids: &[String],
    ) -> AppResult<HashMap<String, String>> {
        let profiles = self.profiles.display_names(ids).await?;
        Ok(profiles
            .into_iter()
            .filter_map(|p| p.id.map(|id| (id.to_string(), p.display_name)))
            .collect())
    }

    /// Public lookup by code (unauthenticated projection)
    ///
    /// Returns only the code, the friendly status text, and the
    /// filing date; never agent identity or customer contact data.
    pub async fn lookup(&self, code: &str) -> AppResult<Option<PublicStatus>> {
        let claim = match self.claims.find_by_code(code).await? {
            Some(c) => c,
            None => return Ok(None),
        };

        let status = shared::claim::public_status(
            claim.state,
            claim.verdict,
            claim.resolution_type,
            claim.resolution_note.as_deref(),
        );
        Ok(Some(PublicStatus {
            code: claim.code,
            state: claim.state,
            status,
            created_at: claim.created_at,
        }))
    }

    // ========== Helpers ==========

    /// Pair the lab roster's chat ids with `text`
    async fn lab_recipients(&self, text: &str) -> Result<Vec<(String, String)>, RepoError> {
        let roster = self.profiles.notifiable_by_role(Role::Lab).await?;
        Ok(roster
            .into_iter()
            .filter_map(|p| p.chat_id)
            .map(|chat_id| (chat_id, text.to_string()))
            .collect())
    }
}

/// Customer-facing lookup result
#[derive(Debug, Clone, serde::Serialize)]
pub struct PublicStatus {
    pub code: String,
    pub state: ClaimState,
    pub status: shared::StatusInfo,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

fn require_role(actor: &Actor, allowed: &[Role]) -> AppResult<()> {
    if !allowed.contains(&actor.role) {
        return Err(AppError::forbidden(format!(
            "Role {} may not perform this operation",
            actor.role.as_str()
        )));
    }
    Ok(())
}
