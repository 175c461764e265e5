//! Claim Model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use surrealdb::RecordId;
use validator::Validate;

use super::profile::ProfileId;
use super::serde_helpers;
use shared::{ClaimState, ResolutionType, Verdict};

/// Claim ID type
pub type ClaimId = RecordId;

/// Claim record
///
/// The central entity of the workflow. `code` is the customer-facing
/// reference, unique and stored uppercased. Lifecycle fields follow
/// the invariants of the state machine in `shared::claim`:
/// `verdict` is set iff the claim left PENDING, the resolution fields
/// are set iff the claim is CLOSED.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claim {
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub id: Option<ClaimId>,
    pub code: String,
    #[serde(default)]
    pub state: ClaimState,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verdict: Option<Verdict>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolution_type: Option<ResolutionType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolution_note: Option<String>,
    pub customer_name: String,
    pub customer_tax_id: String,
    pub customer_phone: String,
    pub reason: String,
    pub created_at: DateTime<Utc>,
    #[serde(with = "serde_helpers::record_id")]
    pub created_by: ProfileId,
    /// Telegram chat the customer linked via the /start deep link
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_chat_id: Option<String>,
}

impl Claim {
    /// Lifecycle field invariants
    ///
    /// verdict set iff state is IN_REVIEW or CLOSED; resolution fields
    /// set iff state is CLOSED and the type matches the verdict table.
    pub fn invariants_hold(&self) -> bool {
        let verdict_ok = match self.state {
            ClaimState::Pending => self.verdict.is_none(),
            ClaimState::InReview | ClaimState::Closed => self.verdict.is_some(),
        };
        let resolution_ok = match self.state {
            ClaimState::Closed => match (self.verdict, self.resolution_type) {
                (Some(v), Some(r)) => {
                    v.allowed_resolutions().contains(&r) && self.resolution_note.is_some()
                }
                _ => false,
            },
            _ => self.resolution_type.is_none() && self.resolution_note.is_none(),
        };
        verdict_ok && resolution_ok
    }
}

/// Create claim payload (Transition 1 input)
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ClaimCreate {
    #[validate(length(min = 1, message = "code must not be empty"))]
    pub code: String,
    #[validate(length(min = 1, message = "customer name must not be empty"))]
    pub customer_name: String,
    #[validate(length(min = 1, message = "customer tax id must not be empty"))]
    pub customer_tax_id: String,
    pub customer_phone: String,
    #[validate(length(min = 1, message = "reason must not be empty"))]
    pub reason: String,
}

/// Derived verdict status for dashboard filtering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerdictStatus {
    /// Still waiting for the lab
    NoVerdict,
    /// Verdict issued (in review or closed)
    HasVerdict,
}

/// List query filter
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ClaimFilter {
    /// Case-insensitive substring match on code or customer name
    pub search: Option<String>,
    /// Filing agent (profile id)
    pub agent: Option<String>,
    /// Derived verdict status
    pub status: Option<VerdictStatus>,
    /// Creation date range (inclusive)
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
    /// 1-based page number
    pub page: Option<u32>,
}
