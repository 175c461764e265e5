//! Profile Model

use serde::{Deserialize, Serialize};
use surrealdb::RecordId;
use validator::Validate;

use super::serde_helpers;
use shared::Role;

/// Profile ID type
pub type ProfileId = RecordId;

/// Actor profile
///
/// One row per authenticated identity. The identity provider owns the
/// credentials; this table only holds the workflow-facing directory
/// data (display name, role, optional Telegram link).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub id: Option<ProfileId>,
    pub email: String,
    pub display_name: String,
    pub role: Role,
    /// Telegram chat the employee linked via the EMP- deep link
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chat_id: Option<String>,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

fn default_true() -> bool {
    true
}

/// Create profile payload
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ProfileCreate {
    #[validate(email(message = "invalid email"))]
    pub email: String,
    #[validate(length(min = 1, message = "display name must not be empty"))]
    pub display_name: String,
    pub role: Role,
}
