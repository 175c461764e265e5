//! Claim lifecycle state machine
//!
//! A claim moves forward through exactly three states:
//!
//! ```text
//! PENDING ──verdict──> IN_REVIEW ──resolution──> CLOSED
//! ```
//!
//! No backward transitions, no skipping. The verdict is fixed when
//! the lab moves the claim into review; the resolution is fixed when
//! the sales agent closes the case, and its allowed values depend on
//! the stored verdict.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Claim lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ClaimState {
    #[default]
    Pending,
    InReview,
    Closed,
}

impl ClaimState {
    /// Wire/storage representation ("PENDING", "IN_REVIEW", "CLOSED")
    pub fn as_str(&self) -> &'static str {
        match self {
            ClaimState::Pending => "PENDING",
            ClaimState::InReview => "IN_REVIEW",
            ClaimState::Closed => "CLOSED",
        }
    }
}

/// Lab verdict on a claim
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Verdict {
    Approved,
    Rejected,
}

impl Verdict {
    pub fn as_str(&self) -> &'static str {
        match self {
            Verdict::Approved => "APPROVED",
            Verdict::Rejected => "REJECTED",
        }
    }

    /// Resolution types a sales agent may close with, given this verdict
    pub fn allowed_resolutions(&self) -> &'static [ResolutionType] {
        match self {
            Verdict::Approved => &[
                ResolutionType::CreditNote,
                ResolutionType::ProductExchange,
                ResolutionType::Other,
            ],
            Verdict::Rejected => &[ResolutionType::DefinitiveRejection, ResolutionType::Other],
        }
    }
}

/// Commercial resolution applied at close
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ResolutionType {
    CreditNote,
    ProductExchange,
    DefinitiveRejection,
    Other,
}

impl ResolutionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResolutionType::CreditNote => "CREDIT_NOTE",
            ResolutionType::ProductExchange => "PRODUCT_EXCHANGE",
            ResolutionType::DefinitiveRejection => "DEFINITIVE_REJECTION",
            ResolutionType::Other => "OTHER",
        }
    }

    /// Human-readable label for customer-facing text
    pub fn label(&self) -> &'static str {
        match self {
            ResolutionType::CreditNote => "credit note",
            ResolutionType::ProductExchange => "product exchange",
            ResolutionType::DefinitiveRejection => "definitive rejection",
            ResolutionType::Other => "other",
        }
    }
}

/// Rejected lifecycle transitions
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransitionError {
    #[error("invalid state: expected {expected}, claim is {actual}")]
    InvalidState {
        expected: &'static str,
        actual: &'static str,
    },

    #[error("resolution {resolution} is not allowed for verdict {verdict}")]
    InvalidResolution {
        verdict: &'static str,
        resolution: &'static str,
    },

    #[error("resolution note must not be empty")]
    EmptyNote,
}

/// Guard for `PENDING -> IN_REVIEW` (issue verdict)
pub fn check_issue_verdict(current: ClaimState) -> Result<(), TransitionError> {
    match current {
        ClaimState::Pending => Ok(()),
        other => Err(TransitionError::InvalidState {
            expected: ClaimState::Pending.as_str(),
            actual: other.as_str(),
        }),
    }
}

/// Guard for `IN_REVIEW -> CLOSED` (close case)
///
/// Validates the state, the verdict/resolution compatibility table,
/// and that the justification note is non-empty.
pub fn check_close(
    current: ClaimState,
    verdict: Verdict,
    resolution: ResolutionType,
    note: &str,
) -> Result<(), TransitionError> {
    if current != ClaimState::InReview {
        return Err(TransitionError::InvalidState {
            expected: ClaimState::InReview.as_str(),
            actual: current.as_str(),
        });
    }
    if !verdict.allowed_resolutions().contains(&resolution) {
        return Err(TransitionError::InvalidResolution {
            verdict: verdict.as_str(),
            resolution: resolution.as_str(),
        });
    }
    if note.trim().is_empty() {
        return Err(TransitionError::EmptyNote);
    }
    Ok(())
}

/// Normalize a claim code for storage and lookup (trim + uppercase)
pub fn normalize_code(code: &str) -> String {
    code.trim().to_uppercase()
}

/// Customer-facing status projection
///
/// Derived purely from `(state, verdict)` plus the resolution fields
/// once closed. Carries no agent identity or internal identifiers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusInfo {
    pub title: String,
    pub description: String,
}

/// Build the public status text for a claim
pub fn public_status(
    state: ClaimState,
    verdict: Option<Verdict>,
    resolution_type: Option<ResolutionType>,
    resolution_note: Option<&str>,
) -> StatusInfo {
    match (state, verdict) {
        (ClaimState::Pending, _) => StatusInfo {
            title: "Claim received".into(),
            description: "Your case is in our system and is awaiting review by the quality lab."
                .into(),
        },
        (ClaimState::InReview, Some(Verdict::Approved)) => StatusInfo {
            title: "Approved by quality".into(),
            description:
                "The lab confirmed the issue. A sales agent is preparing your commercial resolution."
                    .into(),
        },
        (ClaimState::InReview, Some(Verdict::Rejected)) => StatusInfo {
            title: "Analysis finished".into(),
            description:
                "The lab reviewed your product. The preliminary verdict is that the claim does not qualify. An agent will contact you with the details."
                    .into(),
        },
        (ClaimState::Closed, Some(Verdict::Approved)) => {
            let mut description = match resolution_type {
                Some(r) => format!("Case resolved. Applied solution: {}.", r.label()),
                None => "Case resolved.".to_string(),
            };
            if let Some(note) = resolution_note
                && !note.trim().is_empty()
            {
                description.push_str(&format!(" Agent note: \"{}\"", note.trim()));
            }
            StatusInfo {
                title: "Case resolved".into(),
                description,
            }
        }
        (ClaimState::Closed, _) => StatusInfo {
            title: "Claim closed".into(),
            description:
                "The claim was definitively rejected after the technical and commercial evaluation."
                    .into(),
        },
        // A verdict-less IN_REVIEW claim cannot be produced by the
        // lifecycle engine; keep the projection total anyway.
        (ClaimState::InReview, None) => StatusInfo {
            title: "Under review".into(),
            description: "Your case is being reviewed by the quality lab.".into(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_issue_verdict_only_from_pending() {
        assert!(check_issue_verdict(ClaimState::Pending).is_ok());
        assert!(matches!(
            check_issue_verdict(ClaimState::InReview),
            Err(TransitionError::InvalidState { .. })
        ));
        assert!(matches!(
            check_issue_verdict(ClaimState::Closed),
            Err(TransitionError::InvalidState { .. })
        ));
    }

    #[test]
    fn test_close_requires_in_review() {
        let err = check_close(
            ClaimState::Pending,
            Verdict::Approved,
            ResolutionType::CreditNote,
            "note",
        )
        .unwrap_err();
        assert!(matches!(err, TransitionError::InvalidState { .. }));

        let err = check_close(
            ClaimState::Closed,
            Verdict::Approved,
            ResolutionType::CreditNote,
            "note",
        )
        .unwrap_err();
        assert!(matches!(err, TransitionError::InvalidState { .. }));
    }

    #[test]
    fn test_resolution_must_match_verdict() {
        // Rejected verdict cannot close with a credit note
        let err = check_close(
            ClaimState::InReview,
            Verdict::Rejected,
            ResolutionType::CreditNote,
            "note",
        )
        .unwrap_err();
        assert_eq!(
            err,
            TransitionError::InvalidResolution {
                verdict: "REJECTED",
                resolution: "CREDIT_NOTE",
            }
        );

        // OTHER is valid for both verdicts
        assert!(check_close(
            ClaimState::InReview,
            Verdict::Rejected,
            ResolutionType::Other,
            "commercial courtesy",
        )
        .is_ok());
        assert!(check_close(
            ClaimState::InReview,
            Verdict::Approved,
            ResolutionType::ProductExchange,
            "replaced unit",
        )
        .is_ok());
    }

    #[test]
    fn test_close_rejects_empty_note() {
        let err = check_close(
            ClaimState::InReview,
            Verdict::Approved,
            ResolutionType::CreditNote,
            "   ",
        )
        .unwrap_err();
        assert_eq!(err, TransitionError::EmptyNote);
    }

    #[test]
    fn test_normalize_code() {
        assert_eq!(normalize_code("  abc001 "), "ABC001");
        assert_eq!(normalize_code("prod-falla-002"), "PROD-FALLA-002");
    }

    #[test]
    fn test_state_serde_wire_format() {
        assert_eq!(
            serde_json::to_string(&ClaimState::InReview).unwrap(),
            "\"IN_REVIEW\""
        );
        assert_eq!(
            serde_json::from_str::<Verdict>("\"APPROVED\"").unwrap(),
            Verdict::Approved
        );
        assert_eq!(
            serde_json::to_string(&ResolutionType::CreditNote).unwrap(),
            "\"CREDIT_NOTE\""
        );
    }

    #[test]
    fn test_public_status_pending() {
        let info = public_status(ClaimState::Pending, None, None, None);
        assert_eq!(info.title, "Claim received");
        assert!(info.description.contains("quality lab"));
    }

    #[test]
    fn test_public_status_closed_approved_includes_resolution() {
        let info = public_status(
            ClaimState::Closed,
            Some(Verdict::Approved),
            Some(ResolutionType::ProductExchange),
            Some("replaced unit"),
        );
        assert_eq!(info.title, "Case resolved");
        assert!(info.description.contains("product exchange"));
        assert!(info.description.contains("replaced unit"));
    }

    #[test]
    fn test_public_status_closed_rejected_hides_note() {
        let info = public_status(
            ClaimState::Closed,
            Some(Verdict::Rejected),
            Some(ResolutionType::DefinitiveRejection),
            Some("internal justification"),
        );
        assert_eq!(info.title, "Claim closed");
        assert!(!info.description.contains("internal justification"));
    }
}
