//! Database Models

// Serde helpers
pub mod serde_helpers;

pub mod claim;
pub mod profile;

// Re-exports
pub use claim::{Claim, ClaimCreate, ClaimFilter, ClaimId, VerdictStatus};
pub use profile::{Profile, ProfileCreate, ProfileId};
