//! Shared types for the claim tracking system
//!
//! Pure domain types used across crates: the claim lifecycle state
//! machine, actor roles, and the common API response envelope.
//! No I/O lives here.

pub mod claim;
pub mod response;
pub mod role;

// Re-exports
pub use claim::{ClaimState, ResolutionType, StatusInfo, TransitionError, Verdict};
pub use response::{ApiResponse, Page, PAGE_SIZE};
pub use role::Role;
pub use serde::{Deserialize, Serialize};
