//! Claim lifecycle engine
//!
//! Validates and applies lifecycle transitions, enforces role gates,
//! and fans out the notifications each transition requires.

pub mod engine;
pub mod notify;

pub use engine::{Actor, LifecycleEngine, PublicStatus};
