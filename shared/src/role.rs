//! Actor roles

use serde::{Deserialize, Serialize};

/// Workflow role of an authenticated actor
///
/// The role decides which dashboard and which lifecycle transitions
/// an actor may trigger:
///
/// | Role  | May do                         |
/// |-------|--------------------------------|
/// | Sales | file claims, close claims      |
/// | Lab   | issue verdicts                 |
/// | Admin | issue verdicts, manage profiles|
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Sales,
    Lab,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Sales => "SALES",
            Role::Lab => "LAB",
            Role::Admin => "ADMIN",
        }
    }

    /// Parse the wire/storage representation
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "SALES" => Some(Role::Sales),
            "LAB" => Some(Role::Lab),
            "ADMIN" => Some(Role::Admin),
            _ => None,
        }
    }
}
