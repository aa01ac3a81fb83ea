//! Unified error type for game operations.
//!
//! Every rejection carries an explicit reason so a moderator UI can explain
//! why an action was refused rather than showing a generic fault.

use thiserror::Error;

/// Unified error type for domain operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GameError {
    /// Ruleset data cannot support the requested game (bad headcount,
    /// not enough roles in a group). Fatal to game start; deck building
    /// either fully succeeds or leaves no role assigned.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// A legal entity asked for something the current state forbids
    /// (vote on a closed nomination, sit in an occupied seat, act in the
    /// wrong phase). Rejected with no state change.
    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    /// Unknown room/player/task/correlation id.
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// A setup-task answer was applied against a role that no longer
    /// matches the task's recorded role.
    #[error("Role mismatch: task recorded for {expected}, player now holds {actual}")]
    RoleMismatch { expected: String, actual: String },

    /// Role id absent from the registry.
    #[error("Unknown role: {0}")]
    UnknownRole(String),
}

impl GameError {
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    pub fn invalid_operation(msg: impl Into<String>) -> Self {
        Self::InvalidOperation(msg.into())
    }

    pub fn not_found(entity: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity,
            id: id.into(),
        }
    }

    pub fn role_mismatch(expected: impl Into<String>, actual: impl Into<String>) -> Self {
        Self::RoleMismatch {
            expected: expected.into(),
            actual: actual.into(),
        }
    }

    /// Stable machine-readable code for the transport layer.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Configuration(_) => "configuration_error",
            Self::InvalidOperation(_) => "invalid_operation",
            Self::NotFound { .. } => "not_found",
            Self::RoleMismatch { .. } => "role_mismatch",
            Self::UnknownRole(_) => "unknown_role",
        }
    }
}
