//! Shared result and error types for Herald
//!
//! Four expected failure modes surface synchronously to the caller:
//! validation, policy violation, not-found, and invalid-status. Unexpected
//! failures from injected stores and policies propagate unchanged through
//! [`HeraldError::Internal`]; Herald adds no retry logic of its own.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A single validation finding: machine-readable code, human-readable
/// message, and the path of the offending field (e.g. `targets[3].id`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationIssue {
    pub code: String,
    pub message: String,
    pub path: String,
}

impl ValidationIssue {
    pub fn new(code: &str, message: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            code: code.to_string(),
            message: message.into(),
            path: path.into(),
        }
    }
}

impl std::fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} [{}]: {}", self.path, self.code, self.message)
    }
}

/// Error type for all Herald operations
#[derive(Debug, Error)]
pub enum HeraldError {
    /// Input failed validation; no state was touched. Fix the input and retry.
    #[error("validation failed with {} issue(s)", .0.len())]
    Validation(Vec<ValidationIssue>),

    /// A governance check rejected a named entity; the whole operation
    /// aborted with no partial effects.
    #[error("policy violation for {entity}: {reason}")]
    PolicyViolation { entity: String, reason: String },

    /// Referenced record does not exist
    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },

    /// A state-machine transition was attempted from a non-permitted state
    #[error("invalid status: {0}")]
    InvalidStatus(String),

    /// Unexpected failure from an injected store or policy, passed through
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl HeraldError {
    /// Build a not-found error for a record kind and id
    pub fn not_found(kind: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            kind,
            id: id.into(),
        }
    }

    /// Build a policy violation naming the offending entity
    pub fn policy(entity: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::PolicyViolation {
            entity: entity.into(),
            reason: reason.into(),
        }
    }
}

/// Convenience result alias used throughout the crate
pub type Result<T> = std::result::Result<T, HeraldError>;
