//! Error taxonomy for the case analysis service

use serde::{Deserialize, Serialize};

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, AnalysisError>;

/// A single request-field validation issue
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FieldIssue {
    pub field: String,
    pub message: String,
}

impl FieldIssue {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Service error taxonomy
///
/// Degraded mode (precedent index unconfigured) is deliberately not a
/// variant here: it is a first-class success-status response shape, built
/// by the handler, not an error.
#[derive(Debug, thiserror::Error)]
pub enum AnalysisError {
    #[error("authentication required")]
    Unauthorized,

    #[error("invalid request")]
    Validation(Vec<FieldIssue>),

    #[error("{0} not found")]
    NotFound(String),

    #[error("upstream call failed: {0}")]
    Upstream(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl AnalysisError {
    /// Single-field validation error
    pub fn invalid(field: &str, message: &str) -> Self {
        Self::Validation(vec![FieldIssue::new(field, message)])
    }
}
