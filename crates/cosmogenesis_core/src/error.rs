//! Error types for the simulation kernel.
//!
//! Sub-modules raise these to the orchestrator; the HTTP layer maps them
//! onto status codes.

use thiserror::Error;

/// Main error type for simulation operations.
#[derive(Error, Debug)]
pub enum SimError {
    /// Malformed input (bad difficulty, non-numeric steps, missing ids)
    #[error("Validation error: {0}")]
    Validation(String),

    /// Universe or anomaly id unknown
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Operation disallowed by current state
    #[error("Operation not allowed: {0}")]
    BusinessRule(String),

    /// Run cancelled between ticks; nothing was persisted
    #[error("Simulation cancelled: {0}")]
    Cancelled(String),

    /// Unexpected failure
    #[error("Internal simulation error: {0}")]
    Internal(String),
}

/// Result type alias for simulation operations.
pub type Result<T> = std::result::Result<T, SimError>;

impl SimError {
    #[must_use]
    pub fn validation<S: Into<String>>(msg: S) -> Self {
        Self::Validation(msg.into())
    }

    #[must_use]
    pub fn not_found<S: Into<String>>(resource: S) -> Self {
        Self::NotFound(resource.into())
    }

    #[must_use]
    pub fn business_rule<S: Into<String>>(msg: S) -> Self {
        Self::BusinessRule(msg.into())
    }
}
