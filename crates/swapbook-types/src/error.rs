//! Error types for the SwapBook matching kernel.
//!
//! All errors use the `SB_ERR_` prefix convention for easy grepping in logs.
//! Error codes are grouped by subsystem:
//! - 1xx: Order errors
//! - 4xx: Block height source errors
//! - 5xx: Matching errors
//! - 9xx: General / internal errors
//!
//! Skipped, zero-amount and expired orders are not errors: the engine logs
//! and drops them.

use thiserror::Error;

/// Central error enum for all SwapBook operations.
#[derive(Debug, Error)]
pub enum SwapbookError {
    // =================================================================
    // Order Errors (1xx)
    // =================================================================
    /// The order failed validation (bad amounts, same token on both legs).
    #[error("SB_ERR_100: Invalid order: {reason}")]
    InvalidOrder { reason: String },

    // =================================================================
    // Block Height Source Errors (4xx)
    // =================================================================
    /// The injected height source failed to report the current height.
    #[error("SB_ERR_400: Block height source failed: {reason}")]
    HeightSourceFailed { reason: String },

    /// The chain follower feeding a watched height source has shut down.
    #[error("SB_ERR_401: Block height source closed")]
    HeightSourceClosed,

    // =================================================================
    // Matching Errors (5xx)
    // =================================================================
    /// Cross-node determinism check failed.
    #[error("SB_ERR_501: Determinism violation: expected {expected}, got {actual}")]
    DeterminismViolation { expected: String, actual: String },

    // =================================================================
    // General / Internal (9xx)
    // =================================================================
    /// Unrecoverable internal error.
    #[error("SB_ERR_900: Internal error: {0}")]
    Internal(String),

    /// Serialization / deserialization error.
    #[error("SB_ERR_901: Serialization error: {0}")]
    Serialization(String),

    /// Configuration error (invalid config document, missing fields, etc.).
    #[error("SB_ERR_902: Configuration error: {0}")]
    Configuration(String),
}

/// Crate-wide `Result` alias.
pub type Result<T> = std::result::Result<T, SwapbookError>;

impl From<serde_json::Error> for SwapbookError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}
