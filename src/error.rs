//! Pipeline error taxonomy
//!
//! Upstream-data problems (bad index records) and per-call decode failures
//! never reach this type: they are filtered or defaulted where they happen.
//! What remains is caller input, transport and structural failures.

use thiserror::Error;

/// Errors surfaced by the vault pipeline and its entry points.
///
/// Payloads are plain strings so the error is `Clone`: one failed in-flight
/// pipeline run is shared by every caller waiting on the same cache key.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VaultError {
    #[error("Expected a valid vault address, got {0:?}")]
    InvalidAddress(String),

    #[error("Requested address {0} not recognized as a yearn vault")]
    NotFound(String),

    #[error("Index service request failed: {0}")]
    Index(String),

    #[error("Multicall batch failed: {0}")]
    Multicall(String),

    #[error("Vault {address} violates structural invariant: {reason}")]
    Invariant { address: String, reason: String },
}

impl From<reqwest::Error> for VaultError {
    fn from(err: reqwest::Error) -> Self {
        VaultError::Index(err.to_string())
    }
}

impl From<alloy_transport::TransportError> for VaultError {
    fn from(err: alloy_transport::TransportError) -> Self {
        VaultError::Multicall(err.to_string())
    }
}

impl VaultError {
    /// Whether the error came from caller input rather than the pipeline.
    pub fn is_caller_error(&self) -> bool {
        matches!(self, VaultError::InvalidAddress(_) | VaultError::NotFound(_))
    }
}
