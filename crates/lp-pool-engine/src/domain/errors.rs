//! # Domain Errors
//!
//! Error types for the allocation engine.
//!
//! ## Taxonomy
//!
//! | Kind | Type | Surfaced to caller |
//! |------|------|--------------------|
//! | Validation rejection | `RejectReason` | Yes, as a normal outcome |
//! | Persistence failure | `LogStoreError` | Yes, claim fails |
//! | Data anomaly | `ReplayAnomaly` (see `pool`) | No, logged and skipped |

use thiserror::Error;

use super::entities::Amount;

/// Why a claim was turned away. These are user-facing outcomes, not faults.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RejectReason {
    /// The origin address already received an allocation.
    OriginAlreadyUsed,
    /// No denomination has units left.
    PoolExhausted,
    /// The `(name, account, bank)` tuple already received an allocation.
    IdentityAlreadyClaimed,
}

impl RejectReason {
    pub const fn as_str(&self) -> &'static str {
        match self {
            RejectReason::OriginAlreadyUsed => "origin already used",
            RejectReason::PoolExhausted => "pool exhausted",
            RejectReason::IdentityAlreadyClaimed => "identity already claimed",
        }
    }
}

impl std::fmt::Display for RejectReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Failure of the durable allocation log or the snapshot file.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LogStoreError {
    #[error("log store I/O error during {operation}: {message}")]
    Io {
        operation: &'static str,
        message: String,
    },
}

impl LogStoreError {
    pub fn io(operation: &'static str, err: impl std::fmt::Display) -> Self {
        LogStoreError::Io {
            operation,
            message: err.to_string(),
        }
    }
}

/// Outcome of a claim that did not produce an allocation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClaimError {
    #[error("claim rejected: {0}")]
    Rejected(RejectReason),

    /// The append did not complete; no in-memory state was touched.
    #[error("persistence failure: {0}")]
    Persistence(#[source] LogStoreError),
}

impl ClaimError {
    /// Short machine-readable reason.
    pub fn reason(&self) -> &'static str {
        match self {
            ClaimError::Rejected(reason) => reason.as_str(),
            ClaimError::Persistence(_) => "persistence failure",
        }
    }

    pub fn is_rejection(&self) -> bool {
        matches!(self, ClaimError::Rejected(_))
    }
}

impl From<RejectReason> for ClaimError {
    fn from(reason: RejectReason) -> Self {
        ClaimError::Rejected(reason)
    }
}

/// Invalid pool configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("pool has no denominations")]
    NoDenominations,

    #[error("denomination amount must be positive")]
    ZeroAmount,

    #[error("denomination {0} configured more than once")]
    DuplicateAmount(Amount),

    #[error("invalid denomination entry '{0}' (expected amount:quantity)")]
    InvalidEntry(String),
}
