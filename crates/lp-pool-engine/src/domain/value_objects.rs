//! Values handed out by the engine: claim results and read snapshots.

use serde::Serialize;

use super::entities::{AllocationRecord, Amount};
use super::pool::PoolState;

/// A successful claim.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Allocation {
    pub amount: Amount,
    /// Total units left across all denominations after this claim.
    pub remaining_after: u64,
    /// Per-denomination remaining quantities after this claim.
    pub pool: PoolState,
}

/// Last-committed state, copied out for display.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PoolView {
    /// All allocations, oldest first.
    pub records: Vec<AllocationRecord>,
    pub pool: PoolState,
}

impl PoolView {
    pub fn total_remaining(&self) -> u64 {
        self.pool.total_remaining()
    }

    pub fn total_recipients(&self) -> usize {
        self.records.len()
    }
}

/// What a reload found.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ReloadSummary {
    pub records: usize,
    pub identities: usize,
    pub total_remaining: u64,
    pub anomalies: usize,
}
