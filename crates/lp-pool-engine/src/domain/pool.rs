//! # Pool Reconciler
//!
//! Derives the remaining quantity of every denomination by replaying the
//! allocation log against the configured initial quantities.
//!
//! ## Invariants
//!
//! - Remaining quantity is never negative. A replay that claims more units
//!   than configured clamps to zero and reports `ReplayAnomaly::Oversubscribed`.
//! - Records whose amount is not configured are ignored for quantity purposes
//!   and reported as `ReplayAnomaly::UnknownAmount`.
//! - `reconcile` is pure: the same inputs always produce the same output.

use std::collections::HashMap;

use serde::Serialize;

use super::entities::{AllocationRecord, Amount, DenominationSpec};

/// Remaining units of one denomination.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct DenominationBalance {
    pub amount: Amount,
    #[serde(rename = "quantity")]
    pub remaining: u32,
}

/// Remaining quantity per denomination, in configuration order.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct PoolState {
    balances: Vec<DenominationBalance>,
}

impl PoolState {
    /// Untouched pool: every denomination at its initial quantity.
    pub fn from_specs(specs: &[DenominationSpec]) -> Self {
        Self {
            balances: specs
                .iter()
                .map(|spec| DenominationBalance {
                    amount: spec.amount,
                    remaining: spec.initial_quantity,
                })
                .collect(),
        }
    }

    pub fn balances(&self) -> &[DenominationBalance] {
        &self.balances
    }

    pub fn remaining(&self, amount: Amount) -> Option<u32> {
        self.balances
            .iter()
            .find(|balance| balance.amount == amount)
            .map(|balance| balance.remaining)
    }

    pub fn total_remaining(&self) -> u64 {
        self.balances
            .iter()
            .map(|balance| u64::from(balance.remaining))
            .sum()
    }

    pub fn is_exhausted(&self) -> bool {
        self.total_remaining() == 0
    }

    /// Amounts that still have at least one unit, in configuration order.
    pub fn available_amounts(&self) -> Vec<Amount> {
        self.balances
            .iter()
            .filter(|balance| balance.remaining > 0)
            .map(|balance| balance.amount)
            .collect()
    }

    /// Take one unit of `amount`. Returns false when none is left.
    pub(crate) fn take_one(&mut self, amount: Amount) -> bool {
        match self
            .balances
            .iter_mut()
            .find(|balance| balance.amount == amount)
        {
            Some(balance) if balance.remaining > 0 => {
                balance.remaining -= 1;
                true
            }
            _ => false,
        }
    }
}

/// Data problem found while replaying the log. Recovered locally.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ReplayAnomaly {
    /// A record references an amount outside the configured set.
    UnknownAmount { amount: Amount },
    /// More records than configured units for a denomination.
    Oversubscribed {
        amount: Amount,
        initial: u32,
        allocated: u64,
    },
}

impl std::fmt::Display for ReplayAnomaly {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReplayAnomaly::UnknownAmount { amount } => {
                write!(f, "record references unconfigured amount {}", amount)
            }
            ReplayAnomaly::Oversubscribed {
                amount,
                initial,
                allocated,
            } => write!(
                f,
                "denomination {} allocated {} times but only {} configured; clamped to 0",
                amount, allocated, initial
            ),
        }
    }
}

/// Result of one full replay.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Reconciliation {
    pub pool: PoolState,
    pub anomalies: Vec<ReplayAnomaly>,
}

/// Replay `records` against `specs`.
pub fn reconcile(specs: &[DenominationSpec], records: &[AllocationRecord]) -> Reconciliation {
    let mut allocated: HashMap<Amount, u64> = specs.iter().map(|spec| (spec.amount, 0)).collect();
    let mut anomalies = Vec::new();

    for record in records {
        match allocated.get_mut(&record.amount) {
            Some(count) => *count += 1,
            None => anomalies.push(ReplayAnomaly::UnknownAmount {
                amount: record.amount,
            }),
        }
    }

    let balances = specs
        .iter()
        .map(|spec| {
            let used = allocated.get(&spec.amount).copied().unwrap_or(0);
            let initial = u64::from(spec.initial_quantity);
            if used > initial {
                anomalies.push(ReplayAnomaly::Oversubscribed {
                    amount: spec.amount,
                    initial: spec.initial_quantity,
                    allocated: used,
                });
            }
            DenominationBalance {
                amount: spec.amount,
                // used <= initial <= u32::MAX here, so the narrowing is lossless
                remaining: initial.saturating_sub(used) as u32,
            }
        })
        .collect();

    Reconciliation {
        pool: PoolState { balances },
        anomalies,
    }
}
