//! Core entities of the allocation engine.
//!
//! `AllocationRecord` is the only durable entity; everything else here is
//! either fixed configuration (`DenominationSpec`) or a value derived from
//! the record sequence.

use serde::Serialize;

/// Monetary amount of one denomination, in VND.
pub type Amount = u64;

/// One configured denomination and the number of units it starts with.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DenominationSpec {
    /// Face value. Strictly positive and unique within a pool.
    pub amount: Amount,
    /// Units available before any allocation.
    pub initial_quantity: u32,
}

impl DenominationSpec {
    pub const fn new(amount: Amount, initial_quantity: u32) -> Self {
        Self {
            amount,
            initial_quantity,
        }
    }
}

/// Uniqueness key of a claimant.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ClaimantIdentity {
    pub name: String,
    pub account_number: String,
    pub bank_name: String,
}

/// One successful allocation, exactly as persisted in the allocation log.
///
/// Immutable once written. The engine never edits or deletes records; an
/// operator may, and the engine re-derives its state when that happens.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AllocationRecord {
    /// Local wall-clock time of the claim, in the log's textual form.
    pub timestamp: String,
    pub claimant_name: String,
    pub account_number: String,
    pub bank_name: String,
    pub amount: Amount,
    pub origin_address: String,
}

impl AllocationRecord {
    /// Identity tuple used for deduplication.
    pub fn identity(&self) -> ClaimantIdentity {
        ClaimantIdentity {
            name: self.claimant_name.clone(),
            account_number: self.account_number.clone(),
            bank_name: self.bank_name.clone(),
        }
    }
}

/// Inbound claim.
///
/// Control characters in any field are replaced by spaces on construction:
/// a line break inside a field would otherwise forge an extra log line.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClaimRequest {
    pub name: String,
    pub account_number: String,
    pub bank_name: String,
    pub origin_address: String,
}

impl ClaimRequest {
    pub fn new(
        name: impl Into<String>,
        account_number: impl Into<String>,
        bank_name: impl Into<String>,
        origin_address: impl Into<String>,
    ) -> Self {
        Self {
            name: sanitize_field(name.into()),
            account_number: sanitize_field(account_number.into()),
            bank_name: sanitize_field(bank_name.into()),
            origin_address: sanitize_field(origin_address.into()),
        }
    }

    pub fn identity(&self) -> ClaimantIdentity {
        ClaimantIdentity {
            name: self.name.clone(),
            account_number: self.account_number.clone(),
            bank_name: self.bank_name.clone(),
        }
    }
}

fn sanitize_field(value: String) -> String {
    if value.chars().any(char::is_control) {
        value
            .chars()
            .map(|c| if c.is_control() { ' ' } else { c })
            .collect()
    } else {
        value
    }
}
