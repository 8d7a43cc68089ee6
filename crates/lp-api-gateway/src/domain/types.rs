//! Request and response bodies of the HTTP API.

use lp_pool_engine::domain::format::format_amount;
use lp_pool_engine::{Allocation, AllocationRecord, Amount, PoolState, PoolView};
use serde::{Deserialize, Serialize};

use super::error::messages;

/// `POST /lucky-money` body. Missing fields deserialize as empty and are
/// rejected by validation.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ClaimBody {
    pub name: String,
    pub account_number: String,
    pub bank: String,
}

impl ClaimBody {
    pub fn is_complete(&self) -> bool {
        [&self.name, &self.account_number, &self.bank]
            .iter()
            .all(|field| !field.trim().is_empty())
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClaimResponse {
    pub amount: Amount,
    pub remaining_count: u64,
    pub remaining_denominations: PoolState,
    pub message: &'static str,
}

impl From<Allocation> for ClaimResponse {
    fn from(allocation: Allocation) -> Self {
        Self {
            amount: allocation.amount,
            remaining_count: allocation.remaining_after,
            remaining_denominations: allocation.pool,
            message: messages::SUCCESS,
        }
    }
}

/// One line of the public recipients list.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipientEntry {
    pub timestamp: String,
    pub name: String,
    pub account_number: String,
    pub bank: String,
    /// As written in the log, e.g. `20.000`
    pub amount: String,
    pub ip: String,
}

impl From<&AllocationRecord> for RecipientEntry {
    fn from(record: &AllocationRecord) -> Self {
        Self {
            timestamp: record.timestamp.clone(),
            name: record.claimant_name.clone(),
            account_number: record.account_number.clone(),
            bank: record.bank_name.clone(),
            amount: format_amount(record.amount),
            ip: record.origin_address.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipientsResponse {
    pub recipients: Vec<RecipientEntry>,
    pub remaining_count: u64,
    pub total_recipients: usize,
    pub remaining_denominations: PoolState,
}

impl From<&PoolView> for RecipientsResponse {
    fn from(view: &PoolView) -> Self {
        Self {
            recipients: view.records.iter().map(RecipientEntry::from).collect(),
            remaining_count: view.total_remaining(),
            total_recipients: view.total_recipients(),
            remaining_denominations: view.pool.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}
