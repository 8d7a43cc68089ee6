//! # Pool Configuration
//!
//! The ordered denomination set is fixed for the lifetime of a run. Amounts
//! are validated to be positive and pairwise distinct when the config is
//! built, so every later lookup by amount is unambiguous.

use std::collections::HashSet;

use super::entities::{Amount, DenominationSpec};
use super::errors::ConfigError;

/// The Tết 2025 pool the service shipped with.
pub const DEFAULT_DENOMINATIONS: [DenominationSpec; 5] = [
    DenominationSpec::new(500_000, 1),
    DenominationSpec::new(100_000, 1),
    DenominationSpec::new(50_000, 1),
    DenominationSpec::new(20_000, 10),
    DenominationSpec::new(10_000, 15),
];

/// Validated, ordered denomination set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolConfig {
    denominations: Vec<DenominationSpec>,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            denominations: DEFAULT_DENOMINATIONS.to_vec(),
        }
    }
}

impl PoolConfig {
    /// Build a config, rejecting empty pools, zero amounts and duplicates.
    pub fn new(denominations: Vec<DenominationSpec>) -> Result<Self, ConfigError> {
        if denominations.is_empty() {
            return Err(ConfigError::NoDenominations);
        }

        let mut seen = HashSet::with_capacity(denominations.len());
        for spec in &denominations {
            if spec.amount == 0 {
                return Err(ConfigError::ZeroAmount);
            }
            if !seen.insert(spec.amount) {
                return Err(ConfigError::DuplicateAmount(spec.amount));
            }
        }

        Ok(Self { denominations })
    }

    /// Parse `amount:quantity` pairs separated by commas,
    /// e.g. `500000:1,100000:1,20000:10`.
    pub fn parse(input: &str) -> Result<Self, ConfigError> {
        let specs = input
            .split(',')
            .map(str::trim)
            .filter(|entry| !entry.is_empty())
            .map(parse_entry)
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(specs)
    }

    pub fn denominations(&self) -> &[DenominationSpec] {
        &self.denominations
    }

    /// Sum of all initial quantities.
    pub fn total_initial(&self) -> u64 {
        self.denominations
            .iter()
            .map(|spec| u64::from(spec.initial_quantity))
            .sum()
    }

    pub fn contains_amount(&self, amount: Amount) -> bool {
        self.denominations.iter().any(|spec| spec.amount == amount)
    }
}

fn parse_entry(entry: &str) -> Result<DenominationSpec, ConfigError> {
    let invalid = || ConfigError::InvalidEntry(entry.to_string());

    let (amount, quantity) = entry.split_once(':').ok_or_else(invalid)?;
    let amount = amount.trim().parse::<Amount>().map_err(|_| invalid())?;
    let quantity = quantity.trim().parse::<u32>().map_err(|_| invalid())?;

    Ok(DenominationSpec::new(amount, quantity))
}
