//! # Identity Registry
//!
//! The set of claimant identities and origin addresses that were already
//! served. Always rebuilt wholesale from the full record sequence on reload;
//! only the engine's own commit path extends it in place.

use std::collections::HashSet;

use super::entities::{AllocationRecord, ClaimantIdentity};

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct IdentityRegistry {
    identities: HashSet<ClaimantIdentity>,
    origins: HashSet<String>,
}

impl IdentityRegistry {
    /// Derive the registry from every record in the log.
    pub fn rebuild(records: &[AllocationRecord]) -> Self {
        let mut registry = Self {
            identities: HashSet::with_capacity(records.len()),
            origins: HashSet::with_capacity(records.len()),
        };
        for record in records {
            registry.register(record);
        }
        registry
    }

    pub fn contains_identity(&self, identity: &ClaimantIdentity) -> bool {
        self.identities.contains(identity)
    }

    pub fn contains_origin(&self, origin: &str) -> bool {
        self.origins.contains(origin)
    }

    pub fn identity_count(&self) -> usize {
        self.identities.len()
    }

    pub fn origin_count(&self) -> usize {
        self.origins.len()
    }

    pub(crate) fn register(&mut self, record: &AllocationRecord) {
        self.identities.insert(record.identity());
        self.origins.insert(record.origin_address.clone());
    }
}
