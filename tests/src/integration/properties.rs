//! # Properties
//!
//! Arbitrary claim sequences against an in-memory engine. Whatever the
//! order and overlap of claimants, units are conserved and nobody is paid
//! twice.

#[cfg(test)]
mod tests {
    use lp_pool_engine::{
        reconcile, AllocationApi, AllocationEngine, ClaimError, ClaimRequest, DenominationSpec,
        InMemoryLogStore, PoolConfig, RejectReason,
    };
    use proptest::prelude::*;
    use std::collections::HashSet;

    fn pool_strategy() -> impl Strategy<Value = PoolConfig> {
        proptest::collection::vec(0u32..4, 1..4).prop_map(|quantities| {
            let specs = quantities
                .into_iter()
                .enumerate()
                .map(|(i, qty)| DenominationSpec::new(10_000 * (i as u64 + 1), qty))
                .collect();
            PoolConfig::new(specs).unwrap()
        })
    }

    // (identity index, origin index): small ranges so collisions are common
    fn claims_strategy() -> impl Strategy<Value = Vec<(u8, u8)>> {
        proptest::collection::vec((0u8..6, 0u8..6), 0..24)
    }

    proptest! {
        #[test]
        fn prop_claims_conserve_units_and_stay_unique(
            config in pool_strategy(),
            claims in claims_strategy(),
            seed in any::<u64>(),
        ) {
            let initial = config.total_initial();
            let engine = AllocationEngine::builder(config.clone(), InMemoryLogStore::new())
                .seed(seed)
                .hydrate()
                .unwrap();

            let mut origins = HashSet::new();
            let mut identities = HashSet::new();

            for (identity, origin) in claims {
                let request = ClaimRequest::new(
                    format!("Người {identity}"),
                    format!("{identity}"),
                    "VCB",
                    format!("10.0.0.{origin}"),
                );
                let remaining_before = engine.view().total_remaining();

                match engine.claim(request) {
                    Ok(allocation) => {
                        prop_assert!(origins.insert(origin));
                        prop_assert!(identities.insert(identity));
                        prop_assert_eq!(allocation.remaining_after, remaining_before - 1);
                    }
                    Err(ClaimError::Rejected(RejectReason::OriginAlreadyUsed)) => {
                        prop_assert!(origins.contains(&origin));
                    }
                    Err(ClaimError::Rejected(RejectReason::PoolExhausted)) => {
                        prop_assert_eq!(remaining_before, 0);
                    }
                    Err(ClaimError::Rejected(RejectReason::IdentityAlreadyClaimed)) => {
                        prop_assert!(identities.contains(&identity));
                    }
                    Err(ClaimError::Persistence(e)) => {
                        prop_assert!(false, "unexpected persistence failure: {}", e);
                    }
                }
            }

            let view = engine.view();
            prop_assert_eq!(view.total_recipients() as u64 + view.total_remaining(), initial);

            // Incremental bookkeeping agrees with a full replay.
            let replayed = reconcile(config.denominations(), &view.records);
            prop_assert!(replayed.anomalies.is_empty());
            prop_assert_eq!(replayed.pool, view.pool.clone());
        }
    }
}
