//! # Lucky-Pool Test Suite
//!
//! Unified test crate for behavior that spans crates.
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! └── integration/
//!     ├── concurrency.rs   # many claimants racing for few units
//!     ├── recovery.rs      # restart, torn tail, missing log
//!     ├── reload.rs        # operator edits picked up by the watcher
//!     ├── http_flow.rs     # gateway on top of a file-backed engine
//!     └── properties.rs    # proptest: conservation and uniqueness
//!
//! tests/benches/
//! └── claim_benchmarks.rs  # criterion: claim and replay cost
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p lp-tests
//! cargo test -p lp-tests integration::concurrency::
//! cargo bench -p lp-tests
//! ```

pub mod integration;

/// Shared fixtures.
pub mod fixtures {
    use lp_pool_engine::{
        AllocationEngine, AllocationRecord, ClaimRequest, DenominationSpec, FileLogStore,
        PoolConfig,
    };
    use std::path::Path;

    pub type FileEngine = AllocationEngine<FileLogStore>;

    /// Small pool: 20.000 x 3, 10.000 x 4.
    pub fn small_pool() -> PoolConfig {
        PoolConfig::new(vec![
            DenominationSpec::new(20_000, 3),
            DenominationSpec::new(10_000, 4),
        ])
        .expect("valid pool")
    }

    /// Distinct identity and origin for claimant `n`.
    pub fn claimant(n: usize) -> ClaimRequest {
        ClaimRequest::new(
            format!("Người {n}"),
            format!("{:08}", n),
            "VCB",
            format!("10.0.{}.{}", n / 256, n % 256),
        )
    }

    pub fn file_engine(dir: &Path, config: PoolConfig) -> FileEngine {
        let log = FileLogStore::open(dir.join("lixi.log")).expect("open log");
        AllocationEngine::builder(config, log)
            .hydrate()
            .expect("hydrate")
    }

    pub fn record(name: &str, amount: u64, origin: &str) -> AllocationRecord {
        AllocationRecord {
            timestamp: "09:15:00 30/1/2025".into(),
            claimant_name: name.into(),
            account_number: "999".into(),
            bank_name: "ACB".into(),
            amount,
            origin_address: origin.into(),
        }
    }
}
