//! # Lucky-Pool Allocation Engine
//!
//! **Status:** Production-Ready
//!
//! ## Purpose
//!
//! Hands out units from a fixed pool of monetary denominations, at most one
//! per claimant identity and one per origin address. Every award is appended
//! to a human-readable log before it is acknowledged, and all in-memory state
//! is re-derived from that log whenever it changes on disk.
//!
//! ## Domain Invariants
//!
//! | Invariant | Enforcement Location |
//! |-----------|---------------------|
//! | No denomination goes below zero | `domain/pool.rs` - `reconcile()` clamps, `take_one()` checks |
//! | One allocation per identity tuple | `service.rs` - `check()` under the engine lock |
//! | One allocation per origin address | `service.rs` - `check()` under the engine lock |
//! | Caches never run ahead of the log | `service.rs` - commit only after `append()` returns `Ok` |
//! | External edits take effect without restart | `adapters/watcher.rs` + `reload_if_changed()` |
//!
//! ## Claim Outcomes
//!
//! | Check (in order) | Reason |
//! |------------------|--------|
//! | Origin already served | `origin already used` |
//! | Nothing left in the pool | `pool exhausted` |
//! | Identity already served | `identity already claimed` |
//! | Append failed | `persistence failure` |
//!
//! ## Module Structure (Hexagonal Architecture)
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                      OUTER LAYER                                │
//! │  adapters/log_store - FileLogStore, InMemoryLogStore            │
//! │  adapters/snapshot  - FileSnapshotWriter                        │
//! │  adapters/watcher   - ChangeWatcher (polls, triggers reload)    │
//! │  adapters/lock      - DataDirLock (single owner per data dir)   │
//! └─────────────────────────────────────────────────────────────────┘
//!                          ↑ implements ↑
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                      MIDDLE LAYER                               │
//! │  ports/inbound.rs  - AllocationApi trait                        │
//! │  ports/outbound.rs - AllocationLog, SnapshotSink, TimeSource    │
//! └─────────────────────────────────────────────────────────────────┘
//!                          ↑ uses ↑
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                      INNER LAYER                                │
//! │  domain/entities.rs  - DenominationSpec, AllocationRecord       │
//! │  domain/pool.rs      - PoolState, reconcile()                   │
//! │  domain/registry.rs  - IdentityRegistry                         │
//! │  domain/format.rs    - log and snapshot text layout             │
//! │  domain/errors.rs    - RejectReason, ClaimError, LogStoreError  │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use lp_pool_engine::{AllocationApi, AllocationEngine, ClaimRequest, FileLogStore, PoolConfig};
//!
//! let engine = AllocationEngine::builder(PoolConfig::default(), FileLogStore::open("lixi.log")?)
//!     .hydrate()?;
//! let allocation = engine.claim(ClaimRequest::new("A", "111", "X", "1.1.1.1"))?;
//! println!("{} VND, {} left", allocation.amount, allocation.remaining_after);
//! ```

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod service;

pub use adapters::*;
pub use domain::*;
pub use ports::*;
pub use service::{AllocationEngine, EngineBuilder};
