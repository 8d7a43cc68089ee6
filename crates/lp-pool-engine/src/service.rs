//! # Allocation Engine Service
//!
//! Owns the engine state and runs the claim transaction.
//!
//! ## Architecture
//!
//! This service:
//! 1. Implements `AllocationApi` for claims, reads and reloads
//! 2. Serializes every state change behind a single mutex
//! 3. Treats the allocation log as the source of truth and re-derives
//!    everything else from it on reload
//! 4. Uses dependency injection for the log, snapshot sink and clock
//!
//! ## Critical Section
//!
//! ```text
//! lock ─→ replay if log changed ─→ origin check ─→ exhaustion check
//!                                                          │
//!               draw ←─ identity check ←───────────────────┘
//!                │
//!                └─→ append (fsync) ─→ commit to caches ─→ publish view ─→ unlock
//! ```
//!
//! A failed append returns before the commit step, so the caches never run
//! ahead of the log. Reloads take the same lock and swap the whole state.
//! The fingerprint after an own append is adopted only when the log was
//! still the content last replayed right before the write.

use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use tracing::{debug, error, info, warn};

use crate::domain::format::{format_amount, format_timestamp};
use crate::domain::{
    reconcile, Allocation, AllocationRecord, ClaimError, ClaimRequest, IdentityRegistry,
    LogStoreError, PoolConfig, PoolState, PoolView, Reconciliation, RejectReason, ReloadSummary,
    ReplayAnomaly,
};
use crate::ports::inbound::AllocationApi;
use crate::ports::outbound::{
    AllocationLog, LogFingerprint, SnapshotSink, SystemTimeSource, TimeSource,
};

/// Everything derived from the allocation log.
#[derive(Debug, Default)]
struct EngineState {
    records: Vec<AllocationRecord>,
    registry: IdentityRegistry,
    pool: PoolState,
    anomalies: Vec<ReplayAnomaly>,
}

struct EngineInner {
    state: EngineState,
    rng: StdRng,
    /// Fingerprint of the log content `state` was derived from.
    last_seen: Option<LogFingerprint>,
}

/// The allocation engine.
///
/// Construct with [`AllocationEngine::builder`]; the engine is only handed
/// out after the first full replay, so no claim can run against an
/// unhydrated state.
pub struct AllocationEngine<L: AllocationLog> {
    config: PoolConfig,
    log: L,
    snapshot_sink: Option<Box<dyn SnapshotSink>>,
    clock: Box<dyn TimeSource>,
    inner: Mutex<EngineInner>,
    published: RwLock<Arc<PoolView>>,
}

/// Builder for [`AllocationEngine`].
pub struct EngineBuilder<L: AllocationLog> {
    config: PoolConfig,
    log: L,
    snapshot_sink: Option<Box<dyn SnapshotSink>>,
    clock: Box<dyn TimeSource>,
    seed: Option<u64>,
}

impl<L: AllocationLog> EngineBuilder<L> {
    /// Mirror remaining quantities into `sink` after every change.
    pub fn snapshot_sink(mut self, sink: impl SnapshotSink + 'static) -> Self {
        self.snapshot_sink = Some(Box::new(sink));
        self
    }

    pub fn clock(mut self, clock: impl TimeSource + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    /// Deterministic draws, for tests and simulations.
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Replay the log and return a ready engine.
    ///
    /// # Errors
    ///
    /// Fails only if the log cannot be read at all.
    pub fn hydrate(self) -> Result<AllocationEngine<L>, LogStoreError> {
        let rng = match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let engine = AllocationEngine {
            config: self.config,
            log: self.log,
            snapshot_sink: self.snapshot_sink,
            clock: self.clock,
            inner: Mutex::new(EngineInner {
                state: EngineState::default(),
                rng,
                last_seen: None,
            }),
            published: RwLock::new(Arc::new(PoolView::default())),
        };

        let summary = {
            let mut inner = engine.inner.lock();
            engine.reload_locked(&mut inner)?
        };

        info!(
            records = summary.records,
            identities = summary.identities,
            remaining = summary.total_remaining,
            anomalies = summary.anomalies,
            "Allocation engine hydrated"
        );
        for balance in engine.view().pool.balances() {
            info!(
                amount = %format_amount(balance.amount),
                remaining = balance.remaining,
                "Denomination balance"
            );
        }

        Ok(engine)
    }
}

impl<L: AllocationLog> AllocationEngine<L> {
    pub fn builder(config: PoolConfig, log: L) -> EngineBuilder<L> {
        EngineBuilder {
            config,
            log,
            snapshot_sink: None,
            clock: Box::new(SystemTimeSource),
            seed: None,
        }
    }

    pub fn config(&self) -> &PoolConfig {
        &self.config
    }

    pub fn log(&self) -> &L {
        &self.log
    }

    /// Anomalies found by the most recent full replay.
    pub fn anomalies(&self) -> Vec<ReplayAnomaly> {
        self.inner.lock().state.anomalies.clone()
    }

    /// Checks in user-facing priority order. Must run under the lock.
    fn check(state: &EngineState, request: &ClaimRequest) -> Result<(), RejectReason> {
        if state.registry.contains_origin(&request.origin_address) {
            return Err(RejectReason::OriginAlreadyUsed);
        }
        if state.pool.is_exhausted() {
            return Err(RejectReason::PoolExhausted);
        }
        if state.registry.contains_identity(&request.identity()) {
            return Err(RejectReason::IdentityAlreadyClaimed);
        }
        Ok(())
    }

    fn reload_if_stale(
        &self,
        inner: &mut EngineInner,
    ) -> Result<Option<ReloadSummary>, LogStoreError> {
        let current = self.log.fingerprint()?;
        if current == inner.last_seen {
            return Ok(None);
        }
        debug!(?current, last_seen = ?inner.last_seen, "Allocation log fingerprint changed");
        self.reload_locked(inner).map(Some)
    }

    fn reload_locked(&self, inner: &mut EngineInner) -> Result<ReloadSummary, LogStoreError> {
        // Fingerprint first: an edit racing the read shows up as a change on
        // the next poll instead of being lost.
        let fingerprint = self.log.fingerprint()?;
        let records = self.log.read_all()?;

        let Reconciliation { pool, anomalies } = reconcile(self.config.denominations(), &records);
        for anomaly in &anomalies {
            warn!(%anomaly, "Allocation log anomaly; entry ignored for quantities");
        }
        let registry = IdentityRegistry::rebuild(&records);

        let summary = ReloadSummary {
            records: records.len(),
            identities: registry.identity_count(),
            total_remaining: pool.total_remaining(),
            anomalies: anomalies.len(),
        };

        inner.state = EngineState {
            records,
            registry,
            pool,
            anomalies,
        };
        inner.last_seen = fingerprint;
        self.publish(&inner.state);

        Ok(summary)
    }

    fn publish(&self, state: &EngineState) {
        let view = Arc::new(PoolView {
            records: state.records.clone(),
            pool: state.pool.clone(),
        });
        *self.published.write() = view;

        if let Some(sink) = &self.snapshot_sink {
            if let Err(e) = sink.publish(&state.pool) {
                warn!(error = %e, "Failed to write pool snapshot");
            }
        }
    }
}

impl<L: AllocationLog> AllocationApi for AllocationEngine<L> {
    fn claim(&self, request: ClaimRequest) -> Result<Allocation, ClaimError> {
        let mut guard = self.inner.lock();
        let inner = &mut *guard;

        // Decide on what the log says now, not on what the last poll saw.
        match self.reload_if_stale(inner) {
            Ok(Some(summary)) => info!(
                records = summary.records,
                remaining = summary.total_remaining,
                "Allocation log changed externally; state reloaded before claim"
            ),
            Ok(None) => {}
            Err(e) => {
                error!(error = %e, "Failed to refresh allocation log before claim");
                return Err(ClaimError::Persistence(e));
            }
        }

        if let Err(reason) = Self::check(&inner.state, &request) {
            debug!(origin = %request.origin_address, %reason, "Claim rejected");
            return Err(reason.into());
        }

        let available = inner.state.pool.available_amounts();
        let amount = match available.choose(&mut inner.rng) {
            Some(&amount) => amount,
            None => return Err(RejectReason::PoolExhausted.into()),
        };

        let record = AllocationRecord {
            timestamp: format_timestamp(self.clock.now()),
            claimant_name: request.name,
            account_number: request.account_number,
            bank_name: request.bank_name,
            amount,
            origin_address: request.origin_address,
        };

        let receipt = match self.log.append(&record) {
            Ok(receipt) => receipt,
            Err(e) => {
                error!(error = %e, origin = %record.origin_address, "Failed to persist allocation");
                return Err(ClaimError::Persistence(e));
            }
        };

        // Durable from here on
        inner.state.pool.take_one(amount);
        inner.state.registry.register(&record);

        // Adopt the new fingerprint only if the file was exactly what we last
        // replayed and grew by exactly our line; otherwise leave it stale so
        // the next poll or claim replays.
        if let (Some(seen), Some(before), Some(now)) =
            (inner.last_seen, receipt.previous, receipt.fingerprint)
        {
            if before == seen && now.len == seen.len + receipt.bytes_written {
                inner.last_seen = Some(now);
            }
        }

        info!(
            name = %record.claimant_name,
            amount = %format_amount(amount),
            origin = %record.origin_address,
            "Allocation committed"
        );
        inner.state.records.push(record);
        self.publish(&inner.state);

        Ok(Allocation {
            amount,
            remaining_after: inner.state.pool.total_remaining(),
            pool: inner.state.pool.clone(),
        })
    }

    fn view(&self) -> Arc<PoolView> {
        Arc::clone(&self.published.read())
    }

    fn reload(&self) -> Result<ReloadSummary, LogStoreError> {
        let mut inner = self.inner.lock();
        self.reload_locked(&mut inner)
    }

    fn reload_if_changed(&self) -> Result<Option<ReloadSummary>, LogStoreError> {
        let mut inner = self.inner.lock();
        self.reload_if_stale(&mut inner)
    }
}
