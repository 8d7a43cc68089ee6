//! Outbound (Driven) ports for the allocation engine.
//!
//! These traits define what the engine needs from the outside world:
//! a durable allocation log, a place to publish the advisory pool snapshot,
//! and a clock.

use std::time::SystemTime;

use chrono::{DateTime, FixedOffset, Utc};

use crate::domain::format::local_offset;
use crate::domain::{AllocationRecord, LogStoreError, PoolState};

/// Cheap identity of the log's current content, used to notice edits.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LogFingerprint {
    pub len: u64,
    pub modified: Option<SystemTime>,
}

/// What one append did to the underlying store.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AppendReceipt {
    /// Bytes written, including any newline added to close a torn tail.
    pub bytes_written: u64,
    /// Fingerprint observed right before the write.
    pub previous: Option<LogFingerprint>,
    /// Fingerprint observed right after the write.
    pub fingerprint: Option<LogFingerprint>,
}

/// Append-only durable record of successful allocations.
///
/// This is the sole source of truth. `append` is the durability boundary:
/// a record counts as committed only once it returns `Ok`.
pub trait AllocationLog: Send + Sync {
    /// Durably append one record.
    fn append(&self, record: &AllocationRecord) -> Result<AppendReceipt, LogStoreError>;

    /// Every well-formed record, oldest first. Malformed entries are skipped.
    fn read_all(&self) -> Result<Vec<AllocationRecord>, LogStoreError>;

    /// Current fingerprint, or `None` when the store does not exist.
    fn fingerprint(&self) -> Result<Option<LogFingerprint>, LogStoreError>;
}

/// Receives the advisory "current quantities" projection.
///
/// Never read back by the engine.
pub trait SnapshotSink: Send + Sync {
    fn publish(&self, pool: &PoolState) -> Result<(), LogStoreError>;
}

/// Time source for record timestamps.
///
/// Abstracted to allow testing with deterministic time.
pub trait TimeSource: Send + Sync {
    /// Current local time in the log's offset.
    fn now(&self) -> DateTime<FixedOffset>;
}

/// Wall clock in UTC+7.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemTimeSource;

impl TimeSource for SystemTimeSource {
    fn now(&self) -> DateTime<FixedOffset> {
        Utc::now().with_timezone(&local_offset())
    }
}

/// Frozen clock.
#[derive(Debug, Clone, Copy)]
pub struct FixedTimeSource(pub DateTime<FixedOffset>);

impl TimeSource for FixedTimeSource {
    fn now(&self) -> DateTime<FixedOffset> {
        self.0
    }
}
