use std::time::{Duration, SystemTime, UNIX_EPOCH};

use parking_lot::Mutex;

use crate::domain::format::encode_record;
use crate::domain::{AllocationRecord, LogStoreError};
use crate::ports::outbound::{AllocationLog, AppendReceipt, LogFingerprint};

/// In-memory allocation log for unit tests and simulations.
///
/// Tracks a revision counter in place of a modification time so that
/// `replace_records` is seen as an out-of-band edit by the engine.
#[derive(Default)]
pub struct InMemoryLogStore {
    inner: Mutex<MemoryLog>,
}

#[derive(Default)]
struct MemoryLog {
    records: Vec<AllocationRecord>,
    bytes: u64,
    revision: u64,
    fail_appends: bool,
}

impl MemoryLog {
    fn fingerprint(&self) -> LogFingerprint {
        LogFingerprint {
            len: self.bytes,
            modified: Some(revision_time(self.revision)),
        }
    }
}

fn revision_time(revision: u64) -> SystemTime {
    UNIX_EPOCH + Duration::from_nanos(revision)
}

fn encoded_len(records: &[AllocationRecord]) -> u64 {
    records
        .iter()
        .map(|record| encode_record(record).len() as u64)
        .sum()
}

impl InMemoryLogStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_records(records: Vec<AllocationRecord>) -> Self {
        let store = Self::new();
        store.replace_records(records);
        store
    }

    /// Overwrite the whole history, the way an operator editing the file would.
    pub fn replace_records(&self, records: Vec<AllocationRecord>) {
        let mut inner = self.inner.lock();
        inner.bytes = encoded_len(&records);
        inner.records = records;
        inner.revision += 1;
    }

    /// Make every following append fail until reset.
    pub fn set_fail_appends(&self, fail: bool) {
        self.inner.lock().fail_appends = fail;
    }

    pub fn records(&self) -> Vec<AllocationRecord> {
        self.inner.lock().records.clone()
    }
}

impl AllocationLog for InMemoryLogStore {
    fn append(&self, record: &AllocationRecord) -> Result<AppendReceipt, LogStoreError> {
        let mut inner = self.inner.lock();
        if inner.fail_appends {
            return Err(LogStoreError::io("append", "simulated write failure"));
        }

        let previous = inner.fingerprint();
        let bytes_written = encode_record(record).len() as u64;
        inner.records.push(record.clone());
        inner.bytes += bytes_written;
        inner.revision += 1;

        Ok(AppendReceipt {
            bytes_written,
            previous: Some(previous),
            fingerprint: Some(inner.fingerprint()),
        })
    }

    fn read_all(&self) -> Result<Vec<AllocationRecord>, LogStoreError> {
        Ok(self.inner.lock().records.clone())
    }

    fn fingerprint(&self) -> Result<Option<LogFingerprint>, LogStoreError> {
        Ok(Some(self.inner.lock().fingerprint()))
    }
}
