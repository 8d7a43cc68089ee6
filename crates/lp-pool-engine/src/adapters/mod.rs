//! # Adapters Layer
//!
//! Concrete implementations of the outbound ports, plus the process-level
//! pieces that sit around the engine.
//!
//! - `log_store`: file-backed and in-memory `AllocationLog`
//! - `snapshot`: `FileSnapshotWriter` for the remaining-quantity file
//! - `lock`: exclusive ownership of the data directory
//! - `watcher`: polls the log and triggers reloads on external edits

pub mod lock;
pub mod log_store;
pub mod snapshot;
pub mod watcher;

pub use lock::{DataDirLock, LockError};
pub use log_store::{FileLogStore, InMemoryLogStore};
pub use snapshot::FileSnapshotWriter;
pub use watcher::{ChangeWatcher, DEFAULT_WATCH_INTERVAL};
