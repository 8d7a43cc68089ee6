//! # Lucky-Pool Runtime
//!
//! Process entry point of the lucky money pool: configuration, data
//! directory ownership and lifecycle of the engine and the HTTP gateway.
//!
//! ## Modular Structure
//!
//! - `config` - `LP_*` environment variables into a `RuntimeConfig`
//! - `runtime` - lock, hydrate, watch and serve
//!
//! ```text
//!  RuntimeConfig ──→ LuckyPoolRuntime::new ──→ DataDirLock (LOCK)
//!                           │
//!                           ├──→ FileLogStore (lixi.log) ──→ AllocationEngine
//!                           │                                   │        │
//!                           │                     FileSnapshotWriter   ChangeWatcher
//!                           │                      (quantity.log)      (poll 1s)
//!                           ↓
//!                   LuckyPoolRuntime::run ──→ ApiGatewayService (:3000)
//! ```

pub mod config;
pub mod runtime;

pub use config::{log_directive, ConfigError, RuntimeConfig, StorageConfig};
pub use runtime::{FileEngine, LuckyPoolRuntime, RuntimeError};
