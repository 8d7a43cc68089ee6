//! # Domain Layer - Allocation Engine
//!
//! Pure logic with no I/O.
//!
//! ## Components
//!
//! - `entities`: DenominationSpec, AllocationRecord, ClaimantIdentity, ClaimRequest
//! - `config`: PoolConfig (validated, ordered denomination set)
//! - `pool`: Pool Reconciler (PoolState derived by full replay)
//! - `registry`: Identity Registry (identities and origins already served)
//! - `value_objects`: Allocation, PoolView, ReloadSummary
//! - `format`: textual layout of the allocation log and the pool snapshot
//! - `errors`: rejection reasons, log store and config errors

pub mod config;
pub mod entities;
pub mod errors;
pub mod format;
pub mod pool;
pub mod registry;
pub mod value_objects;

pub use config::*;
pub use entities::*;
pub use errors::*;
pub use pool::*;
pub use registry::*;
pub use value_objects::*;
