//! Ports layer for the allocation engine.
//!
//! - Inbound (Driving) port: `AllocationApi`, used by the gateway and watcher
//! - Outbound (Driven) ports: `AllocationLog`, `SnapshotSink`, `TimeSource`

pub mod inbound;
pub mod outbound;

pub use inbound::*;
pub use outbound::*;
