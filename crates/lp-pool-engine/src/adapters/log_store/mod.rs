//! Allocation Log Adapters
//!
//! Implementations of the `AllocationLog` trait.

mod file;
mod memory;

pub use file::FileLogStore;
pub use memory::InMemoryLogStore;
