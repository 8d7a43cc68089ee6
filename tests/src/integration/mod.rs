//! Cross-crate integration tests.

pub mod concurrency;
pub mod http_flow;
pub mod properties;
pub mod recovery;
pub mod reload;
