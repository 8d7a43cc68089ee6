//! # Inbound Port - AllocationApi
//!
//! Primary driving port used by the transport layer and the change watcher.

use std::sync::Arc;

use crate::domain::{Allocation, ClaimError, ClaimRequest, LogStoreError, PoolView, ReloadSummary};

/// Primary API of the allocation engine.
///
/// All methods take `&self`; implementations serialize state changes
/// internally. Every method may block on file I/O, so async callers should
/// go through `spawn_blocking`.
///
/// # Example
///
/// ```rust,ignore
/// use lp_pool_engine::{AllocationApi, ClaimRequest};
///
/// fn example(engine: &dyn AllocationApi) {
///     match engine.claim(ClaimRequest::new("A", "111", "X", "1.1.1.1")) {
///         Ok(allocation) => println!("won {}", allocation.amount),
///         Err(err) => println!("no luck: {}", err.reason()),
///     }
///     let view = engine.view();
///     println!("{} left", view.total_remaining());
/// }
/// ```
pub trait AllocationApi: Send + Sync {
    /// Run the claim transaction.
    ///
    /// Checks, in order: origin already used, pool exhausted, identity
    /// already claimed. Then draws a denomination and appends the record.
    ///
    /// # Errors
    /// - `ClaimError::Rejected`: a validation check failed
    /// - `ClaimError::Persistence`: the append failed, nothing changed
    fn claim(&self, request: ClaimRequest) -> Result<Allocation, ClaimError>;

    /// Last-committed state. Does not contend with claims.
    fn view(&self) -> Arc<PoolView>;

    /// Replay the whole log and replace every cached view.
    fn reload(&self) -> Result<ReloadSummary, LogStoreError>;

    /// Replay only if the log changed since the engine last looked at it.
    fn reload_if_changed(&self) -> Result<Option<ReloadSummary>, LogStoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    // Test that the trait is object-safe (can be used as dyn AllocationApi)
    fn _assert_object_safe(_: &dyn AllocationApi) {}
}
