//! # Log Change Watcher
//!
//! Background task that polls the allocation log and asks the engine to
//! re-derive its state when the file was changed by someone else.
//!
//! Each tick costs one metadata read; the engine compares fingerprints and
//! only replays when length or modification time moved.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, warn};

use crate::ports::inbound::AllocationApi;

/// Default poll period.
pub const DEFAULT_WATCH_INTERVAL: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Copy)]
pub struct ChangeWatcher {
    interval: Duration,
}

impl Default for ChangeWatcher {
    fn default() -> Self {
        Self::new(DEFAULT_WATCH_INTERVAL)
    }
}

impl ChangeWatcher {
    pub fn new(interval: Duration) -> Self {
        // tokio panics on a zero period
        let interval = interval.max(Duration::from_millis(10));
        Self { interval }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Start polling. The task ends when `shutdown` flips to `true` or its
    /// sender is dropped.
    pub fn spawn<A>(self, engine: Arc<A>, mut shutdown: watch::Receiver<bool>) -> JoinHandle<()>
    where
        A: AllocationApi + ?Sized + 'static,
    {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(self.interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            info!(interval_ms = self.interval.as_millis() as u64, "Log change watcher started");

            loop {
                tokio::select! {
                    _ = ticker.tick() => {}
                    changed = shutdown.changed() => {
                        if changed.is_err() || *shutdown.borrow() {
                            break;
                        }
                        continue;
                    }
                }

                let engine = Arc::clone(&engine);
                match tokio::task::spawn_blocking(move || engine.reload_if_changed()).await {
                    Ok(Ok(Some(summary))) => {
                        info!(
                            records = summary.records,
                            remaining = summary.total_remaining,
                            anomalies = summary.anomalies,
                            "Allocation log changed externally; state reloaded"
                        );
                    }
                    Ok(Ok(None)) => debug!("Allocation log unchanged"),
                    Ok(Err(e)) => {
                        warn!(error = %e, "Reload failed; keeping previous state");
                    }
                    Err(e) => {
                        error!(error = %e, "Reload task panicked");
                    }
                }
            }

            info!("Log change watcher stopped");
        })
    }
}
