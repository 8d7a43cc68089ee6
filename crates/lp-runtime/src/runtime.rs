//! # Lucky-Pool Runtime
//!
//! Owns the data directory and wires the engine, the change watcher and
//! the HTTP gateway together.
//!
//! ## Startup Sequence
//!
//! 1. Create the data directory and take the `LOCK` file
//! 2. Open the allocation log (writes the header on first run)
//! 3. Hydrate the engine by replaying the log
//! 4. Spawn the change watcher
//! 5. Bind and serve HTTP until the shutdown future resolves
//!
//! ## Shutdown Sequence
//!
//! 1. Flip the shared `watch` channel to `true`
//! 2. Let in-flight requests drain and stop the watcher
//! 3. Drop the lock

use std::future::Future;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use lp_api_gateway::{ApiGatewayService, GatewayError};
use lp_pool_engine::{
    AllocationApi, AllocationEngine, ChangeWatcher, DataDirLock, FileLogStore, FileSnapshotWriter,
    LockError, LogStoreError,
};
use tokio::net::TcpListener;
use tokio::sync::watch;
use tracing::{error, info};

use crate::config::RuntimeConfig;

/// Engine backed by the on-disk log.
pub type FileEngine = AllocationEngine<FileLogStore>;

/// Startup and serving failures.
#[derive(Debug, thiserror::Error)]
pub enum RuntimeError {
    #[error("failed to create data directory {path}: {source}")]
    DataDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error(transparent)]
    Lock(#[from] LockError),

    #[error("allocation log unavailable: {0}")]
    Log(#[from] LogStoreError),

    #[error(transparent)]
    Gateway(#[from] GatewayError),
}

/// The running service.
pub struct LuckyPoolRuntime {
    config: RuntimeConfig,
    engine: Arc<FileEngine>,
    /// Held for the lifetime of the runtime.
    _lock: DataDirLock,
    shutdown_tx: watch::Sender<bool>,
    shutdown_rx: watch::Receiver<bool>,
}

impl LuckyPoolRuntime {
    /// Take ownership of the data directory and hydrate the engine.
    pub fn new(config: RuntimeConfig) -> Result<Self, RuntimeError> {
        let data_dir = &config.storage.data_dir;
        std::fs::create_dir_all(data_dir).map_err(|source| RuntimeError::DataDir {
            path: data_dir.clone(),
            source,
        })?;

        let lock = DataDirLock::acquire(data_dir)?;
        info!(pid = lock.pid(), path = %lock.path().display(), "Acquired data directory lock");

        let log = FileLogStore::open(config.storage.log_path())?;
        let engine = AllocationEngine::builder(config.pool.clone(), log)
            .snapshot_sink(FileSnapshotWriter::new(config.storage.snapshot_path()))
            .hydrate()?;

        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        Ok(Self {
            config,
            engine: Arc::new(engine),
            _lock: lock,
            shutdown_tx,
            shutdown_rx,
        })
    }

    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    pub fn engine(&self) -> Arc<FileEngine> {
        Arc::clone(&self.engine)
    }

    /// Bind the configured address and serve until `shutdown` resolves.
    pub async fn run<F>(self, shutdown: F) -> Result<(), RuntimeError>
    where
        F: Future<Output = ()> + Send,
    {
        let addr = self.config.gateway.http_addr();
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|source| GatewayError::Bind { addr, source })?;
        self.serve_on(listener, shutdown).await
    }

    /// Serve on an already bound listener until `shutdown` resolves.
    pub async fn serve_on<F>(self, listener: TcpListener, shutdown: F) -> Result<(), RuntimeError>
    where
        F: Future<Output = ()> + Send,
    {
        let watcher = ChangeWatcher::new(self.config.watch_interval)
            .spawn(Arc::clone(&self.engine), self.shutdown_rx.clone());

        let engine: Arc<dyn AllocationApi> = self.engine.clone();
        let gateway = ApiGatewayService::new(self.config.gateway.clone(), engine)?;

        let view = self.engine.view();
        info!(
            recipients = view.total_recipients(),
            remaining = view.total_remaining(),
            "Lucky money pool is open. Press Ctrl+C to stop."
        );

        let serve = gateway.serve(listener, self.shutdown_rx.clone());
        tokio::pin!(serve);

        let result = tokio::select! {
            res = &mut serve => res,
            _ = shutdown => {
                info!("Initiating graceful shutdown...");
                self.signal_shutdown();
                serve.await
            }
        };

        self.signal_shutdown();
        if let Err(e) = watcher.await {
            error!(error = %e, "Change watcher task failed");
        }

        result?;
        info!("Shutdown complete");
        Ok(())
    }

    fn signal_shutdown(&self) {
        // Receivers may already be gone.
        let _ = self.shutdown_tx.send(true);
    }
}
