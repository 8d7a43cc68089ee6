//! API Gateway service - binds the HTTP server and runs it until shutdown.

use crate::domain::config::GatewayConfig;
use crate::domain::error::GatewayError;
use crate::middleware::{cleanup_task, RateLimitLayer, RateLimitState};
use crate::router::{build_router, AppState};
use axum::Router;
use lp_pool_engine::AllocationApi;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tracing::info;

/// API Gateway service state
pub struct ApiGatewayService {
    config: GatewayConfig,
    engine: Arc<dyn AllocationApi>,
    rate_limit: RateLimitLayer,
}

impl ApiGatewayService {
    /// Create a new API Gateway service
    pub fn new(config: GatewayConfig, engine: Arc<dyn AllocationApi>) -> Result<Self, GatewayError> {
        config.validate()?;
        let rate_limit = RateLimitLayer::new(config.rate_limit.clone());

        Ok(Self {
            config,
            engine,
            rate_limit,
        })
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    pub fn rate_limit_state(&self) -> Arc<RateLimitState> {
        self.rate_limit.state()
    }

    /// Router with all routes and middleware, without connection info.
    pub fn router(&self) -> Router {
        let state = AppState {
            engine: Arc::clone(&self.engine),
        };
        build_router(state, &self.config, self.rate_limit.clone())
    }

    /// Bind the configured address.
    pub async fn bind(&self) -> Result<TcpListener, GatewayError> {
        let addr = self.config.http_addr();
        TcpListener::bind(addr)
            .await
            .map_err(|source| GatewayError::Bind { addr, source })
    }

    /// Serve on `listener` until `shutdown` flips to `true` or its sender
    /// is dropped. In-flight requests are allowed to finish.
    pub async fn serve(
        self,
        listener: TcpListener,
        mut shutdown: watch::Receiver<bool>,
    ) -> Result<(), GatewayError> {
        let local_addr = listener.local_addr().map_err(GatewayError::Serve)?;

        let cleanup = if self.config.rate_limit.enabled {
            let state = self.rate_limit.state();
            let interval = self.config.rate_limit.cleanup_interval;
            let max_idle = self.config.rate_limit.max_idle();
            Some(tokio::spawn(cleanup_task(state, interval, max_idle)))
        } else {
            None
        };

        let router = self.router();
        info!(addr = %local_addr, static_dir = %self.config.static_files.dir.display(), "HTTP server listening");

        let result = axum::serve(
            listener,
            router.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(async move {
            while !*shutdown.borrow() {
                if shutdown.changed().await.is_err() {
                    break;
                }
            }
        })
        .await
        .map_err(GatewayError::Serve);

        if let Some(handle) = cleanup {
            handle.abort();
        }
        info!("HTTP server stopped");
        result
    }

    /// Bind and serve.
    pub async fn start(self, shutdown: watch::Receiver<bool>) -> Result<(), GatewayError> {
        let listener = self.bind().await?;
        self.serve(listener, shutdown).await
    }
}
