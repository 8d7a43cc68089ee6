//! HTTP routes and handlers.
//!
//! | Method | Path | Handler |
//! |--------|------|---------|
//! | POST | `/lucky-money` | `submit_claim` |
//! | GET | `/recipients` | `list_recipients` |
//! | GET | `/health` | `health_check` |
//! | GET | anything else | static files |

use crate::domain::config::GatewayConfig;
use crate::domain::error::{messages, ApiError, ApiResult};
use crate::domain::types::{ClaimBody, ClaimResponse, HealthResponse, RecipientsResponse};
use crate::middleware::{client_origin, RateLimitLayer};
use axum::{
    extract::{rejection::JsonRejection, ConnectInfo, DefaultBodyLimit, State},
    http::HeaderMap,
    routing::{get, post},
    Json, Router,
};
use lp_pool_engine::{AllocationApi, ClaimRequest};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::{debug, error};

pub const CLAIM_PATH: &str = "/lucky-money";

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<dyn AllocationApi>,
}

/// Assemble routes, static fallback and middleware.
pub fn build_router(state: AppState, config: &GatewayConfig, rate_limit: RateLimitLayer) -> Router {
    let mut router = Router::new()
        .route(CLAIM_PATH, post(submit_claim))
        .route("/recipients", get(list_recipients))
        .route("/health", get(health_check));

    if config.static_files.enabled {
        router = router.fallback_service(ServeDir::new(&config.static_files.dir));
    }

    router
        .layer(DefaultBodyLimit::max(config.limits.max_body_bytes))
        .layer(rate_limit)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn submit_claim(
    State(state): State<AppState>,
    peer: Option<ConnectInfo<SocketAddr>>,
    headers: HeaderMap,
    body: Result<Json<ClaimBody>, JsonRejection>,
) -> ApiResult<Json<ClaimResponse>> {
    let Json(body) = body.map_err(|rejection| {
        debug!(error = %rejection, "Unreadable claim body");
        ApiError::bad_request(messages::INVALID_BODY)
    })?;
    if !body.is_complete() {
        return Err(ApiError::bad_request(messages::MISSING_FIELDS));
    }

    let origin = client_origin(&headers, peer.map(|ConnectInfo(addr)| addr));
    let request = ClaimRequest::new(body.name, body.account_number, body.bank, origin);

    // Blocking: takes the engine lock and fsyncs the log
    let engine = Arc::clone(&state.engine);
    let allocation = tokio::task::spawn_blocking(move || engine.claim(request))
        .await
        .map_err(|e| {
            error!(error = %e, "Claim task failed");
            ApiError::internal()
        })??;

    Ok(Json(ClaimResponse::from(allocation)))
}

async fn list_recipients(State(state): State<AppState>) -> Json<RecipientsResponse> {
    let view = state.engine.view();
    Json(RecipientsResponse::from(view.as_ref()))
}

async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}
