//! LP API Gateway - HTTP interface of the lucky money pool.
//!
//! # Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────┐
//! │                   API GATEWAY (lp-api-gateway)            │
//! ├───────────────────────────────────────────────────────────┤
//! │   HTTP :3000                                              │
//! │      │                                                    │
//! │   ┌──┴──────────────────────────────────────────┐         │
//! │   │  Trace → RateLimit (per IP) → BodyLimit      │         │
//! │   └──┬──────────────────────────────────────────┘         │
//! │      │                                                    │
//! │   POST /lucky-money   GET /recipients   GET /health   /*  │
//! │      │                     │                          │   │
//! │  spawn_blocking        view() snapshot          ServeDir  │
//! └──────┼─────────────────────┼──────────────────────────────┘
//!        ▼                     ▼
//!            lp-pool-engine (AllocationApi)
//! ```
//!
//! # Usage
//!
//! ```ignore
//! use lp_api_gateway::{ApiGatewayService, GatewayConfig};
//!
//! let service = ApiGatewayService::new(GatewayConfig::default(), engine)?;
//! service.start(shutdown_rx).await?;
//! ```

#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod domain;
pub mod middleware;
pub mod router;
pub mod service;

pub use domain::config::{
    GatewayConfig, HttpConfig, LimitsConfig, RateBudget, RateLimitConfig, StaticConfig,
};
pub use domain::error::{ApiError, GatewayError};
pub use router::{build_router, AppState, CLAIM_PATH};
pub use service::ApiGatewayService;
