//! Middleware stack for the gateway.
//!
//! Layer order: Request → Trace → RateLimit → BodyLimit → Handler

pub mod client_ip;
pub mod rate_limit;

pub use client_ip::{client_ip, client_origin};
pub use rate_limit::{cleanup_task, LimitScope, RateLimitLayer, RateLimitState, RateLimited};
