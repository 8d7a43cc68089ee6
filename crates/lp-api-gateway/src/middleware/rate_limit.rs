//! Per-IP rate limiting using the token bucket algorithm.
//!
//! Two budgets per IP: a global one charged by every request, and a tighter
//! one charged only by claim submissions. A budget of `max` requests per
//! `window` becomes a bucket of `max` tokens refilled at one token every
//! `window / max`.

use crate::domain::config::{RateBudget, RateLimitConfig};
use crate::domain::error::{messages, ApiError};
use crate::middleware::client_ip::client_ip;
use crate::router::CLAIM_PATH;
use axum::{
    body::Body,
    http::{Method, Request},
    response::{IntoResponse, Response},
};
use dashmap::DashMap;
use governor::{
    clock::DefaultClock,
    state::{InMemoryState, NotKeyed},
    Quota, RateLimiter,
};
use std::net::IpAddr;
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tower::{Layer, Service};
use tracing::{debug, warn};

type DirectLimiter = RateLimiter<NotKeyed, InMemoryState, DefaultClock>;

/// Which budget ran out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LimitScope {
    Global,
    Claim,
}

impl LimitScope {
    pub fn message(&self) -> &'static str {
        match self {
            LimitScope::Global => messages::GLOBAL_RATE_LIMITED,
            LimitScope::Claim => messages::CLAIM_RATE_LIMITED,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimited {
    pub scope: LimitScope,
    pub retry_after: Duration,
}

fn quota(budget: RateBudget) -> Quota {
    let max = NonZeroU32::new(budget.max_requests).unwrap_or(NonZeroU32::MIN);
    Quota::with_period(budget.window / max.get())
        .unwrap_or_else(|| Quota::per_second(max))
        .allow_burst(max)
}

fn check_limiter(limiter: &DirectLimiter) -> Result<(), Duration> {
    match limiter.check() {
        Ok(_) => Ok(()),
        Err(not_until) => {
            let wait = not_until.wait_time_from(governor::clock::Clock::now(
                &governor::clock::DefaultClock::default(),
            ));
            Err(wait)
        }
    }
}

/// Token bucket entry for an IP address
struct TokenBucket {
    global_limiter: DirectLimiter,
    claim_limiter: DirectLimiter,
    /// Last access time (for cleanup)
    last_access: Instant,
}

impl TokenBucket {
    fn new(config: &RateLimitConfig) -> Self {
        Self {
            global_limiter: RateLimiter::direct(quota(config.global)),
            claim_limiter: RateLimiter::direct(quota(config.claim)),
            last_access: Instant::now(),
        }
    }

    fn check(&mut self, is_claim: bool) -> Result<(), RateLimited> {
        self.last_access = Instant::now();

        check_limiter(&self.global_limiter).map_err(|retry_after| RateLimited {
            scope: LimitScope::Global,
            retry_after,
        })?;

        if is_claim {
            check_limiter(&self.claim_limiter).map_err(|retry_after| RateLimited {
                scope: LimitScope::Claim,
                retry_after,
            })?;
        }
        Ok(())
    }
}

/// Rate limiter state shared across requests
pub struct RateLimitState {
    /// Per-IP token buckets
    buckets: DashMap<IpAddr, TokenBucket>,
    config: RateLimitConfig,
}

impl RateLimitState {
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            buckets: DashMap::new(),
            config,
        }
    }

    pub fn config(&self) -> &RateLimitConfig {
        &self.config
    }

    /// Check if request should be allowed
    pub fn check(&self, ip: IpAddr, is_claim: bool) -> Result<(), RateLimited> {
        if !self.config.enabled || self.config.whitelist.contains(&ip) {
            return Ok(());
        }

        let mut bucket = self.buckets.entry(ip).or_insert_with(|| {
            debug!(ip = %ip, "Creating new rate limit bucket");
            TokenBucket::new(&self.config)
        });

        bucket.check(is_claim)
    }

    /// Clean up old buckets (call periodically)
    pub fn cleanup(&self, max_age: Duration) {
        let now = Instant::now();
        self.buckets.retain(|ip, bucket| {
            let age = now.duration_since(bucket.last_access);
            if age > max_age {
                debug!(ip = %ip, age_secs = age.as_secs(), "Removing stale rate limit bucket");
                false
            } else {
                true
            }
        });
    }

    /// Get number of tracked IPs
    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }
}

/// Rate limit layer
#[derive(Clone)]
pub struct RateLimitLayer {
    state: Arc<RateLimitState>,
}

impl RateLimitLayer {
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            state: Arc::new(RateLimitState::new(config)),
        }
    }

    pub fn state(&self) -> Arc<RateLimitState> {
        Arc::clone(&self.state)
    }
}

impl<S> Layer<S> for RateLimitLayer {
    type Service = RateLimitService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        RateLimitService {
            inner,
            state: Arc::clone(&self.state),
        }
    }
}

/// Rate limit service
#[derive(Clone)]
pub struct RateLimitService<S> {
    inner: S,
    state: Arc<RateLimitState>,
}

impl<S> Service<Request<Body>> for RateLimitService<S>
where
    S: Service<Request<Body>, Response = Response> + Clone + Send + 'static,
    S::Future: Send,
{
    type Response = Response;
    type Error = S::Error;
    type Future = std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<Self::Response, Self::Error>> + Send>,
    >;

    fn poll_ready(
        &mut self,
        cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Request<Body>) -> Self::Future {
        let state = Arc::clone(&self.state);
        let mut inner = self.inner.clone();

        Box::pin(async move {
            let ip = client_ip(&req);
            let is_claim = req.method() == Method::POST && req.uri().path() == CLAIM_PATH;

            match state.check(ip, is_claim) {
                Ok(()) => inner.call(req).await,
                Err(limited) => {
                    warn!(
                        ip = %ip,
                        scope = ?limited.scope,
                        retry_after_ms = limited.retry_after.as_millis() as u64,
                        "Rate limit exceeded"
                    );
                    Ok(ApiError::rate_limited(limited.scope.message(), limited.retry_after)
                        .into_response())
                }
            }
        })
    }
}

/// Background task to clean up stale rate limit buckets
pub async fn cleanup_task(state: Arc<RateLimitState>, interval: Duration, max_age: Duration) {
    let mut cleanup_interval = tokio::time::interval(interval);
    cleanup_interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    loop {
        cleanup_interval.tick().await;
        state.cleanup(max_age);
    }
}
