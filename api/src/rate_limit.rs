//! Per-client submission rate limiting.
//!
//! Each client key owns a token bucket holding up to `max_requests` tokens,
//! refilled evenly so that a full bucket is restored over one window.

use crate::config::RateLimitConfig;
use crate::error::ApiError;
use crate::state::AppState;
use axum::extract::{ConnectInfo, Request, State};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use dashmap::DashMap;
use std::net::SocketAddr;
use std::time::{Duration, Instant};

/// Key shared by clients whose address cannot be determined.
const UNKNOWN_CLIENT: &str = "unknown";

/// Buckets idle for this many windows are dropped during pruning.
const IDLE_WINDOWS: u32 = 2;

/// Token-bucket limiter keyed by client.
#[derive(Debug)]
pub struct RateLimiter {
    capacity: f64,
    refill_per_sec: f64,
    window: Duration,
    buckets: DashMap<String, TokenBucket>,
}

#[derive(Debug, Clone, Copy)]
struct TokenBucket {
    tokens: f64,
    last: Instant,
}

impl RateLimiter {
    /// Creates a limiter from configuration.
    #[must_use]
    pub fn new(config: RateLimitConfig) -> Self {
        let capacity = f64::from(config.max_requests.max(1));
        let window = config.window.max(Duration::from_millis(1));
        Self {
            capacity,
            refill_per_sec: capacity / window.as_secs_f64(),
            window,
            buckets: DashMap::new(),
        }
    }

    /// Consumes a token for `key`, returning whether the request is allowed.
    pub fn check(&self, key: &str) -> bool {
        self.check_at(key, Instant::now())
    }

    fn check_at(&self, key: &str, now: Instant) -> bool {
        let mut bucket = self
            .buckets
            .entry(key.to_string())
            .or_insert(TokenBucket {
                tokens: self.capacity,
                last: now,
            });

        let elapsed = now.saturating_duration_since(bucket.last).as_secs_f64();
        bucket.tokens = (bucket.tokens + elapsed * self.refill_per_sec).min(self.capacity);
        bucket.last = now;

        if bucket.tokens < 1.0 {
            return false;
        }
        bucket.tokens -= 1.0;
        true
    }

    /// Drops buckets that have been idle long enough to be full again.
    pub fn prune(&self) {
        let now = Instant::now();
        let idle = self.window * IDLE_WINDOWS;
        self.buckets
            .retain(|_, bucket| now.saturating_duration_since(bucket.last) < idle);
    }

    /// Number of clients currently tracked.
    #[must_use]
    pub fn tracked_clients(&self) -> usize {
        self.buckets.len()
    }
}

/// Determines the client key for a request.
///
/// Prefers the peer address, then the first `X-Forwarded-For` entry.
///
/// [`crate::run_server_with_config`] always attaches the peer address, so the
/// header only keys requests when the router is driven without connect info,
/// as in tests or when embedded behind another server. It is client-supplied
/// and must not be relied on for limiting untrusted traffic.
fn client_key(request: &Request) -> String {
    if let Some(ConnectInfo(addr)) = request.extensions().get::<ConnectInfo<SocketAddr>>() {
        return addr.ip().to_string();
    }

    request
        .headers()
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map_or_else(|| UNKNOWN_CLIENT.to_string(), str::to_string)
}

/// Middleware rejecting requests over the configured rate with `429`.
pub async fn limit_submissions(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    if let Some(limiter) = state.rate_limiter() {
        let key = client_key(&request);
        if !limiter.check(&key) {
            tracing::warn!(client = %key, "Submission rate limit exceeded");
            return ApiError::RateLimited.into_response();
        }
    }
    next.run(request).await
}
