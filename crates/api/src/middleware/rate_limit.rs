//! Per-client sliding-window rate limiting.
//!
//! Each limiter keeps a log of hit instants per client key and admits a
//! request while fewer than `limit` hits fall inside the trailing window.
//! Clients are keyed by connect address, then the first `X-Forwarded-For`
//! entry, then a shared `"unknown"` bucket.

use std::collections::{HashMap, VecDeque};
use std::net::SocketAddr;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};

use axum::extract::{ConnectInfo, Request, State};
use axum::http::{HeaderName, HeaderValue};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

use crate::error::AppError;

const WINDOW: Duration = Duration::from_secs(15 * 60);

static RATELIMIT_LIMIT: HeaderName = HeaderName::from_static("ratelimit-limit");
static RATELIMIT_REMAINING: HeaderName = HeaderName::from_static("ratelimit-remaining");

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateDecision {
    Allowed { remaining: u32 },
    Limited { retry_after: Duration },
}

#[derive(Default)]
struct HitLog {
    clients: HashMap<String, VecDeque<Instant>>,
    swept_at: Option<Instant>,
}

pub struct RateLimiter {
    name: &'static str,
    limit: u32,
    window: Duration,
    message: &'static str,
    hits: Mutex<HitLog>,
}

impl RateLimiter {
    pub fn new(name: &'static str, limit: u32, window: Duration, message: &'static str) -> Self {
        Self {
            name,
            limit,
            window,
            message,
            hits: Mutex::new(HitLog::default()),
        }
    }

    /// 100 requests per 15 minutes across the progress API.
    pub fn progress() -> Self {
        Self::new(
            "progress",
            100,
            WINDOW,
            "Too many requests from this IP, please try again later.",
        )
    }

    /// 5 generations per 15 minutes; roadmaps cost a provider call each.
    pub fn roadmap() -> Self {
        Self::new(
            "roadmap",
            5,
            WINDOW,
            "Too many roadmap generation requests. Please try again later.",
        )
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    fn hits(&self) -> MutexGuard<'_, HitLog> {
        self.hits.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Drop clients whose newest hit has left the window. Runs at most once
    /// per window.
    fn sweep(&self, hits: &mut HitLog, now: Instant) {
        if hits
            .swept_at
            .is_some_and(|t| now.saturating_duration_since(t) < self.window)
        {
            return;
        }
        hits.swept_at = Some(now);

        let before = hits.clients.len();
        hits.clients.retain(|_, log| {
            log.back()
                .is_some_and(|&t| now.saturating_duration_since(t) < self.window)
        });
        let removed = before - hits.clients.len();
        if removed > 0 {
            tracing::debug!(limiter = self.name, removed, "Dropped idle rate-limit clients");
        }
    }

    #[cfg(test)]
    fn tracked_clients(&self) -> usize {
        self.hits().clients.len()
    }

    /// Record a hit for `key` at `now` if the window has room.
    pub fn check(&self, key: &str, now: Instant) -> RateDecision {
        let mut hits = self.hits();
        self.sweep(&mut hits, now);
        let log = hits.clients.entry(key.to_string()).or_default();

        while log
            .front()
            .is_some_and(|&t| now.saturating_duration_since(t) >= self.window)
        {
            log.pop_front();
        }

        if log.len() >= self.limit as usize {
            let oldest = log.front().copied().unwrap_or(now);
            let retry_after = self
                .window
                .saturating_sub(now.saturating_duration_since(oldest));
            return RateDecision::Limited { retry_after };
        }

        log.push_back(now);
        let used = u32::try_from(log.len()).unwrap_or(u32::MAX);
        RateDecision::Allowed {
            remaining: self.limit.saturating_sub(used),
        }
    }
}

/// Identify the client behind a request.
pub fn client_key(req: &Request) -> String {
    if let Some(ConnectInfo(addr)) = req.extensions().get::<ConnectInfo<SocketAddr>>() {
        return addr.ip().to_string();
    }
    req.headers()
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_owned)
        .unwrap_or_else(|| "unknown".to_string())
}

/// Middleware for `axum::middleware::from_fn_with_state`.
pub async fn enforce(
    State(limiter): State<Arc<RateLimiter>>,
    req: Request,
    next: Next,
) -> Response {
    let key = client_key(&req);
    let limit = HeaderValue::from(limiter.limit());

    match limiter.check(&key, Instant::now()) {
        RateDecision::Allowed { remaining } => {
            let mut response = next.run(req).await;
            let headers = response.headers_mut();
            headers.insert(RATELIMIT_LIMIT.clone(), limit);
            headers.insert(RATELIMIT_REMAINING.clone(), HeaderValue::from(remaining));
            response
        }
        RateDecision::Limited { retry_after } => {
            tracing::warn!(limiter = limiter.name, client = %key, "Rate limit exceeded");
            // Round up so clients never retry a moment too early.
            let retry_after_secs = retry_after.as_secs() + u64::from(retry_after.subsec_nanos() > 0);
            let mut response = AppError::RateLimited {
                message: limiter.message,
                retry_after_secs,
            }
            .into_response();
            let headers = response.headers_mut();
            headers.insert(RATELIMIT_LIMIT.clone(), limit);
            headers.insert(RATELIMIT_REMAINING.clone(), HeaderValue::from(0u32));
            response
        }
    }
}
