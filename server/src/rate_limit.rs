//! Fixed-window request limiter keyed by client IP.
//!
//! Each client gets `max_requests` per window; the window restarts on the
//! first request after it expires. Requests without connection info (for
//! example when the router is driven directly in tests) share one bucket.

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;

use axum::extract::{ConnectInfo, Request, State};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use tokio::sync::Mutex;
use tokio::time::Instant;

use crate::error::ApiError;

#[derive(Debug, Clone, Copy)]
struct Window {
    started: Instant,
    used: u32,
}

#[derive(Debug)]
pub struct RateLimiter {
    max_requests: u32,
    window: Duration,
    clients: Mutex<HashMap<Option<IpAddr>, Window>>,
}

impl RateLimiter {
    pub fn new(max_requests: u32, window: Duration) -> Self {
        Self {
            max_requests,
            window,
            clients: Mutex::new(HashMap::new()),
        }
    }

    /// Record one request from `client`; `false` once its budget is spent.
    pub async fn check(&self, client: Option<IpAddr>) -> bool {
        let now = Instant::now();
        let mut clients = self.clients.lock().await;
        // drop expired windows so the map cannot grow without bound
        clients.retain(|_, w| now.duration_since(w.started) < self.window);

        let entry = clients.entry(client).or_insert(Window {
            started: now,
            used: 0,
        });
        if entry.used >= self.max_requests {
            return false;
        }
        entry.used += 1;
        true
    }
}

pub async fn rate_limit_middleware(
    State(limiter): State<Arc<RateLimiter>>,
    request: Request,
    next: Next,
) -> Response {
    let client = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip());

    if !limiter.check(client).await {
        tracing::warn!(?client, "rate limit exceeded");
        return ApiError::TooManyRequests.into_response();
    }
    next.run(request).await
}
