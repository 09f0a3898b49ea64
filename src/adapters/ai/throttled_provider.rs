//! Throttled AI Provider - rate limiting and timeouts around any provider.
//!
//! Every call passes three gates:
//!
//! 1. a concurrency semaphore (`max_concurrent` calls in flight),
//! 2. a token bucket (`burst` capacity, refilled at `requests_per_minute`),
//! 3. a per-call timeout that surfaces as [`AIError::Timeout`].
//!
//! Callers wait for a token instead of being rejected, so a fan-out simply
//! slows down under load.

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, Semaphore};
use tokio::time::{sleep, timeout, Instant};
use tracing::{debug, warn};

use crate::ports::{AIError, AIProvider, CompletionRequest, CompletionResponse, ProviderInfo};

/// Limits applied by [`ThrottledAIProvider`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThrottleConfig {
    /// Token refill rate. Zero disables the bucket.
    pub requests_per_minute: u32,
    /// Bucket capacity.
    pub burst: u32,
    /// Calls allowed in flight at once.
    pub max_concurrent: usize,
    /// Upper bound on a single completion call.
    pub call_timeout: Duration,
}

impl Default for ThrottleConfig {
    fn default() -> Self {
        Self {
            requests_per_minute: 60,
            burst: 5,
            max_concurrent: 4,
            call_timeout: Duration::from_secs(60),
        }
    }
}

#[derive(Debug)]
struct TokenBucket {
    capacity: f64,
    tokens: f64,
    refill_per_sec: f64,
    last_refill: Instant,
}

impl TokenBucket {
    fn new(requests_per_minute: u32, burst: u32) -> Self {
        let capacity = f64::from(burst.max(1));
        Self {
            capacity,
            tokens: capacity,
            refill_per_sec: f64::from(requests_per_minute) / 60.0,
            last_refill: Instant::now(),
        }
    }

    fn refill(&mut self, now: Instant) {
        let elapsed = now.saturating_duration_since(self.last_refill).as_secs_f64();
        self.tokens = (self.tokens + elapsed * self.refill_per_sec).min(self.capacity);
        self.last_refill = now;
    }

    /// Takes a token, or returns how long until one is available.
    fn try_take(&mut self, now: Instant) -> Result<(), Duration> {
        if self.refill_per_sec <= 0.0 {
            return Ok(());
        }
        self.refill(now);
        if self.tokens >= 1.0 {
            self.tokens -= 1.0;
            Ok(())
        } else {
            Err(Duration::from_secs_f64(
                (1.0 - self.tokens) / self.refill_per_sec,
            ))
        }
    }
}

/// Wraps a provider with a token bucket, a concurrency limit, and a timeout.
pub struct ThrottledAIProvider {
    inner: Arc<dyn AIProvider>,
    config: ThrottleConfig,
    bucket: Mutex<TokenBucket>,
    in_flight: Semaphore,
}

impl ThrottledAIProvider {
    pub fn new(inner: Arc<dyn AIProvider>, config: ThrottleConfig) -> Self {
        Self {
            inner,
            bucket: Mutex::new(TokenBucket::new(config.requests_per_minute, config.burst)),
            in_flight: Semaphore::new(config.max_concurrent.max(1)),
            config,
        }
    }

    async fn acquire_token(&self) {
        loop {
            let wait = match self.bucket.lock().await.try_take(Instant::now()) {
                Ok(()) => return,
                Err(wait) => wait,
            };
            debug!(wait_ms = wait.as_millis() as u64, "Waiting for rate limit token");
            sleep(wait).await;
        }
    }
}

#[async_trait]
impl AIProvider for ThrottledAIProvider {
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, AIError> {
        let _permit = self
            .in_flight
            .acquire()
            .await
            .map_err(|_| AIError::unavailable("throttle closed"))?;

        self.acquire_token().await;

        let purpose = request.metadata.purpose.clone();
        match timeout(self.config.call_timeout, self.inner.complete(request)).await {
            Ok(result) => result,
            Err(_) => {
                let timeout_secs = self.config.call_timeout.as_secs() as u32;
                warn!(%purpose, timeout_secs, "Completion call timed out");
                Err(AIError::timeout(timeout_secs))
            }
        }
    }

    fn provider_info(&self) -> ProviderInfo {
        self.inner.provider_info()
    }
}
