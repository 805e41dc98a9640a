use std::sync::Arc;
use std::time::{Duration, Instant};

use dashmap::DashMap;
use log::debug;
use tokio::task::JoinHandle;

use super::TokenBucket;

/// In-memory per-client token-bucket registry.
///
/// Buckets live in a sharded map, so unrelated clients rarely contend and a
/// single client's refill-and-consume runs under its shard lock.
#[derive(Clone)]
pub struct RateLimiterRegistry {
    inner: Arc<RegistryInner>,
}

struct RegistryInner {
    refill_rate: f64,
    burst: u32,
    buckets: DashMap<String, TokenBucket>,
}

impl RateLimiterRegistry {
    /// `refill_rate` is in tokens per second; `burst` is the bucket capacity.
    pub fn new(refill_rate: f64, burst: u32) -> Self {
        Self {
            inner: Arc::new(RegistryInner {
                refill_rate,
                burst,
                buckets: DashMap::new(),
            }),
        }
    }

    /// Returns `true` and spends a token if `identity` has one, `false` otherwise.
    pub fn allow(&self, identity: &str) -> bool {
        self.allow_at(identity, Instant::now())
    }

    fn allow_at(&self, identity: &str, now: Instant) -> bool {
        if let Some(mut bucket) = self.inner.buckets.get_mut(identity) {
            return bucket.try_consume(now);
        }

        let mut bucket = self
            .inner
            .buckets
            .entry(identity.to_owned())
            .or_insert_with(|| {
                debug!("Creating rate limit bucket for {}", identity);
                TokenBucket::new(self.inner.burst, self.inner.refill_rate, now)
            });
        bucket.try_consume(now)
    }

    /// Number of client identities currently tracked
    pub fn len(&self) -> usize {
        self.inner.buckets.len()
    }

    /// Drops every bucket that has refilled to capacity. A re-created bucket
    /// starts full, so this never changes an admission decision.
    pub fn sweep(&self) -> usize {
        self.sweep_at(Instant::now())
    }

    fn sweep_at(&self, now: Instant) -> usize {
        let before = self.inner.buckets.len();
        self.inner.buckets.retain(|_, bucket| !bucket.is_full(now));
        before.saturating_sub(self.inner.buckets.len())
    }

    /// Runs [`sweep`](Self::sweep) every `interval` on the current tokio runtime
    pub fn spawn_sweeper(&self, interval: Duration) -> JoinHandle<()> {
        let registry = self.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            // The first tick completes immediately
            ticker.tick().await;
            loop {
                ticker.tick().await;
                let removed = registry.sweep();
                if removed > 0 {
                    debug!(
                        "Rate limiter sweep removed {} idle buckets, {} remain",
                        removed,
                        registry.len()
                    );
                }
            }
        })
    }
}
