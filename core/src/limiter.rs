use governor::clock::DefaultClock;
use governor::state::keyed::DashMapStateStore;
use governor::{Quota, RateLimiter as GovernorLimiter};
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};

use crate::urls::host_of;

type HostBuckets = GovernorLimiter<String, DashMapStateStore<String>, DefaultClock>;

// Keyed buckets beyond this trigger a sweep of idle hosts; re-creating a
// bucket for a swept host is harmless.
const MAX_TRACKED_HOSTS: usize = 10_000;

/// Global concurrency cap plus per-host token-bucket pacing.
///
/// `slot` returns only once a global permit is held and the host bucket has
/// produced a token; the permit is released when the returned guard drops.
pub struct RateLimiter {
    global: Arc<Semaphore>,
    hosts: HostBuckets,
}

/// Held for the duration of one fetch; dropping it frees the global slot.
pub struct Slot {
    _permit: OwnedSemaphorePermit,
}

impl RateLimiter {
    pub fn new(concurrency: usize, per_host_rps: f64) -> Self {
        let rps = per_host_rps.max(0.1);
        let period = Duration::from_secs_f64(1.0 / rps);
        let quota = Quota::with_period(period)
            .expect("period is non-zero")
            .allow_burst(NonZeroU32::new(1).expect("non-zero burst"));
        Self {
            global: Arc::new(Semaphore::new(concurrency.max(1))),
            hosts: GovernorLimiter::<String, _, _>::keyed(quota),
        }
    }

    pub async fn slot(&self, url: &str) -> Slot {
        let host = host_of(url);
        let permit = Arc::clone(&self.global)
            .acquire_owned()
            .await
            .expect("semaphore never closed");
        self.hosts.until_key_ready(&host).await;
        if self.hosts.len() > MAX_TRACKED_HOSTS {
            self.hosts.retain_recent();
        }
        Slot { _permit: permit }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    #[tokio::test]
    async fn same_host_requests_are_spaced() {
        let limiter = RateLimiter::new(8, 10.0); // 100ms per token
        let start = Instant::now();
        for _ in 0..3 {
            let _slot = limiter.slot("https://h.test/page").await;
        }
        // First token is immediate, the next two wait ~100ms each.
        assert!(
            start.elapsed() >= Duration::from_millis(180),
            "elapsed {:?}",
            start.elapsed()
        );
    }

    #[tokio::test]
    async fn distinct_hosts_do_not_serialize() {
        let limiter = RateLimiter::new(8, 1.0);
        let start = Instant::now();
        let _a = limiter.slot("https://a.test/").await;
        let _b = limiter.slot("https://b.test/").await;
        assert!(
            start.elapsed() < Duration::from_millis(500),
            "elapsed {:?}",
            start.elapsed()
        );
    }

    #[tokio::test]
    async fn global_cap_blocks_extra_slots() {
        let limiter = Arc::new(RateLimiter::new(1, 100.0));
        let held = limiter.slot("https://a.test/").await;
        let second = {
            let limiter = Arc::clone(&limiter);
            tokio::spawn(async move {
                let _slot = limiter.slot("https://b.test/").await;
            })
        };
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(!second.is_finished(), "second slot acquired while cap held");
        drop(held);
        second.await.unwrap();
    }
}
