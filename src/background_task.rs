use std::sync::Arc;

use tokio::time::{interval, sleep, Duration};

use crate::{
    github::cache::RefreshBackoff,
    limiter::rate_limiter::SlidingWindowLimiter,
    use_cases::github::GithubHandler,
};

/// Keeps the GitHub cache warm. Each pass waits `min(base * 2^failures, max)`,
/// so an outage or rate limit slows polling down until a fetch succeeds.
pub async fn start_github_refresh_task(handler: Arc<GithubHandler>, base: Duration, max: Duration) {
    let mut backoff = RefreshBackoff::new(base, max);

    loop {
        match handler.fetch_and_store().await {
            Ok(repos) => {
                backoff.record_success();
                tracing::debug!("GitHub auto-refresh cached {} repositories", repos.len());
            }
            Err(e) => {
                backoff.record_failure();
                tracing::warn!(
                    failures = backoff.failures(),
                    "GitHub auto-refresh failed: {}. Next attempt in {:?}",
                    e,
                    backoff.next_delay()
                );
            }
        }

        sleep(backoff.next_delay()).await;
    }
}

pub async fn start_limiter_eviction_task(limiter: SlidingWindowLimiter) {
    let mut interval = interval(limiter.window_size().max(Duration::from_secs(60)));

    loop {
        interval.tick().await;

        let evicted = limiter.evict_idle();
        if evicted > 0 {
            tracing::debug!("Evicted {} idle rate-limit entries", evicted);
        }
    }
}
