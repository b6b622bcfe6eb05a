// SPDX-License-Identifier: Apache-2.0

//! Upload pacing.
//!
//! The uploader awaits a [`Pacer`] after every file so the run stays under
//! GitHub's content-creation limits. Uploads remain strictly sequential; a
//! pacer only decides how long to sleep between them.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use tracing::debug;

use crate::config::{PacingConfig, PacingStrategy};
use crate::github::RateLimitSnapshot;

/// Decides how long to wait after an upload.
#[async_trait]
pub trait Pacer: Send + Sync {
    /// Sleeps before the next upload.
    ///
    /// `rate_limit` is the snapshot from the last write response, accepted or
    /// rejected. It is `None` when the file never reached a write or the
    /// response carried no rate limit headers.
    async fn pause(&self, rate_limit: Option<&RateLimitSnapshot>);
}

/// Sleeps the same amount after every upload.
#[derive(Debug, Clone, Copy)]
pub struct FixedDelay {
    delay: Duration,
}

impl FixedDelay {
    /// Creates a pacer that always waits `delay`.
    #[must_use]
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }
}

#[async_trait]
impl Pacer for FixedDelay {
    async fn pause(&self, _rate_limit: Option<&RateLimitSnapshot>) {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
    }
}

/// Spreads the remaining rate-limit budget evenly until the window resets.
#[derive(Debug, Clone, Copy)]
pub struct HeaderAdaptive {
    floor: Duration,
    max_wait: Duration,
}

impl HeaderAdaptive {
    /// Creates an adaptive pacer that never waits less than `floor` nor more than `max_wait`.
    #[must_use]
    pub fn new(floor: Duration, max_wait: Duration) -> Self {
        Self { floor, max_wait }
    }

    /// Computes the wait for `snapshot` at Unix time `now`.
    #[must_use]
    pub fn delay_for(&self, snapshot: Option<&RateLimitSnapshot>, now: u64) -> Duration {
        let Some(snapshot) = snapshot else {
            return self.floor;
        };

        let window_ms = snapshot.reset_at.saturating_sub(now).saturating_mul(1000);
        let wait = if snapshot.remaining == 0 {
            Duration::from_millis(window_ms)
        } else {
            Duration::from_millis(window_ms / u64::from(snapshot.remaining))
        };

        wait.max(self.floor).min(self.max_wait)
    }
}

#[async_trait]
impl Pacer for HeaderAdaptive {
    async fn pause(&self, rate_limit: Option<&RateLimitSnapshot>) {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_or(0, |d| d.as_secs());
        let wait = self.delay_for(rate_limit, now);
        if let Some(snapshot) = rate_limit
            && snapshot.is_low()
        {
            debug!(wait = ?wait, "{}", snapshot.message());
        }
        if !wait.is_zero() {
            tokio::time::sleep(wait).await;
        }
    }
}

/// Builds the pacer selected in configuration.
#[must_use]
pub fn from_config(config: &PacingConfig) -> Box<dyn Pacer> {
    let delay = Duration::from_millis(config.delay_ms);
    match config.strategy {
        PacingStrategy::Fixed => Box::new(FixedDelay::new(delay)),
        PacingStrategy::Adaptive => Box::new(HeaderAdaptive::new(
            delay,
            Duration::from_secs(config.max_wait_seconds),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn adaptive() -> HeaderAdaptive {
        HeaderAdaptive::new(Duration::from_millis(300), Duration::from_secs(120))
    }

    fn snapshot(remaining: u32, reset_at: u64) -> RateLimitSnapshot {
        RateLimitSnapshot {
            remaining,
            limit: 5000,
            reset_at,
        }
    }

    #[test]
    fn test_adaptive_without_headers_uses_floor() {
        assert_eq!(adaptive().delay_for(None, 1000), Duration::from_millis(300));
    }

    #[test]
    fn test_adaptive_spreads_budget() {
        // 100 seconds left, 50 calls left -> one call every 2 seconds
        let wait = adaptive().delay_for(Some(&snapshot(50, 1100)), 1000);
        assert_eq!(wait, Duration::from_secs(2));
    }

    #[test]
    fn test_adaptive_never_below_floor() {
        let wait = adaptive().delay_for(Some(&snapshot(4000, 1010)), 1000);
        assert_eq!(wait, Duration::from_millis(300));
    }

    #[test]
    fn test_adaptive_exhausted_waits_for_reset() {
        let wait = adaptive().delay_for(Some(&snapshot(0, 1030)), 1000);
        assert_eq!(wait, Duration::from_secs(30));
    }

    #[test]
    fn test_adaptive_caps_wait() {
        let wait = adaptive().delay_for(Some(&snapshot(0, 5000)), 1000);
        assert_eq!(wait, Duration::from_secs(120));
    }

    #[test]
    fn test_adaptive_reset_in_past() {
        let wait = adaptive().delay_for(Some(&snapshot(0, 900)), 1000);
        assert_eq!(wait, Duration::from_millis(300));
    }

    #[tokio::test(start_paused = true)]
    async fn test_fixed_zero_delay_returns() {
        let start = tokio::time::Instant::now();
        FixedDelay::new(Duration::ZERO).pause(None).await;
        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_fixed_delay_ignores_headers() {
        let start = tokio::time::Instant::now();
        FixedDelay::new(Duration::from_millis(300))
            .pause(Some(&snapshot(0, u64::MAX)))
            .await;
        let elapsed = start.elapsed();
        assert!(elapsed >= Duration::from_millis(300), "elapsed {elapsed:?}");
        assert!(elapsed < Duration::from_millis(400), "elapsed {elapsed:?}");
    }

    #[tokio::test(start_paused = true)]
    async fn test_from_config_builds_both() {
        let adaptive = PacingConfig {
            strategy: PacingStrategy::Adaptive,
            delay_ms: 0,
            max_wait_seconds: 0,
        };
        let start = tokio::time::Instant::now();
        from_config(&adaptive).pause(Some(&snapshot(0, u64::MAX))).await;
        assert_eq!(start.elapsed(), Duration::ZERO);

        let fixed = PacingConfig {
            strategy: PacingStrategy::Fixed,
            delay_ms: 250,
            max_wait_seconds: 0,
        };
        let start = tokio::time::Instant::now();
        from_config(&fixed).pause(None).await;
        assert!(start.elapsed() >= Duration::from_millis(250));
    }
}
