// SPDX-License-Identifier: Apache-2.0

//! GitHub API rate limit headers.
//!
//! Every REST response carries `x-ratelimit-*` headers; the adaptive pacer
//! uses the last snapshot to decide how long to wait before the next upload.

use reqwest::header::HeaderMap;
use tracing::debug;

/// Rate limit state reported with a single response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitSnapshot {
    /// Number of API calls remaining in the current rate limit window.
    pub remaining: u32,
    /// Total number of API calls allowed in the rate limit window.
    pub limit: u32,
    /// Unix timestamp when the rate limit resets.
    pub reset_at: u64,
}

impl RateLimitSnapshot {
    /// Parses the `x-ratelimit-*` headers.
    ///
    /// Returns `None` if any of the three headers is absent or malformed.
    #[must_use]
    pub fn from_headers(headers: &HeaderMap) -> Option<Self> {
        fn number<T: std::str::FromStr>(headers: &HeaderMap, name: &str) -> Option<T> {
            headers.get(name)?.to_str().ok()?.trim().parse().ok()
        }

        let snapshot = Self {
            remaining: number(headers, "x-ratelimit-remaining")?,
            limit: number(headers, "x-ratelimit-limit")?,
            reset_at: number(headers, "x-ratelimit-reset")?,
        };
        debug!(
            remaining = snapshot.remaining,
            limit = snapshot.limit,
            "GitHub rate limit status"
        );
        Some(snapshot)
    }

    /// Returns true if rate limit is low (remaining < 100).
    #[must_use]
    pub fn is_low(&self) -> bool {
        self.remaining < 100
    }

    /// Returns a human-readable status message.
    #[must_use]
    pub fn message(&self) -> String {
        format!(
            "GitHub API: {}/{} calls remaining",
            self.remaining, self.limit
        )
    }
}
