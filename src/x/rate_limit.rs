// Rate limiting for X API calls, driven by the server's own headers.
//
// Every X API v2 response carries `x-rate-limit-remaining` (requests left in
// the current window) and `x-rate-limit-reset` (window end, epoch seconds).
// We remember the latest pair and, before the next request, sleep until the
// window resets if only a handful of requests are left. This is cooperative:
// we never send a request we expect to be throttled.
//
// Interior mutability (Mutex) so the client only needs `&self`.

use std::sync::Mutex;
use std::time::Duration;

use chrono::{DateTime, Utc};
use reqwest::header::HeaderMap;
use tracing::{debug, info};

/// Back off once fewer than this many requests remain in the window.
pub const LOW_REMAINING_THRESHOLD: u32 = 5;

/// Extra slack after the advertised reset before the next request.
const RESET_GRACE: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct Snapshot {
    remaining: Option<u32>,
    reset_at: Option<DateTime<Utc>>,
}

/// Last-seen rate-limit state for one API client.
#[derive(Debug, Default)]
pub struct RateLimitState {
    inner: Mutex<Snapshot>,
}

impl RateLimitState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the rate-limit headers from a response.
    ///
    /// Missing or unparseable headers leave the previous value in place.
    pub fn update_from_headers(&self, headers: &HeaderMap) {
        let remaining = header_value::<u32>(headers, "x-rate-limit-remaining");
        let reset_epoch = header_value::<i64>(headers, "x-rate-limit-reset");
        self.update(remaining, reset_epoch);
    }

    /// Record a remaining count and a reset time in epoch seconds.
    pub fn update(&self, remaining: Option<u32>, reset_epoch: Option<i64>) {
        let mut snapshot = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(remaining) = remaining {
            snapshot.remaining = Some(remaining);
        }
        if let Some(reset_at) = reset_epoch.and_then(|s| DateTime::from_timestamp(s, 0)) {
            snapshot.reset_at = Some(reset_at);
        }
        debug!(
            remaining = ?snapshot.remaining,
            reset_at = ?snapshot.reset_at,
            "Rate limit state updated"
        );
    }

    /// Requests left in the current window, if the server has told us.
    pub fn remaining(&self) -> Option<u32> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner()).remaining
    }

    /// When the current window resets, if the server has told us.
    pub fn reset_at(&self) -> Option<DateTime<Utc>> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner()).reset_at
    }

    /// How long to wait at `now` before the next request, if at all.
    ///
    /// Waits only when the remaining count is known and low and the reset
    /// time is still in the future.
    pub fn wait_duration(&self, now: DateTime<Utc>) -> Option<Duration> {
        let snapshot = *self.inner.lock().unwrap_or_else(|e| e.into_inner());
        let remaining = snapshot.remaining?;
        let reset_at = snapshot.reset_at?;

        if remaining >= LOW_REMAINING_THRESHOLD || reset_at <= now {
            return None;
        }

        let until_reset = (reset_at - now).to_std().ok()?;
        Some(until_reset + RESET_GRACE)
    }

    /// Sleep until the window resets when the remaining budget is low.
    pub async fn wait_for_rate_limit(&self) {
        if let Some(wait) = self.wait_duration(Utc::now()) {
            info!(
                remaining = self.remaining().unwrap_or(0),
                wait_secs = wait.as_secs(),
                "Rate limit low, waiting {}s for window reset",
                wait.as_secs()
            );
            tokio::time::sleep(wait).await;
        }
    }
}

fn header_value<T: std::str::FromStr>(headers: &HeaderMap, name: &str) -> Option<T> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.trim().parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::HeaderValue;

    #[test]
    fn test_no_wait_when_unknown() {
        let state = RateLimitState::new();
        assert!(state.wait_duration(Utc::now()).is_none());
        assert!(state.remaining().is_none());
        assert!(state.reset_at().is_none());
    }

    #[test]
    fn test_reports_last_seen_window() {
        let state = RateLimitState::new();
        state.update(Some(873), Some(1_700_000_000));
        assert_eq!(state.remaining(), Some(873));
        assert_eq!(
            state.reset_at(),
            DateTime::from_timestamp(1_700_000_000, 0)
        );
    }

    #[test]
    fn test_waits_when_low_and_reset_in_future() {
        let state = RateLimitState::new();
        let now = Utc::now();
        state.update(Some(2), Some(now.timestamp() + 60));

        let wait = state.wait_duration(now).unwrap();
        // 60s to reset (minus sub-second truncation) plus 1s grace
        assert!(wait > Duration::from_secs(59));
        assert!(wait <= Duration::from_secs(61));
    }

    #[test]
    fn test_no_wait_when_budget_sufficient() {
        let state = RateLimitState::new();
        let now = Utc::now();
        state.update(Some(5), Some(now.timestamp() + 60));
        assert!(state.wait_duration(now).is_none());
    }

    #[test]
    fn test_no_wait_after_reset_passed() {
        let state = RateLimitState::new();
        let now = Utc::now();
        state.update(Some(1), Some(now.timestamp() - 10));
        assert!(state.wait_duration(now).is_none());
    }

    #[test]
    fn test_update_from_headers() {
        let mut headers = HeaderMap::new();
        headers.insert("x-rate-limit-remaining", HeaderValue::from_static("3"));
        headers.insert("x-rate-limit-reset", HeaderValue::from_static("4102444800"));

        let state = RateLimitState::new();
        state.update_from_headers(&headers);
        assert_eq!(state.remaining(), Some(3));

        // A response without the headers keeps what we knew
        state.update_from_headers(&HeaderMap::new());
        assert_eq!(state.remaining(), Some(3));
    }
}
