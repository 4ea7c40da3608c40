//! Fixed-window admission control keyed by client identity.
//!
//! Each client gets a counter that resets when its window ends. Unlike a
//! sliding window, a client can pass up to `2 × max_requests` requests around a
//! window boundary. State lives in process memory only and is lost on restart.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, Instant};

/// Default number of requests admitted per window.
pub const DEFAULT_MAX_REQUESTS: u32 = 20;

/// Default window length.
pub const DEFAULT_WINDOW: Duration = Duration::from_secs(60);

#[derive(Debug, Clone, Copy)]
struct Window {
    count: u32,
    window_end: Instant,
}

/// Per-client fixed-window request counter.
///
/// One instance is built at startup and shared through
/// [`crate::state::AppState`]. The lock is held only for the
/// read-check-update of a single entry.
#[derive(Debug)]
pub struct RateLimiter {
    max_requests: u32,
    window: Duration,
    windows: Mutex<HashMap<String, Window>>,
}

impl RateLimiter {
    /// Creates a limiter admitting `max_requests` per `window` per client.
    pub fn new(max_requests: u32, window: Duration) -> Self {
        Self {
            max_requests,
            window,
            windows: Mutex::new(HashMap::new()),
        }
    }

    /// Admits or rejects a request from `client` at the current time.
    pub fn admit(&self, client: &str) -> bool {
        self.admit_at(client, Instant::now())
    }

    /// Admits or rejects a request from `client` at `now`.
    ///
    /// - No window yet, or `now` past the window end: start a fresh window
    ///   with a count of 1 and admit.
    /// - Count below the limit: increment and admit.
    /// - Otherwise: reject.
    pub fn admit_at(&self, client: &str, now: Instant) -> bool {
        let mut windows = self.lock();

        if let Some(w) = windows.get_mut(client)
            && now <= w.window_end
        {
            if w.count >= self.max_requests {
                return false;
            }
            w.count += 1;
            return true;
        }

        windows.insert(
            client.to_string(),
            Window {
                count: 1,
                window_end: now + self.window,
            },
        );
        true
    }

    /// Drops windows that ended before `now`. Returns how many were removed.
    pub fn purge_expired_at(&self, now: Instant) -> usize {
        let mut windows = self.lock();
        let before = windows.len();
        windows.retain(|_, w| now <= w.window_end);
        before - windows.len()
    }

    /// Drops windows that have already ended.
    pub fn purge_expired(&self) -> usize {
        self.purge_expired_at(Instant::now())
    }

    /// Number of clients with a tracked window.
    pub fn tracked_clients(&self) -> usize {
        self.lock().len()
    }

    /// Seconds a rejected client is told to wait (`Retry-After`).
    pub fn retry_after_secs(&self) -> u64 {
        self.window.as_secs().max(1)
    }

    pub fn max_requests(&self) -> u32 {
        self.max_requests
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, Window>> {
        self.windows.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_REQUESTS, DEFAULT_WINDOW)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_first_twenty_admitted_then_rejected() {
        let limiter = RateLimiter::default();
        let now = Instant::now();

        for i in 1..=20 {
            assert!(limiter.admit_at("10.0.0.1", now), "Request {} should pass", i);
        }

        assert!(!limiter.admit_at("10.0.0.1", now));
        assert!(!limiter.admit_at("10.0.0.1", now + Duration::from_secs(59)));
    }

    #[test]
    fn test_window_end_is_inclusive() {
        let limiter = RateLimiter::new(1, Duration::from_secs(60));
        let start = Instant::now();

        assert!(limiter.admit_at("c", start));
        assert!(!limiter.admit_at("c", start + Duration::from_secs(60)));
    }

    #[test]
    fn test_window_resets_after_expiry() {
        let limiter = RateLimiter::default();
        let start = Instant::now();

        for _ in 0..20 {
            assert!(limiter.admit_at("10.0.0.1", start));
        }
        assert!(!limiter.admit_at("10.0.0.1", start));

        let later = start + Duration::from_secs(61);
        for _ in 0..20 {
            assert!(limiter.admit_at("10.0.0.1", later));
        }
        assert!(!limiter.admit_at("10.0.0.1", later));
    }

    #[test]
    fn test_clients_are_independent() {
        let limiter = RateLimiter::new(2, Duration::from_secs(60));
        let now = Instant::now();

        assert!(limiter.admit_at("a", now));
        assert!(limiter.admit_at("a", now));
        assert!(!limiter.admit_at("a", now));

        assert!(limiter.admit_at("b", now));
        assert_eq!(limiter.tracked_clients(), 2);
    }

    #[test]
    fn test_boundary_burst_admits_twice_the_limit() {
        let limiter = RateLimiter::new(20, Duration::from_secs(60));
        let start = Instant::now();

        assert!(limiter.admit_at("c", start));

        let end_of_first = start + Duration::from_secs(59);
        let start_of_second = start + Duration::from_secs(60) + Duration::from_millis(1);

        let admitted_first = (0..19).filter(|_| limiter.admit_at("c", end_of_first)).count();
        let admitted_second = (0..20)
            .filter(|_| limiter.admit_at("c", start_of_second))
            .count();

        assert_eq!(1 + admitted_first + admitted_second, 40);
        assert!(!limiter.admit_at("c", start_of_second));
    }

    #[test]
    fn test_purge_expired() {
        let limiter = RateLimiter::new(5, Duration::from_secs(60));
        let start = Instant::now();

        limiter.admit_at("old", start);
        limiter.admit_at("new", start + Duration::from_secs(30));

        let removed = limiter.purge_expired_at(start + Duration::from_secs(61));

        assert_eq!(removed, 1);
        assert_eq!(limiter.tracked_clients(), 1);
    }

    #[test]
    fn test_retry_after_secs() {
        assert_eq!(RateLimiter::default().retry_after_secs(), 60);
        assert_eq!(
            RateLimiter::new(1, Duration::from_millis(10)).retry_after_secs(),
            1
        );
    }

    #[test]
    fn test_concurrent_admissions_never_exceed_limit() {
        let limiter = Arc::new(RateLimiter::new(20, Duration::from_secs(60)));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let limiter = limiter.clone();
                thread::spawn(move || (0..10).filter(|_| limiter.admit("shared")).count())
            })
            .collect();

        let admitted: usize = handles.into_iter().map(|h| h.join().unwrap()).sum();

        assert_eq!(admitted, 20);
    }
}
