//! In-memory sliding-window limiter for the login and public chat endpoints.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

#[derive(Clone)]
pub struct RateLimiter {
    hits: Arc<Mutex<HashMap<String, Vec<Instant>>>>,
    max_requests: usize,
    window: Duration,
}

impl RateLimiter {
    pub fn new(max_requests: usize, window_secs: u64) -> Self {
        Self {
            hits: Arc::new(Mutex::new(HashMap::new())),
            max_requests,
            window: Duration::from_secs(window_secs),
        }
    }

    /// True when the identifier (an IP, usually) is still under its limit;
    /// the call itself counts as a hit.
    pub async fn check(&self, identifier: &str) -> bool {
        let now = Instant::now();
        let mut hits = self.hits.lock().await;

        let history = hits.entry(identifier.to_string()).or_default();
        history.retain(|&t| now.duration_since(t) < self.window);

        if history.len() < self.max_requests {
            history.push(now);
            true
        } else {
            false
        }
    }

}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn blocks_after_limit_within_window() {
        let limiter = RateLimiter::new(2, 60);

        assert!(limiter.check("10.0.0.1").await);
        assert!(limiter.check("10.0.0.1").await);
        assert!(!limiter.check("10.0.0.1").await);

        // independent identifiers have independent windows
        assert!(limiter.check("10.0.0.2").await);
    }

    #[tokio::test]
    async fn window_expiry_frees_the_limit() {
        let limiter = RateLimiter::new(1, 1);
        assert!(limiter.check("a").await);
        assert!(!limiter.check("a").await);

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert!(limiter.check("a").await);
    }
}
