//! Sliding-window request limiter.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, VecDeque};
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RateLimitConfig {
    pub max_requests: usize,
    pub window_ms: u64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_requests: 50,
            window_ms: 60_000,
        }
    }
}

impl RateLimitConfig {
    pub fn window(&self) -> Duration {
        Duration::from_millis(self.window_ms)
    }
}

/// Per-client timestamp history. Entries are created on first use and live
/// for the lifetime of the limiter.
#[derive(Debug)]
pub struct RateLimiter {
    config: RateLimitConfig,
    history: HashMap<String, VecDeque<Instant>>,
}

impl RateLimiter {
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            config,
            history: HashMap::new(),
        }
    }

    pub fn config(&self) -> &RateLimitConfig {
        &self.config
    }

    pub fn allow(&mut self, client_id: &str) -> bool {
        self.allow_at(client_id, Instant::now())
    }

    /// Admits the request at `now` if fewer than `max_requests` were admitted
    /// within the preceding window. Denied requests are not recorded.
    pub fn allow_at(&mut self, client_id: &str, now: Instant) -> bool {
        let window = self.config.window();
        let stamps = self.history.entry(client_id.to_string()).or_default();

        // Timestamps are pushed in call order, so expired ones sit at the front.
        while let Some(oldest) = stamps.front() {
            if now.saturating_duration_since(*oldest) >= window {
                stamps.pop_front();
            } else {
                break;
            }
        }

        if stamps.len() < self.config.max_requests {
            stamps.push_back(now);
            true
        } else {
            false
        }
    }

    /// Requests currently counted against `client_id`.
    pub fn in_window(&self, client_id: &str) -> usize {
        self.history.get(client_id).map_or(0, VecDeque::len)
    }
}
