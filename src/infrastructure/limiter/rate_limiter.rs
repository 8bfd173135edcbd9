use std::{
    sync::Arc,
    time::{Duration, Instant},
};
use dashmap::DashMap;
use parking_lot::Mutex;

/// Weighted sliding window: the previous window's count decays linearly
/// while the current one fills.
#[derive(Debug)]
struct SlidingWindow {
    window_size: Duration,
    limit: u64,
    current_window_start: Instant,
    current_count: u64,
    prev_count: u64,
    last_seen: Instant,
}

impl SlidingWindow {
    fn new(window_size: Duration, limit: u64, now: Instant) -> Self {
        Self {
            window_size,
            limit,
            current_window_start: now,
            current_count: 0,
            prev_count: 0,
            last_seen: now,
        }
    }

    fn roll(&mut self, now: Instant) {
        let elapsed = now.duration_since(self.current_window_start);
        if elapsed >= self.window_size * 2 {
            self.prev_count = 0;
            self.current_count = 0;
            self.current_window_start = now;
        } else if elapsed >= self.window_size {
            self.prev_count = self.current_count;
            self.current_count = 0;
            self.current_window_start += self.window_size;
        }
    }

    fn effective(&self, now: Instant) -> f64 {
        let elapsed = now.duration_since(self.current_window_start).as_secs_f64();
        let weight = (elapsed / self.window_size.as_secs_f64()).min(1.0);
        (self.prev_count as f64) * (1.0 - weight) + (self.current_count as f64)
    }

    fn allow(&mut self, now: Instant) -> RateDecision {
        self.last_seen = now;
        self.roll(now);

        let effective = self.effective(now);
        if effective < self.limit as f64 {
            self.current_count += 1;
            let remaining = (self.limit as f64 - effective - 1.0).max(0.0).floor() as u64;
            return RateDecision::Allowed { remaining };
        }

        // Earliest moment the window slides far enough to free one slot.
        let retry_after = if self.current_count >= self.limit {
            let window_end = self.current_window_start + self.window_size;
            window_end.saturating_duration_since(now)
        } else {
            let free = (self.limit - self.current_count) as f64;
            let target_weight = 1.0 - free / self.prev_count.max(1) as f64;
            let elapsed = now.duration_since(self.current_window_start).as_secs_f64();
            Duration::from_secs_f64((target_weight * self.window_size.as_secs_f64() - elapsed).max(0.0))
        };
        RateDecision::Limited {
            retry_after_secs: (retry_after.as_secs_f64().ceil() as u64).max(1),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateDecision {
    Allowed { remaining: u64 },
    Limited { retry_after_secs: u64 },
}

type Key = String;

/// Per-client sliding-window limiter. Idle keys are dropped by `evict_idle`,
/// which the background task calls periodically.
#[derive(Clone)]
pub struct SlidingWindowLimiter {
    map: Arc<DashMap<Key, Arc<Mutex<SlidingWindow>>>>,
    window_size: Duration,
    limit: u64,
}

impl SlidingWindowLimiter {
    pub fn new(limit: u64, window_size: Duration) -> Self {
        Self {
            map: Arc::new(DashMap::new()),
            window_size,
            limit,
        }
    }

    fn get_window(&self, key: &str, now: Instant) -> Arc<Mutex<SlidingWindow>> {
        if let Some(existing) = self.map.get(key) {
            return existing.clone();
        }
        self.map
            .entry(key.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(SlidingWindow::new(self.window_size, self.limit, now))))
            .clone()
    }

    pub fn check(&self, key: &str) -> RateDecision {
        self.check_at(key, Instant::now())
    }

    fn check_at(&self, key: &str, now: Instant) -> RateDecision {
        let window = self.get_window(key, now);
        let mut w = window.lock();
        w.allow(now)
    }

    /// Removes keys not seen for two full windows. Returns how many were dropped.
    pub fn evict_idle(&self) -> usize {
        let ttl = self.window_size * 2;
        let now = Instant::now();
        let before = self.map.len();
        self.map
            .retain(|_, window| now.duration_since(window.lock().last_seen) <= ttl);
        before.saturating_sub(self.map.len())
    }

    pub fn tracked_keys(&self) -> usize {
        self.map.len()
    }

    pub fn window_size(&self) -> Duration {
        self.window_size
    }
}
