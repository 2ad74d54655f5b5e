//! Replay-suppression cache
//!
//! Remembers activity keys across poll cycles so the same fill is never
//! published twice within the TTL window.

use std::collections::{HashMap, VecDeque};
use std::time::{Duration, Instant};

/// Lower bound on the configurable TTL
const MIN_TTL: Duration = Duration::from_secs(1);

/// TTL + capacity bounded first-seen cache.
///
/// Insertion order doubles as age order, so the expiry sweep walks from the
/// front and stops at the first live entry. When the cache overflows
/// `max_entries` the oldest-inserted key is evicted first.
pub struct DedupCache {
    ttl: Duration,
    max_entries: usize,
    entries: HashMap<String, Instant>,
    order: VecDeque<String>,
}

impl DedupCache {
    /// Create a cache with the given TTL (floored at 1 s) and capacity
    pub fn new(ttl: Duration, max_entries: usize) -> Self {
        Self {
            ttl: ttl.max(MIN_TTL),
            max_entries: max_entries.max(1),
            entries: HashMap::new(),
            order: VecDeque::new(),
        }
    }

    /// Returns true iff the key was absent (and is now remembered).
    ///
    /// Expired entries are swept before the check, so a key whose previous
    /// sighting aged out is admitted again.
    pub fn check_and_remember(&mut self, key: &str) -> bool {
        self.check_and_remember_at(key, Instant::now())
    }

    /// Variant with an explicit clock, for tests
    pub fn check_and_remember_at(&mut self, key: &str, now: Instant) -> bool {
        self.sweep_expired(now);

        if self.entries.contains_key(key) {
            return false;
        }

        self.entries.insert(key.to_string(), now);
        self.order.push_back(key.to_string());

        if self.entries.len() > self.max_entries {
            if let Some(oldest) = self.order.pop_front() {
                self.entries.remove(&oldest);
            }
        }

        true
    }

    /// Number of non-expired entries
    pub fn len(&self) -> usize {
        self.len_at(Instant::now())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn len_at(&self, now: Instant) -> usize {
        self.entries
            .values()
            .filter(|inserted| now.saturating_duration_since(**inserted) < self.ttl)
            .count()
    }

    fn sweep_expired(&mut self, now: Instant) {
        while let Some(front) = self.order.front() {
            match self.entries.get(front) {
                Some(inserted) if now.saturating_duration_since(*inserted) >= self.ttl => {
                    self.entries.remove(front);
                    self.order.pop_front();
                }
                _ => break,
            }
        }
    }
}
