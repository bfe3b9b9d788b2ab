use serde_json::Value;
use std::collections::HashMap;
use std::time::{Duration, Instant};

pub const DEFAULT_TTL: Duration = Duration::from_secs(300);

#[derive(Debug, Clone)]
struct CacheEntry {
    value: Value,
    expires_at: Instant,
}

/// Parsed responses keyed by request URL, each valid for a single fixed TTL.
///
/// Expired entries are never purged; they read as absent and get overwritten
/// on the next fetch of the same key.
#[derive(Debug, Clone)]
pub struct ResponseCache {
    ttl: Duration,
    entries: HashMap<String, CacheEntry>,
}

impl Default for ResponseCache {
    fn default() -> Self {
        Self::new(DEFAULT_TTL)
    }
}

impl ResponseCache {
    pub fn new(ttl: Duration) -> Self {
        Self { ttl, entries: HashMap::new() }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// The cached value, only while `now < expires_at`.
    pub fn get(&self, key: &str, now: Instant) -> Option<&Value> {
        self.entries
            .get(key)
            .filter(|entry| now < entry.expires_at)
            .map(|entry| &entry.value)
    }

    /// Store `value` until `now + ttl`, replacing whatever was there.
    pub fn put(&mut self, key: impl Into<String>, value: Value, now: Instant) {
        let entry = CacheEntry { value, expires_at: now + self.ttl };
        self.entries.insert(key.into(), entry);
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Number of stored entries, stale ones included.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
