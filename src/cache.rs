//! DoH response caching with TTL expiration
//!
//! Provides a bounded LRU cache that stores decoded responses keyed by the
//! query fingerprint and expires them based on the answer's TTL.

use std::num::NonZeroUsize;
use std::time::{Duration, Instant};

use lru::LruCache;

use crate::dns::Response;

/// Default maximum number of cache entries
pub const DEFAULT_MAX_ENTRIES: usize = 1000;

/// TTL used when a response carries no usable TTL of its own
pub const DEFAULT_TTL_SECS: u64 = 30;

/// Cached DoH response
#[derive(Debug, Clone)]
struct CacheEntry {
    response: Response,
    expires_at: Instant,
}

impl CacheEntry {
    fn new(response: Response, ttl: Duration) -> Self {
        Self {
            response,
            expires_at: Instant::now() + ttl,
        }
    }

    fn is_expired(&self) -> bool {
        Instant::now() >= self.expires_at
    }
}

/// Cache statistics
#[derive(Debug, Clone, Default)]
pub struct CacheStats {
    /// Number of cache hits
    pub hits: u64,
    /// Number of cache misses
    pub misses: u64,
    /// Number of expired entries removed
    pub expired: u64,
    /// Current number of entries in the cache
    pub entries: usize,
}

/// Bounded TTL cache for DoH responses
///
/// Holds at most one entry per fingerprint; the least recently used entry
/// is evicted when the cache is full. A closed cache ignores all further
/// reads and writes.
pub struct ResponseCache {
    entries: LruCache<String, CacheEntry>,
    stats: CacheStats,
    closed: bool,
}

impl ResponseCache {
    /// Create a new cache with the given maximum capacity
    pub fn new(max_entries: usize) -> Self {
        Self {
            entries: LruCache::new(
                NonZeroUsize::new(max_entries)
                    .unwrap_or_else(|| NonZeroUsize::new(DEFAULT_MAX_ENTRIES).unwrap()),
            ),
            stats: CacheStats::default(),
            closed: false,
        }
    }

    /// Get a live cached response for the given fingerprint
    ///
    /// Returns `None` if not found or expired. Expired entries are removed
    /// on access; the TTL of a live entry is not extended by reading it.
    pub fn get(&mut self, key: &str) -> Option<Response> {
        if self.closed {
            return None;
        }

        match self.entries.get(key) {
            Some(entry) if entry.is_expired() => {
                self.entries.pop(key);
                self.stats.expired += 1;
                self.stats.misses += 1;
                self.stats.entries = self.entries.len();
                None
            }
            Some(entry) => {
                self.stats.hits += 1;
                Some(entry.response.clone())
            }
            None => {
                self.stats.misses += 1;
                None
            }
        }
    }

    /// Insert a response, overwriting any entry with the same fingerprint
    ///
    /// `ttl_secs == 0` is clamped to the 30 second default.
    pub fn insert(&mut self, key: &str, response: &Response, ttl_secs: u64) {
        if self.closed {
            return;
        }

        let ttl = if ttl_secs == 0 {
            DEFAULT_TTL_SECS
        } else {
            ttl_secs
        };

        self.entries.put(
            key.to_string(),
            CacheEntry::new(response.clone(), Duration::from_secs(ttl)),
        );
        self.stats.entries = self.entries.len();
    }

    /// Release all entries and stop accepting reads and writes
    pub fn close(&mut self) {
        self.entries.clear();
        self.stats.entries = 0;
        self.closed = true;
    }

    /// Get current cache statistics
    pub fn stats(&self) -> &CacheStats {
        &self.stats
    }

    /// Get the number of entries in the cache
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the cache is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
