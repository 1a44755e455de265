// SPDX-License-Identifier: MPL-2.0
//! Bounded cache of scrub preview thumbnails.
//!
//! # Design
//!
//! - **Second-keyed**: entries are indexed by the whole second at or before
//!   the captured time, so nearby hovers share one capture
//! - **LRU eviction**: least recently shown thumbnails go first once the
//!   entry cap is reached
//! - **Per source**: the owner clears the cache whenever the source changes

use super::media::Thumbnail;
use lru::LruCache;
use std::num::NonZeroUsize;

/// Statistics about cache performance.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub entry_count: usize,
    pub total_bytes: usize,
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
    pub insertions: u64,
}

impl CacheStats {
    /// Returns the cache hit rate as a percentage (0.0 - 100.0).
    #[allow(clippy::cast_precision_loss)]
    #[must_use]
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            (self.hits as f64 / total as f64) * 100.0
        }
    }
}

#[derive(Debug)]
pub struct PreviewCache {
    entries: LruCache<u32, Thumbnail>,
    stats: CacheStats,
}

impl PreviewCache {
    /// Creates a cache holding at most `capacity` thumbnails (minimum 1).
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: LruCache::new(capacity),
            stats: CacheStats::default(),
        }
    }

    /// Looks up a thumbnail, counting the hit or miss.
    pub fn get(&mut self, key: u32) -> Option<Thumbnail> {
        match self.entries.get(&key) {
            Some(thumbnail) => {
                self.stats.hits += 1;
                Some(thumbnail.clone())
            }
            None => {
                self.stats.misses += 1;
                None
            }
        }
    }

    /// Checks presence without touching recency or statistics.
    #[must_use]
    pub fn contains(&self, key: u32) -> bool {
        self.entries.contains(&key)
    }

    pub fn insert(&mut self, key: u32, thumbnail: Thumbnail) {
        let size = thumbnail.size_bytes;
        if let Some((evicted_key, evicted)) = self.entries.push(key, thumbnail) {
            self.stats.total_bytes -= evicted.size_bytes;
            if evicted_key != key {
                self.stats.evictions += 1;
            }
        }
        self.stats.total_bytes += size;
        self.stats.insertions += 1;
        self.stats.entry_count = self.entries.len();
    }

    /// Drops every entry. Statistics other than the size are kept.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.stats.entry_count = 0;
        self.stats.total_bytes = 0;
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn stats(&self) -> CacheStats {
        self.stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn thumb(size: usize) -> Thumbnail {
        Thumbnail::from_encoded(vec![0u8; size])
    }

    #[test]
    fn get_counts_hits_and_misses() {
        let mut cache = PreviewCache::new(4);
        assert!(cache.get(3).is_none());
        cache.insert(3, thumb(10));
        assert!(cache.get(3).is_some());

        let stats = cache.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert!((stats.hit_rate() - 50.0).abs() < f64::EPSILON);
    }

    #[test]
    fn evicts_least_recently_used() {
        let mut cache = PreviewCache::new(2);
        cache.insert(1, thumb(10));
        cache.insert(2, thumb(10));
        assert!(cache.get(1).is_some());
        cache.insert(3, thumb(10));

        assert!(cache.contains(1));
        assert!(!cache.contains(2));
        assert!(cache.contains(3));
        assert_eq!(cache.stats().evictions, 1);
        assert_eq!(cache.stats().total_bytes, 20);
    }

    #[test]
    fn replacing_a_key_updates_size_without_eviction() {
        let mut cache = PreviewCache::new(2);
        cache.insert(7, thumb(10));
        cache.insert(7, thumb(25));
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.stats().total_bytes, 25);
        assert_eq!(cache.stats().evictions, 0);
    }

    #[test]
    fn clear_empties_cache() {
        let mut cache = PreviewCache::new(8);
        cache.insert(1, thumb(10));
        cache.insert(2, thumb(10));
        cache.clear();
        assert!(cache.is_empty());
        assert_eq!(cache.stats().total_bytes, 0);
        assert_eq!(cache.stats().entry_count, 0);
    }

    #[test]
    fn zero_capacity_is_raised_to_one() {
        let mut cache = PreviewCache::new(0);
        cache.insert(1, thumb(1));
        cache.insert(2, thumb(1));
        assert_eq!(cache.len(), 1);
        assert!(cache.contains(2));
    }
}
