//! Two-level caching for data worth keeping warm
//!
//! L1 is a small HashMap for the entries in active use, L2 a larger LRU
//! for everything that still matters. Lookups try L1 first and promote L2
//! hits back up, so a working set that fits L1 pays one map probe per
//! access. The facade keys rendered glyph masks through this; anything
//! hashable works.

use lru::LruCache;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::hash::Hash;
use std::num::NonZeroUsize;

const DEFAULT_L2_CAPACITY: NonZeroUsize = match NonZeroUsize::new(1024) {
    Some(v) => v,
    None => unreachable!(),
};

struct Entry<V> {
    value: V,
    /// Insertion order, used for L1 eviction
    stamp: u64,
}

/// Running totals of cache behavior
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheMetrics {
    pub requests: u64,
    pub l1_hits: u64,
    pub l2_hits: u64,
    pub misses: u64,
}

impl CacheMetrics {
    pub fn hit_rate(&self) -> f64 {
        if self.requests == 0 {
            0.0
        } else {
            (self.l1_hits + self.l2_hits) as f64 / self.requests as f64
        }
    }
}

struct Levels<K: Hash + Eq, V> {
    l1: HashMap<K, Entry<V>>,
    l2: LruCache<K, V>,
    next_stamp: u64,
    metrics: CacheMetrics,
}

/// Both levels working together behind one lock
pub struct TwoLevelCache<K: Hash + Eq + Clone, V: Clone> {
    levels: RwLock<Levels<K, V>>,
    l1_capacity: usize,
}

impl<K: Hash + Eq + Clone, V: Clone> TwoLevelCache<K, V> {
    /// Build a cache with the given hot and total capacities
    pub fn new(l1_capacity: usize, l2_capacity: usize) -> Self {
        let l2_capacity = NonZeroUsize::new(l2_capacity).unwrap_or(DEFAULT_L2_CAPACITY);
        Self {
            levels: RwLock::new(Levels {
                l1: HashMap::with_capacity(l1_capacity),
                l2: LruCache::new(l2_capacity),
                next_stamp: 0,
                metrics: CacheMetrics::default(),
            }),
            l1_capacity,
        }
    }

    /// Lookup with auto-promotion: L1 first, then L2
    pub fn get(&self, key: &K) -> Option<V> {
        let mut levels = self.levels.write();
        levels.metrics.requests += 1;

        if let Some(value) = levels.l1.get(key).map(|entry| entry.value.clone()) {
            levels.metrics.l1_hits += 1;
            return Some(value);
        }

        if let Some(value) = levels.l2.get(key).cloned() {
            levels.metrics.l2_hits += 1;
            let stamp = levels.bump_stamp();
            Self::insert_l1(&mut levels, self.l1_capacity, key.clone(), value.clone(), stamp);
            return Some(value);
        }

        levels.metrics.misses += 1;
        None
    }

    /// Store in both levels
    pub fn insert(&self, key: K, value: V) {
        let mut levels = self.levels.write();
        let stamp = levels.bump_stamp();
        Self::insert_l1(&mut levels, self.l1_capacity, key.clone(), value.clone(), stamp);
        levels.l2.put(key, value);
    }

    /// Drop every entry, keeping the running metrics
    pub fn clear(&self) {
        let mut levels = self.levels.write();
        log::debug!(
            "cache cleared ({} L1 + {} L2 entries)",
            levels.l1.len(),
            levels.l2.len()
        );
        levels.l1.clear();
        levels.l2.clear();
    }

    pub fn len(&self) -> usize {
        self.levels.read().l2.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn metrics(&self) -> CacheMetrics {
        self.levels.read().metrics
    }

    fn insert_l1(levels: &mut Levels<K, V>, capacity: usize, key: K, value: V, stamp: u64) {
        if capacity == 0 {
            return;
        }
        // Evict the stalest entry when full and inserting a new key
        if levels.l1.len() >= capacity && !levels.l1.contains_key(&key) {
            if let Some(stale) = levels
                .l1
                .iter()
                .min_by_key(|(_, entry)| entry.stamp)
                .map(|(k, _)| k.clone())
            {
                levels.l1.remove(&stale);
            }
        }
        levels.l1.insert(key, Entry { value, stamp });
    }
}

impl<K: Hash + Eq, V> Levels<K, V> {
    fn bump_stamp(&mut self) -> u64 {
        let stamp = self.next_stamp;
        self.next_stamp += 1;
        stamp
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookups_count_hits_and_misses() {
        let cache: TwoLevelCache<u32, String> = TwoLevelCache::new(8, 64);

        cache.insert(1, "one".to_string());
        cache.insert(2, "two".to_string());

        assert_eq!(cache.get(&1), Some("one".to_string()));
        assert_eq!(cache.get(&2), Some("two".to_string()));
        assert_eq!(cache.get(&3), None);

        let metrics = cache.metrics();
        assert_eq!(metrics.requests, 3);
        assert_eq!(metrics.l1_hits, 2);
        assert_eq!(metrics.misses, 1);
        assert!(metrics.hit_rate() > 0.6 && metrics.hit_rate() < 0.7);
    }

    #[test]
    fn l2_hits_promote_back_into_l1() {
        let cache: TwoLevelCache<u32, String> = TwoLevelCache::new(1, 16);

        cache.insert(1, "one".to_string());
        cache.insert(2, "two".to_string()); // evicts 1 from L1, stays in L2

        assert_eq!(cache.get(&1), Some("one".to_string()));
        assert!(cache.metrics().l2_hits >= 1);

        // Promoted: the second lookup is an L1 hit
        let before = cache.metrics().l1_hits;
        assert_eq!(cache.get(&1), Some("one".to_string()));
        assert_eq!(cache.metrics().l1_hits, before + 1);
    }

    #[test]
    fn clear_empties_both_levels_but_keeps_metrics() {
        let cache: TwoLevelCache<u32, u32> = TwoLevelCache::new(4, 16);
        cache.insert(1, 10);
        let _ = cache.get(&1);
        cache.clear();

        assert!(cache.is_empty());
        assert_eq!(cache.get(&1), None);
        assert!(cache.metrics().requests >= 2);
    }

    #[test]
    fn l1_eviction_never_loses_l2_entries() {
        let cache: TwoLevelCache<u32, u32> = TwoLevelCache::new(2, 32);
        for i in 0..10 {
            cache.insert(i, i * 100);
        }
        for i in 0..10 {
            assert_eq!(cache.get(&i), Some(i * 100), "entry {i} survived in L2");
        }
    }
}
