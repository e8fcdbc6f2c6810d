//! Bounded interning cache for lazily created codecs

use std::collections::{HashMap, VecDeque};
use std::hash::Hash;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use super::codec::SchemaCodec;
use crate::config::ProjectionConfig;

/// Least-recently-used map with a fixed capacity.
#[derive(Debug)]
pub struct LruCache<K, V> {
    capacity: usize,
    map: HashMap<K, V>,
    order: VecDeque<K>,
}

impl<K: Eq + Hash + Clone, V> LruCache<K, V> {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            map: HashMap::with_capacity(capacity),
            order: VecDeque::with_capacity(capacity),
        }
    }

    /// Look up a value and mark it most recently used
    pub fn get(&mut self, key: &K) -> Option<&V> {
        if self.map.contains_key(key) {
            self.touch(key);
        }
        self.map.get(key)
    }

    /// Insert a value, evicting the least recently used entry when full
    ///
    /// Returns the number of evicted entries.
    pub fn insert(&mut self, key: K, value: V) -> usize {
        if self.map.insert(key.clone(), value).is_some() {
            self.touch(&key);
            return 0;
        }
        self.order.push_back(key);
        let mut evicted = 0;
        while self.map.len() > self.capacity {
            match self.order.pop_front() {
                Some(oldest) => {
                    self.map.remove(&oldest);
                    evicted += 1;
                }
                None => break,
            }
        }
        evicted
    }

    pub fn contains(&self, key: &K) -> bool {
        self.map.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    fn touch(&mut self, key: &K) {
        if let Some(pos) = self.order.iter().position(|k| k == key) {
            if let Some(k) = self.order.remove(pos) {
                self.order.push_back(k);
            }
        }
    }
}

/// Hit/miss counters of a [`CodecCache`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
}

/// Shared codec cache keyed by schema path.
///
/// Child codecs are created on first use and interned here, so repeated
/// resolution of the same schema node yields the same `Arc` while the entry
/// stays resident. Eviction only drops the cache's reference; codecs held by
/// live views stay valid.
#[derive(Debug)]
pub struct CodecCache {
    inner: Mutex<LruCache<String, Arc<SchemaCodec>>>,
    hits: AtomicU64,
    misses: AtomicU64,
    evictions: AtomicU64,
}

impl CodecCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: Mutex::new(LruCache::new(capacity)),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            evictions: AtomicU64::new(0),
        }
    }

    pub fn from_config(config: &ProjectionConfig) -> Self {
        Self::new(config.codec_cache_capacity)
    }

    /// Return the interned codec for `path`, building it on a miss
    pub fn get_or_insert_with<F>(&self, path: &str, build: F) -> Arc<SchemaCodec>
    where
        F: FnOnce() -> SchemaCodec,
    {
        let mut inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        let key = path.to_string();
        if let Some(codec) = inner.get(&key) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            return Arc::clone(codec);
        }
        self.misses.fetch_add(1, Ordering::Relaxed);
        let codec = Arc::new(build());
        let evicted = inner.insert(key, Arc::clone(&codec));
        if evicted > 0 {
            self.evictions.fetch_add(evicted as u64, Ordering::Relaxed);
            tracing::trace!(path, evicted, "codec cache eviction");
        }
        codec
    }

    pub fn len(&self) -> usize {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .capacity()
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            evictions: self.evictions.load(Ordering::Relaxed),
        }
    }
}

impl Default for CodecCache {
    fn default() -> Self {
        Self::from_config(&ProjectionConfig::default())
    }
}
