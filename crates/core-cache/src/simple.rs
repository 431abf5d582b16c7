use crate::fifo::FifoStore;
use crate::{CacheError, SIMPLE_CACHE_DEFAULT_SIZE, check_size};
use parking_lot::Mutex;
use std::fmt;
use std::hash::Hash;

/// Small FIFO cache whose getter is supplied per lookup.
///
/// Unlike [`crate::FastDictCache`] the bound is enforced right after
/// insertion, so the cache never holds more than `max_size` entries.
pub struct SimpleCache<K, V> {
    max_size: usize,
    store: Mutex<FifoStore<K, V>>,
}

impl<K, V> SimpleCache<K, V>
where
    K: Hash + Eq + Clone,
    V: Clone,
{
    pub fn new(max_size: usize) -> Result<Self, CacheError> {
        Ok(Self {
            max_size: check_size(max_size)?,
            store: Mutex::new(FifoStore::new()),
        })
    }

    pub(crate) fn with_bound(max_size: usize) -> Self {
        Self {
            max_size: max_size.max(1),
            store: Mutex::new(FifoStore::new()),
        }
    }

    /// Look up `key`, calling `getter` and caching its result on a miss.
    pub fn get<F>(&self, key: K, getter: F) -> V
    where
        F: FnOnce() -> V,
    {
        if let Some(v) = self.store.lock().get(&key) {
            return v.clone();
        }
        let value = getter();
        self.insert_computed(key, value)
    }

    /// Fallible variant of [`SimpleCache::get`]; an `Err` is returned to the
    /// caller and nothing is cached.
    pub fn try_get<F, E>(&self, key: K, getter: F) -> Result<V, E>
    where
        F: FnOnce() -> Result<V, E>,
    {
        if let Some(v) = self.store.lock().get(&key) {
            return Ok(v.clone());
        }
        let value = getter()?;
        Ok(self.insert_computed(key, value))
    }

    fn insert_computed(&self, key: K, value: V) -> V {
        let mut store = self.store.lock();
        if let Some(existing) = store.get(&key) {
            return existing.clone();
        }
        store.insert_new(key, value.clone());
        while store.len() > self.max_size {
            store.evict_oldest();
        }
        value
    }

    pub fn contains_key(&self, key: &K) -> bool {
        self.store.lock().contains_key(key)
    }

    pub fn try_get_value(&self, key: &K) -> Option<V> {
        self.store.lock().get(key).cloned()
    }

    /// Drop every entry in one step.
    pub fn clear(&self) {
        self.store.lock().clear();
    }

    pub fn len(&self) -> usize {
        self.store.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn max_size(&self) -> usize {
        self.max_size
    }
}

impl<K, V> Default for SimpleCache<K, V>
where
    K: Hash + Eq + Clone,
{
    fn default() -> Self {
        Self {
            max_size: SIMPLE_CACHE_DEFAULT_SIZE,
            store: Mutex::new(FifoStore::new()),
        }
    }
}

impl<K, V> fmt::Debug for SimpleCache<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SimpleCache")
            .field("max_size", &self.max_size)
            .finish_non_exhaustive()
    }
}
