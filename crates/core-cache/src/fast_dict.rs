use crate::fifo::FifoStore;
use crate::{CacheError, FAST_DICT_DEFAULT_SIZE, check_size};
use parking_lot::RwLock;
use std::fmt;
use std::hash::Hash;

type Getter<K, V> = Box<dyn Fn(&K) -> V + Send + Sync>;

/// Getter-bound cache tuned for read-heavy traffic (hits take a read lock).
///
/// The bound is checked *before* inserting with a strict `>` comparison, so
/// after a miss the cache can transiently hold `size + 1` entries. When the
/// check trips, exactly one entry (the oldest inserted) is dropped.
pub struct FastDictCache<K, V> {
    getter: Getter<K, V>,
    size: usize,
    store: RwLock<FifoStore<K, V>>,
}

impl<K, V> FastDictCache<K, V>
where
    K: Hash + Eq + Clone,
    V: Clone,
{
    /// Create a cache around `getter` holding at most `size` (+1) entries.
    pub fn new<F>(getter: F, size: usize) -> Result<Self, CacheError>
    where
        F: Fn(&K) -> V + Send + Sync + 'static,
    {
        Ok(Self {
            getter: Box::new(getter),
            size: check_size(size)?,
            store: RwLock::new(FifoStore::new()),
        })
    }

    /// Create a cache with [`FAST_DICT_DEFAULT_SIZE`].
    pub fn with_default_size<F>(getter: F) -> Self
    where
        F: Fn(&K) -> V + Send + Sync + 'static,
    {
        Self {
            getter: Box::new(getter),
            size: FAST_DICT_DEFAULT_SIZE,
            store: RwLock::new(FifoStore::new()),
        }
    }

    /// Return the cached value for `key`, computing and inserting it on a miss.
    pub fn get(&self, key: &K) -> V {
        if let Some(v) = self.store.read().get(key) {
            return v.clone();
        }
        // Compute outside the lock; nothing is recorded if the getter panics.
        let value = (self.getter)(key);
        let mut store = self.store.write();
        if let Some(existing) = store.get(key) {
            return existing.clone();
        }
        if store.len() > self.size {
            store.evict_oldest();
        }
        store.insert_new(key.clone(), value.clone());
        value
    }

    /// Never invokes the getter.
    pub fn contains_key(&self, key: &K) -> bool {
        self.store.read().contains_key(key)
    }

    /// Never invokes the getter.
    pub fn try_get_value(&self, key: &K) -> Option<V> {
        self.store.read().get(key).cloned()
    }

    pub fn len(&self) -> usize {
        self.store.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn size(&self) -> usize {
        self.size
    }
}

impl<K, V> fmt::Debug for FastDictCache<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FastDictCache")
            .field("size", &self.size)
            .finish_non_exhaustive()
    }
}
