use ahash::RandomState;
use std::collections::{HashMap, VecDeque};
use std::hash::Hash;
use tracing::trace;

/// Map plus insertion-order queue. Every key in `order` is present in `map`
/// and vice versa; callers must not insert a key that is already present.
pub(crate) struct FifoStore<K, V> {
    map: HashMap<K, V, RandomState>,
    order: VecDeque<K>,
}

impl<K: Hash + Eq + Clone, V> FifoStore<K, V> {
    pub(crate) fn new() -> Self {
        Self {
            map: HashMap::with_hasher(RandomState::new()),
            order: VecDeque::new(),
        }
    }

    pub(crate) fn get(&self, key: &K) -> Option<&V> {
        self.map.get(key)
    }

    pub(crate) fn contains_key(&self, key: &K) -> bool {
        self.map.contains_key(key)
    }

    pub(crate) fn len(&self) -> usize {
        self.map.len()
    }

    pub(crate) fn insert_new(&mut self, key: K, value: V) {
        debug_assert!(!self.map.contains_key(&key));
        self.order.push_back(key.clone());
        self.map.insert(key, value);
    }

    /// Drop the oldest inserted entry. Returns false when empty.
    pub(crate) fn evict_oldest(&mut self) -> bool {
        match self.order.pop_front() {
            Some(key) => {
                self.map.remove(&key);
                trace!(target: "cache", remaining = self.map.len(), "evict_oldest");
                true
            }
            None => false,
        }
    }

    pub(crate) fn clear(&mut self) {
        self.map.clear();
        self.order.clear();
    }

    #[cfg(test)]
    pub(crate) fn order_len(&self) -> usize {
        self.order.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn eviction_follows_insertion_order() {
        let mut s = FifoStore::new();
        s.insert_new(1, "a");
        s.insert_new(2, "b");
        s.insert_new(3, "c");
        assert!(s.evict_oldest());
        assert!(!s.contains_key(&1));
        assert!(s.contains_key(&2));
        assert_eq!(s.len(), 2);
        assert_eq!(s.order_len(), 2);
    }

    #[test]
    fn evict_on_empty_is_noop() {
        let mut s: FifoStore<u8, u8> = FifoStore::new();
        assert!(!s.evict_oldest());
        s.insert_new(1, 1);
        s.clear();
        assert_eq!(s.len(), 0);
        assert_eq!(s.order_len(), 0);
    }
}
