//! FIFO eviction properties and concurrent stress for the bounded caches.

use core_cache::{FastDictCache, SimpleCache, memoize1};
use proptest::prelude::*;
use std::collections::HashSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;

proptest! {
    // Inserting size+2 distinct keys evicts exactly the two oldest.
    #[test]
    fn simple_cache_evicts_two_oldest(size in 1usize..40) {
        let cache = SimpleCache::new(size).unwrap();
        for k in 0..size + 2 {
            cache.get(k, || k);
        }
        prop_assert_eq!(cache.len(), size);
        prop_assert!(!cache.contains_key(&0));
        prop_assert!(!cache.contains_key(&1));
        for k in 2..size + 2 {
            prop_assert!(cache.contains_key(&k));
        }
    }

    #[test]
    fn memoized_never_exceeds_bound(size in 1usize..20, calls in prop::collection::vec(0u16..64, 1..200)) {
        let f = memoize1(|x: &u16| *x as u32 * 3, Some(size)).unwrap();
        for c in calls {
            prop_assert_eq!(f.call1(c), c as u32 * 3);
            prop_assert!(f.cached_len() <= size);
        }
    }

    #[test]
    fn fast_dict_survivors_are_the_newest(size in 1usize..30, extra in 1usize..30) {
        let cache = FastDictCache::new(|k: &usize| *k, size).unwrap();
        let total = size + 1 + extra;
        for k in 0..total {
            cache.get(&k);
        }
        // Bound is checked before insertion, so size + 1 entries remain.
        prop_assert_eq!(cache.len(), size + 1);
        for k in 0..total - (size + 1) {
            prop_assert!(!cache.contains_key(&k));
        }
        for k in total - (size + 1)..total {
            prop_assert!(cache.contains_key(&k));
        }
    }
}

#[test]
fn simple_cache_refetches_evicted_key_only() {
    let cache = SimpleCache::new(3).unwrap();
    let calls = AtomicUsize::new(0);
    let fetch = |k: u32| {
        calls.fetch_add(1, Ordering::SeqCst);
        k
    };
    for k in 1..=4 {
        cache.get(k, || fetch(k));
    }
    calls.store(0, Ordering::SeqCst);
    for k in 2..=4 {
        cache.get(k, || fetch(k));
    }
    assert_eq!(calls.load(Ordering::SeqCst), 0);
    cache.get(1, || fetch(1));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn fast_dict_concurrent_mixed_traffic() {
    let calls = Arc::new(AtomicUsize::new(0));
    let c = calls.clone();
    let cache = Arc::new(
        FastDictCache::new(
            move |k: &u64| {
                c.fetch_add(1, Ordering::Relaxed);
                k.wrapping_mul(31)
            },
            64,
        )
        .unwrap(),
    );
    let mut handles = Vec::new();
    for t in 0..8u64 {
        let cache = cache.clone();
        handles.push(thread::spawn(move || {
            for i in 0..5_000u64 {
                let key = (i * 7 + t) % 200;
                assert_eq!(cache.get(&key), key.wrapping_mul(31));
                if let Some(v) = cache.try_get_value(&key) {
                    assert_eq!(v, key.wrapping_mul(31));
                }
                let _ = cache.contains_key(&(key + 1));
            }
        }));
    }
    for h in handles {
        h.join().expect("worker panicked");
    }
    assert!(cache.len() <= 65);
    assert!(calls.load(Ordering::Relaxed) >= 200);
}

#[test]
fn simple_cache_concurrent_clear_and_get() {
    let cache = Arc::new(SimpleCache::new(16).unwrap());
    let mut handles = Vec::new();
    for t in 0..6u32 {
        let cache = cache.clone();
        handles.push(thread::spawn(move || {
            for i in 0..3_000u32 {
                let key = (i + t) % 40;
                assert_eq!(cache.get(key, || key + 1), key + 1);
                if i % 500 == 0 {
                    cache.clear();
                }
            }
        }));
    }
    for h in handles {
        h.join().expect("worker panicked");
    }
    assert!(cache.len() <= 16);
    let keys: HashSet<u32> = (0..40).filter(|k| cache.contains_key(k)).collect();
    assert_eq!(keys.len(), cache.len());
}
