//! Memoizing wrappers for pure functions.
//!
//! The argument tuple is the cache key, so every argument must be
//! `Hash + Eq + Clone`; structural equality decides hits.

use crate::{CacheError, MEMO_DEFAULT_SIZE, SimpleCache};
use std::fmt;
use std::hash::Hash;

type Func<A, R> = Box<dyn Fn(&A) -> R + Send + Sync>;

/// A pure function of the argument tuple `A` with a bounded FIFO result cache.
pub struct Memoized<A, R> {
    func: Func<A, R>,
    cache: SimpleCache<A, R>,
}

impl<A, R> Memoized<A, R>
where
    A: Hash + Eq + Clone,
    R: Clone,
{
    pub fn new<F>(func: F, max_size: usize) -> Result<Self, CacheError>
    where
        F: Fn(&A) -> R + Send + Sync + 'static,
    {
        Ok(Self {
            func: Box::new(func),
            cache: SimpleCache::new(max_size)?,
        })
    }

    /// Like [`Memoized::new`] with the [`MEMO_DEFAULT_SIZE`] bound.
    pub fn with_default_size<F>(func: F) -> Self
    where
        F: Fn(&A) -> R + Send + Sync + 'static,
    {
        Self {
            func: Box::new(func),
            cache: SimpleCache::with_bound(MEMO_DEFAULT_SIZE),
        }
    }

    pub fn call(&self, args: A) -> R {
        let func = &self.func;
        let key = args.clone();
        self.cache.get(key, || func(&args))
    }

    pub fn is_cached(&self, args: &A) -> bool {
        self.cache.contains_key(args)
    }

    pub fn cached_len(&self) -> usize {
        self.cache.len()
    }

    pub fn clear(&self) {
        self.cache.clear();
    }
}

impl<A, R> Memoized<(A,), R>
where
    A: Hash + Eq + Clone,
    R: Clone,
{
    pub fn call1(&self, a: A) -> R {
        self.call((a,))
    }
}

impl<A, B, R> Memoized<(A, B), R>
where
    A: Hash + Eq + Clone,
    B: Hash + Eq + Clone,
    R: Clone,
{
    pub fn call2(&self, a: A, b: B) -> R {
        self.call((a, b))
    }
}

impl<A, B, C, R> Memoized<(A, B, C), R>
where
    A: Hash + Eq + Clone,
    B: Hash + Eq + Clone,
    C: Hash + Eq + Clone,
    R: Clone,
{
    pub fn call3(&self, a: A, b: B, c: C) -> R {
        self.call((a, b, c))
    }
}

impl<A, R> fmt::Debug for Memoized<A, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Memoized")
            .field("cache", &self.cache)
            .finish_non_exhaustive()
    }
}

/// Memoize a one-argument function. `max_size` defaults to [`MEMO_DEFAULT_SIZE`].
pub fn memoize1<A, R, F>(
    func: F,
    max_size: Option<usize>,
) -> Result<Memoized<(A,), R>, CacheError>
where
    A: Hash + Eq + Clone + 'static,
    R: Clone + 'static,
    F: Fn(&A) -> R + Send + Sync + 'static,
{
    Memoized::new(
        move |(a,): &(A,)| func(a),
        max_size.unwrap_or(MEMO_DEFAULT_SIZE),
    )
}

pub fn memoize2<A, B, R, F>(
    func: F,
    max_size: Option<usize>,
) -> Result<Memoized<(A, B), R>, CacheError>
where
    A: Hash + Eq + Clone + 'static,
    B: Hash + Eq + Clone + 'static,
    R: Clone + 'static,
    F: Fn(&A, &B) -> R + Send + Sync + 'static,
{
    Memoized::new(
        move |(a, b): &(A, B)| func(a, b),
        max_size.unwrap_or(MEMO_DEFAULT_SIZE),
    )
}

pub fn memoize3<A, B, C, R, F>(
    func: F,
    max_size: Option<usize>,
) -> Result<Memoized<(A, B, C), R>, CacheError>
where
    A: Hash + Eq + Clone + 'static,
    B: Hash + Eq + Clone + 'static,
    C: Hash + Eq + Clone + 'static,
    R: Clone + 'static,
    F: Fn(&A, &B, &C) -> R + Send + Sync + 'static,
{
    Memoized::new(
        move |(a, b, c): &(A, B, C)| func(a, b, c),
        max_size.unwrap_or(MEMO_DEFAULT_SIZE),
    )
}
