//! Bounded key/value caches with FIFO eviction.
//!
//! Three flavors share one eviction rule (drop the single oldest *inserted*
//! key, never the least recently used one):
//! - [`FastDictCache`]: bound to a getter at construction; lookups populate on
//!   miss. Sized for very large working sets (default one million entries) and
//!   read-mostly traffic, so hits only take a shared lock.
//! - [`SimpleCache`]: the getter is supplied per lookup. Small default bound.
//! - [`Memoized`]: wraps a pure function of 1..=3 arguments on top of a
//!   `SimpleCache` keyed by the argument tuple.
//!
//! Concurrency contract:
//! - Getters run *outside* the internal lock. Two threads missing on the same
//!   key may both compute; the first insertion wins and the second caller
//!   receives the winning value, so a key is never queued for eviction twice.
//! - A getter that panics or returns `Err` leaves no entry behind (nothing is
//!   inserted until a value exists).
//!
//! Size check placement differs on purpose:
//! - `FastDictCache` checks `len > size` *before* inserting, so it may hold
//!   exactly `size + 1` entries.
//! - `SimpleCache` checks after inserting and never exceeds its bound.

mod fast_dict;
mod fifo;
mod memo;
mod simple;

pub use fast_dict::FastDictCache;
pub use memo::{Memoized, memoize1, memoize2, memoize3};
pub use simple::SimpleCache;

use thiserror::Error;

/// Default bound of a [`FastDictCache`].
pub const FAST_DICT_DEFAULT_SIZE: usize = 1_000_000;
/// Default bound of a [`SimpleCache`].
pub const SIMPLE_CACHE_DEFAULT_SIZE: usize = 8;
/// Default bound of a [`Memoized`] function.
pub const MEMO_DEFAULT_SIZE: usize = 1024;

/// Construction errors shared by every cache flavor.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum CacheError {
    #[error("cache size must be positive (got {0})")]
    InvalidSize(usize),
}

pub(crate) fn check_size(size: usize) -> Result<usize, CacheError> {
    if size == 0 {
        Err(CacheError::InvalidSize(size))
    } else {
        Ok(size)
    }
}
