//! Buffer behaviour flags.
//!
//! Each flag is a [`Condition`] evaluated at the moment it is consulted, so
//! an embedding application can tie it to live state (e.g. the current
//! editing mode). [`BufferOptions::from_config`] seeds constant flags from
//! the loaded configuration.

use core_config::Config;
use std::fmt;
use std::sync::Arc;

/// A boolean predicate evaluated on demand.
#[derive(Clone)]
pub struct Condition(Arc<dyn Fn() -> bool + Send + Sync>);

impl Condition {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn() -> bool + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    pub fn constant(value: bool) -> Self {
        Self::new(move || value)
    }

    pub fn eval(&self) -> bool {
        (self.0)()
    }
}

impl From<bool> for Condition {
    fn from(value: bool) -> Self {
        Self::constant(value)
    }
}

impl Default for Condition {
    fn default() -> Self {
        Self::constant(false)
    }
}

impl fmt::Debug for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Condition({})", self.eval())
    }
}

#[derive(Debug, Clone)]
pub struct BufferOptions {
    pub multiline: Condition,
    pub read_only: Condition,
    pub complete_while_typing: Condition,
    pub validate_while_typing: Condition,
    pub enable_history_search: Condition,
    /// Chars of text shown by the `Display` impl before truncation.
    pub preview_len: usize,
    pub undo_limit: usize,
}

impl Default for BufferOptions {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

impl BufferOptions {
    pub fn from_config(config: &Config) -> Self {
        let b = config.buffer();
        Self {
            multiline: b.multiline.into(),
            read_only: b.read_only.into(),
            complete_while_typing: b.complete_while_typing.into(),
            validate_while_typing: b.validate_while_typing.into(),
            enable_history_search: b.enable_history_search.into(),
            preview_len: b.preview_len.max(core_config::MIN_PREVIEW_LEN),
            undo_limit: config.undo_limit().max(1),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};

    #[test]
    fn defaults_follow_config_defaults() {
        let o = BufferOptions::default();
        assert!(o.multiline.eval());
        assert!(!o.read_only.eval());
        assert_eq!(o.preview_len, 15);
        assert_eq!(o.undo_limit, 200);
    }

    #[test]
    fn condition_is_evaluated_live() {
        let flag = Arc::new(AtomicBool::new(false));
        let f = flag.clone();
        let c = Condition::new(move || f.load(Ordering::SeqCst));
        assert!(!c.eval());
        flag.store(true, Ordering::SeqCst);
        assert!(c.eval());
    }
}
