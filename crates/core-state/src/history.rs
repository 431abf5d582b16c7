//! Persisted input history and the shell-style argument splitter used by
//! the yank-argument commands.

use parking_lot::RwLock;
use std::fmt;
use tracing::debug;

/// Ordered store of previously accepted inputs, oldest first.
///
/// Implementations must be safe to call from several threads; the buffer
/// never holds its own lock while calling into the store.
pub trait History: Send + Sync {
    /// Every stored entry, oldest first.
    fn load(&self) -> Vec<String>;
    fn append_string(&self, entry: &str);
}

/// History kept in process memory.
#[derive(Default)]
pub struct InMemoryHistory {
    entries: RwLock<Vec<String>>,
}

impl InMemoryHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entries<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            entries: RwLock::new(entries.into_iter().map(Into::into).collect()),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl History for InMemoryHistory {
    fn load(&self) -> Vec<String> {
        self.entries.read().clone()
    }

    fn append_string(&self, entry: &str) {
        let mut entries = self.entries.write();
        entries.push(entry.to_string());
        debug!(target: "state.history", entries = entries.len(), "history_appended");
    }
}

impl fmt::Debug for InMemoryHistory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InMemoryHistory").field("entries", &self.len()).finish()
    }
}

/// Split `line` into arguments. Runs of whitespace separate words; a
/// single- or double-quoted span is one word with its quotes kept, and an
/// unterminated quote runs to the end of the line.
pub fn split_arguments(line: &str) -> Vec<String> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut chars = line.chars();
    while let Some(c) = chars.next() {
        match c {
            '"' | '\'' => {
                if !current.is_empty() {
                    words.push(std::mem::take(&mut current));
                }
                let mut quoted = String::from(c);
                for q in chars.by_ref() {
                    quoted.push(q);
                    if q == c {
                        break;
                    }
                }
                words.push(quoted);
            }
            c if c.is_whitespace() => {
                if !current.is_empty() {
                    words.push(std::mem::take(&mut current));
                }
            }
            c => current.push(c),
        }
    }
    if !current.is_empty() {
        words.push(current);
    }
    words
}

/// Pick word `n` from `words`; negative `n` counts from the end. Out of
/// range yields an empty string.
pub(crate) fn nth_word(words: &[String], n: isize) -> &str {
    let index = if n < 0 {
        words.len().checked_sub(n.unsigned_abs())
    } else {
        Some(n as usize)
    };
    index.and_then(|i| words.get(i)).map_or("", String::as_str)
}

/// Progress of repeated yank-argument commands.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct YankNthArgState {
    /// Negative offset from the newest history entry.
    pub history_position: isize,
    pub n: isize,
    pub previous_inserted_word: String,
}

impl YankNthArgState {
    pub(crate) fn new(n: isize) -> Self {
        Self {
            history_position: 0,
            n,
            previous_inserted_word: String::new(),
        }
    }
}
