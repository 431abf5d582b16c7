//! Process-wide flyweight of per-text line data.
//!
//! Documents over identical text share one [`LineIndex`], looked up through a
//! bounded [`FastDictCache`] keyed by the text itself.

use core_cache::FastDictCache;
use once_cell::sync::Lazy;
use std::sync::Arc;
use tracing::trace;

/// Bound of the shared line cache.
pub const LINE_CACHE_SIZE: usize = 10_000;

static LINE_CACHE: Lazy<FastDictCache<Arc<str>, Arc<LineIndex>>> = Lazy::new(|| {
    FastDictCache::new(build_line_index, LINE_CACHE_SIZE)
        .unwrap_or_else(|_| FastDictCache::with_default_size(build_line_index))
});

/// Lines of a text plus the char offset at which each one starts.
#[derive(Debug, PartialEq, Eq)]
pub struct LineIndex {
    lines: Vec<String>,
    line_starts: Vec<usize>,
    char_len: usize,
    ascii: bool,
}

impl LineIndex {
    pub fn build(text: &str) -> Self {
        let lines: Vec<String> = text.split('\n').map(str::to_owned).collect();
        let mut line_starts = Vec::with_capacity(lines.len());
        let mut pos = 0usize;
        for line in &lines {
            line_starts.push(pos);
            pos += line.chars().count() + 1;
        }
        Self {
            char_len: pos.saturating_sub(1),
            ascii: text.is_ascii(),
            lines,
            line_starts,
        }
    }

    /// Text split on `\n`; a trailing terminator yields a final empty line.
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn line_starts(&self) -> &[usize] {
        &self.line_starts
    }

    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Length of the whole text in chars.
    pub fn char_len(&self) -> usize {
        self.char_len
    }

    pub fn is_ascii(&self) -> bool {
        self.ascii
    }

    /// Char length of line `row` (0 when out of range).
    pub fn line_len(&self, row: usize) -> usize {
        match (self.line_starts.get(row), self.line_starts.get(row + 1)) {
            (Some(start), Some(next)) => next - start - 1,
            (Some(start), None) => self.char_len - start,
            _ => 0,
        }
    }

    /// Row containing char offset `index`; offsets past the end map to the last row.
    pub fn row_of(&self, index: usize) -> usize {
        self.line_starts
            .partition_point(|&start| start <= index)
            .saturating_sub(1)
    }
}

fn build_line_index(text: &Arc<str>) -> Arc<LineIndex> {
    let index = LineIndex::build(text);
    trace!(target: "text.lines", lines = index.line_count(), chars = index.char_len(), "line_index_built");
    Arc::new(index)
}

/// Shared [`LineIndex`] for `text`, computed at most once per cached text.
pub fn line_index(text: &Arc<str>) -> Arc<LineIndex> {
    LINE_CACHE.get(text)
}

/// True when `text` currently has an entry in the shared cache.
pub fn is_line_index_cached(text: &str) -> bool {
    LINE_CACHE.contains_key(&Arc::from(text))
}
