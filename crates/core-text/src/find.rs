//! Literal substring search relative to the cursor.

use crate::Document;
use crate::chars;
use core_cache::Memoized;
use once_cell::sync::Lazy;
use regex::{Regex, RegexBuilder};

type PatternKey = (String, bool);

/// Compiled escaped literals keyed by `(pattern, ignore_case)`.
static LITERAL_PATTERNS: Lazy<Memoized<PatternKey, Option<Regex>>> = Lazy::new(|| {
    Memoized::with_default_size(|(pattern, ignore_case): &PatternKey| {
        RegexBuilder::new(&regex::escape(pattern))
            .case_insensitive(*ignore_case)
            .build()
            .ok()
    })
});

fn literal(pattern: &str, ignore_case: bool) -> Option<Regex> {
    LITERAL_PATTERNS.call((pattern.to_owned(), ignore_case))
}

/// Knobs for [`Document::find`] and [`Document::find_backwards`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FindOptions {
    /// Return the n-th match (1-based). Zero never matches.
    pub count: usize,
    pub ignore_case: bool,
    /// Restrict the search window to the cursor's line.
    pub in_current_line: bool,
    /// Allow a match starting at the cursor itself (forward search only).
    pub include_current_position: bool,
}

impl Default for FindOptions {
    fn default() -> Self {
        Self {
            count: 1,
            ignore_case: false,
            in_current_line: false,
            include_current_position: false,
        }
    }
}

/// Converts ascending byte offsets in `hay` to char offsets in one pass.
struct CharCounter<'a> {
    hay: &'a str,
    byte: usize,
    chars: usize,
}

impl<'a> CharCounter<'a> {
    fn new(hay: &'a str) -> Self {
        Self { hay, byte: 0, chars: 0 }
    }

    fn at(&mut self, byte: usize) -> usize {
        self.chars += chars::char_len(&self.hay[self.byte..byte]);
        self.byte = byte;
        self.chars
    }
}

impl Document {
    /// Offset from the cursor of the `count`-th occurrence of `sub` after the
    /// cursor. An empty `sub` matches at every position.
    pub fn find(&self, sub: &str, opts: FindOptions) -> Option<isize> {
        let window = if opts.in_current_line {
            self.current_line_after_cursor()
        } else {
            self.text_after_cursor()
        };
        let (hay, shift) = if opts.include_current_position {
            (window, 0)
        } else {
            let mut it = window.chars();
            it.next()?;
            (it.as_str(), 1)
        };
        let re = literal(sub, opts.ignore_case)?;
        let m = re.find_iter(hay).nth(opts.count.checked_sub(1)?)?;
        Some((chars::chars_before(hay, m.start()) + shift) as isize)
    }

    /// Non-positive offset to the start of the `count`-th occurrence of `sub`
    /// ending at or before the cursor, scanning leftwards.
    pub fn find_backwards(&self, sub: &str, opts: FindOptions) -> Option<isize> {
        let window = if opts.in_current_line {
            self.current_line_before_cursor()
        } else {
            self.text_before_cursor()
        };
        let hay = chars::reversed(window);
        let re = literal(&chars::reversed(sub), opts.ignore_case)?;
        let m = re.find_iter(&hay).nth(opts.count.checked_sub(1)?)?;
        let start = chars::chars_before(&hay, m.start());
        Some(-((start + chars::char_len(sub)) as isize))
    }

    /// Absolute char positions of every occurrence of `sub`.
    pub fn find_all(&self, sub: &str, ignore_case: bool) -> Vec<usize> {
        let Some(re) = literal(sub, ignore_case) else {
            return Vec::new();
        };
        let text = self.text();
        let mut counter = CharCounter::new(text);
        re.find_iter(text).map(|m| counter.at(m.start())).collect()
    }

    pub fn has_match_at_current_position(&self, sub: &str) -> bool {
        self.text_after_cursor().starts_with(sub)
    }
}
