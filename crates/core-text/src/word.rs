//! vi-style word and WORD navigation.
//!
//! A *word* is a run of word chars (`\w`) or a run of punctuation; a *WORD* is
//! any run of non-whitespace. All results are signed char offsets from the
//! cursor, `None` when no such boundary exists.

use crate::Document;
use crate::chars;
use once_cell::sync::Lazy;
use regex::Regex;

/// Which boundary policy a word query uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum WordKind {
    /// Word chars, punctuation and whitespace are three classes.
    #[default]
    Word,
    /// Only whitespace separates.
    BigWord,
}

fn compile(pattern: &str) -> Regex {
    Regex::new(pattern).expect("word regex should compile")
}

static WORD: Lazy<Regex> = Lazy::new(|| compile(r"\w+|[^\w\s]+"));
static BIG_WORD: Lazy<Regex> = Lazy::new(|| compile(r"\S+"));
static CURRENT_WORD: Lazy<Regex> = Lazy::new(|| compile(r"^(?:\w+|[^\w\s]+)"));
static CURRENT_WORD_WS: Lazy<Regex> = Lazy::new(|| compile(r"^(?:\w+\s*|[^\w\s]+\s*)"));
static CURRENT_BIG_WORD: Lazy<Regex> = Lazy::new(|| compile(r"^\S+"));
static CURRENT_BIG_WORD_WS: Lazy<Regex> = Lazy::new(|| compile(r"^\S+\s*"));

fn runs(kind: WordKind) -> &'static Regex {
    match kind {
        WordKind::Word => &WORD,
        WordKind::BigWord => &BIG_WORD,
    }
}

fn anchored(kind: WordKind, with_whitespace: bool) -> &'static Regex {
    match (kind, with_whitespace) {
        (WordKind::Word, false) => &CURRENT_WORD,
        (WordKind::Word, true) => &CURRENT_WORD_WS,
        (WordKind::BigWord, false) => &CURRENT_BIG_WORD,
        (WordKind::BigWord, true) => &CURRENT_BIG_WORD_WS,
    }
}

/// Char offset of the `count`-th run start in `hay`, skipping a run that
/// begins at offset 0 (the one the cursor is on).
fn nth_start_skipping_current(re: &Regex, hay: &str, count: usize) -> Option<usize> {
    let mut count = count;
    for (i, m) in re.find_iter(hay).enumerate() {
        if i == 0 && m.start() == 0 {
            count += 1;
        }
        if i + 1 == count {
            return Some(chars::chars_before(hay, m.start()));
        }
    }
    None
}

impl Document {
    pub fn find_next_word_beginning(&self, count: usize, kind: WordKind) -> Option<isize> {
        nth_start_skipping_current(runs(kind), self.text_after_cursor(), count).map(|n| n as isize)
    }

    /// Offset to the end of the `count`-th word after the cursor. Without
    /// `include_current_position` a word ending right at the cursor is skipped.
    pub fn find_next_word_ending(
        &self,
        include_current_position: bool,
        count: usize,
        kind: WordKind,
    ) -> Option<isize> {
        let after = self.text_after_cursor();
        let (hay, shift) = if include_current_position {
            (after, 0)
        } else {
            (chars::tail(after, 1), 1)
        };
        let m = runs(kind).find_iter(hay).nth(count.checked_sub(1)?)?;
        Some((chars::chars_before(hay, m.end()) + shift) as isize)
    }

    pub fn find_previous_word_beginning(&self, count: usize, kind: WordKind) -> Option<isize> {
        let hay = chars::reversed(self.text_before_cursor());
        let m = runs(kind).find_iter(&hay).nth(count.checked_sub(1)?)?;
        Some(-(chars::chars_before(&hay, m.end()) as isize))
    }

    /// Offset to just past the end of the `count`-th word left of the cursor,
    /// not counting the word under the cursor.
    pub fn find_previous_word_ending(&self, count: usize, kind: WordKind) -> Option<isize> {
        let mut hay: String = chars::head(self.text_after_cursor(), 1).to_owned();
        hay.extend(self.text_before_cursor().chars().rev());
        nth_start_skipping_current(runs(kind), &hay, count).map(|n| 1 - n as isize)
    }

    /// Offset to the start of the `count`-th word left of the cursor.
    pub fn find_start_of_previous_word(&self, count: usize, kind: WordKind) -> Option<isize> {
        self.find_previous_word_beginning(count, kind)
    }

    /// `(start, end)` offsets of the word at or directly left of the cursor,
    /// `(0, 0)` inside whitespace. The whitespace flags extend the range over
    /// whitespace adjacent to the word.
    pub fn find_boundaries_of_current_word(
        &self,
        kind: WordKind,
        include_leading_whitespace: bool,
        include_trailing_whitespace: bool,
    ) -> (isize, isize) {
        let before = chars::reversed(self.current_line_before_cursor());
        let after = self.current_line_after_cursor();

        let mut match_before = anchored(kind, include_leading_whitespace)
            .find(&before)
            .map(|m| chars::chars_before(&before, m.end()));
        let match_after = anchored(kind, include_trailing_whitespace)
            .find(after)
            .map(|m| chars::chars_before(after, m.end()));

        // A word run and a punctuation run touching at the cursor are two words.
        if kind == WordKind::Word && match_before.is_some() && match_after.is_some() {
            let c1 = self.char_before_cursor();
            let c2 = self.current_char();
            if chars::is_word_char(c1) != chars::is_word_char(c2) {
                match_before = None;
            }
        }
        (
            match_before.map_or(0, |n| -(n as isize)),
            match_after.map_or(0, |n| n as isize),
        )
    }

    pub fn get_word_under_cursor(&self, kind: WordKind) -> &str {
        let (start, end) = self.find_boundaries_of_current_word(kind, false, false);
        let cursor = self.cursor_position();
        let from = cursor.saturating_add_signed(start);
        let to = cursor.saturating_add_signed(end);
        chars::slice(self.text(), from, to)
    }

    /// The (partial) word ending at the cursor; empty after whitespace.
    pub fn get_word_before_cursor(&self, kind: WordKind) -> &str {
        let before = self.text_before_cursor();
        if before.chars().next_back().is_none_or(char::is_whitespace) {
            return "";
        }
        let start = self.find_start_of_previous_word(1, kind).unwrap_or(0);
        let len = chars::char_len(before);
        chars::tail(before, len.saturating_add_signed(start))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use WordKind::{BigWord, Word};

    fn doc(text: &str, cursor: usize) -> Document {
        Document::with_cursor(text, cursor).unwrap()
    }

    #[test]
    fn next_word_beginning() {
        let d = doc("foo.bar baz", 0);
        assert_eq!(d.find_next_word_beginning(1, Word), Some(3));
        assert_eq!(d.find_next_word_beginning(2, Word), Some(4));
        assert_eq!(d.find_next_word_beginning(1, BigWord), Some(8));
        assert_eq!(d.find_next_word_beginning(5, BigWord), None);
        let d = doc("foo   bar", 4);
        assert_eq!(d.find_next_word_beginning(1, Word), Some(2));
    }

    #[test]
    fn next_word_ending() {
        let d = doc("foo bar", 0);
        assert_eq!(d.find_next_word_ending(false, 1, Word), Some(3));
        assert_eq!(d.find_next_word_ending(true, 1, Word), Some(3));
        let d = doc("foo bar", 2);
        // Cursor on the last char of "foo": move on to the end of "bar".
        assert_eq!(d.find_next_word_ending(false, 1, Word), Some(5));
        assert_eq!(d.find_next_word_ending(true, 1, Word), Some(1));
    }

    #[test]
    fn previous_word_beginning() {
        let d = doc("foo bar-baz", 11);
        assert_eq!(d.find_previous_word_beginning(1, Word), Some(-3));
        assert_eq!(d.find_previous_word_beginning(2, Word), Some(-4));
        assert_eq!(d.find_previous_word_beginning(1, BigWord), Some(-7));
        assert_eq!(doc("abc", 0).find_start_of_previous_word(1, Word), None);
    }

    #[test]
    fn previous_word_ending() {
        // Offsets point just past the word's last char.
        let d = doc("foo bar", 5);
        assert_eq!(d.find_previous_word_ending(1, Word), Some(-2));
        let d = doc("foo bar", 3);
        assert_eq!(d.find_previous_word_ending(1, Word), Some(0));
    }

    #[test]
    fn word_under_cursor_adjacency() {
        assert_eq!(doc("hello world", 2).get_word_under_cursor(Word), "hello");
        assert_eq!(doc("hello world", 5).get_word_under_cursor(Word), "hello");
        assert_eq!(doc("hello  world", 6).get_word_under_cursor(Word), "");
        assert_eq!(doc("foo.bar", 3).get_word_under_cursor(Word), ".");
        assert_eq!(doc("foo.bar", 3).get_word_under_cursor(BigWord), "foo.bar");
    }

    #[test]
    fn boundaries_with_whitespace() {
        let d = doc("ab  cd", 1);
        assert_eq!(d.find_boundaries_of_current_word(Word, false, false), (-1, 1));
        assert_eq!(d.find_boundaries_of_current_word(Word, false, true), (-1, 3));
        assert_eq!(doc("ab  cd", 3).find_boundaries_of_current_word(Word, false, false), (0, 0));
    }

    #[test]
    fn word_before_cursor() {
        assert_eq!(doc("git comm", 8).get_word_before_cursor(Word), "comm");
        assert_eq!(doc("git ", 4).get_word_before_cursor(Word), "");
        assert_eq!(doc("a/b.c", 5).get_word_before_cursor(BigWord), "a/b.c");
        assert_eq!(Document::empty().get_word_before_cursor(Word), "");
    }
}
