use crate::Document;

/// Bracket pairs understood by [`Document::find_matching_bracket_position`].
pub const BRACKET_PAIRS: [(char, char); 4] = [('(', ')'), ('[', ']'), ('{', '}'), ('<', '>')];

impl Document {
    /// Offset to the bracket matching the one under the cursor, or 0 when the
    /// cursor is not on a bracket or it has no match. Only brackets of the
    /// same kind are counted.
    pub fn find_matching_bracket_position(&self, start_pos: Option<usize>, end_pos: Option<usize>) -> isize {
        let c = self.current_char();
        for (open, close) in BRACKET_PAIRS {
            if c == open {
                return self.find_enclosing_bracket_right(open, close, end_pos).unwrap_or(0);
            }
            if c == close {
                return self.find_enclosing_bracket_left(open, close, start_pos).unwrap_or(0);
            }
        }
        0
    }

    /// Offset to the `close` bracket enclosing the cursor, scanning no further
    /// than `end_pos`. Returns `Some(0)` when the cursor is on `close`.
    pub fn find_enclosing_bracket_right(&self, open: char, close: char, end_pos: Option<usize>) -> Option<isize> {
        if self.current_char() == close {
            return Some(0);
        }
        let len = self.text_len();
        let end = end_pos.map_or(len, |e| e.min(len));
        let cursor = self.cursor_position();
        let mut depth = 1usize;
        for (i, c) in self.text_after_cursor().chars().enumerate().skip(1) {
            if cursor + i >= end {
                break;
            }
            if c == open {
                depth += 1;
            } else if c == close {
                depth -= 1;
                if depth == 0 {
                    return Some(i as isize);
                }
            }
        }
        None
    }

    /// Offset to the `open` bracket enclosing the cursor, scanning no further
    /// back than `start_pos`. Returns `Some(0)` when the cursor is on `open`.
    pub fn find_enclosing_bracket_left(&self, open: char, close: char, start_pos: Option<usize>) -> Option<isize> {
        if self.current_char() == open {
            return Some(0);
        }
        let start = start_pos.unwrap_or(0);
        let cursor = self.cursor_position();
        let mut depth = 1usize;
        for (i, c) in self.text_before_cursor().chars().rev().enumerate() {
            let pos = cursor - 1 - i;
            if pos < start {
                break;
            }
            if c == close {
                depth += 1;
            } else if c == open {
                depth -= 1;
                if depth == 0 {
                    return Some(-(i as isize) - 1);
                }
            }
        }
        None
    }
}
