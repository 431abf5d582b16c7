//! Immutable text + cursor + selection snapshot.

use crate::chars;
use crate::line_ending::{map_position_to_normalized, to_lf};
use crate::line_index::{LineIndex, line_index};
use crate::selection::SelectionState;
use crate::width;
use crate::TextError;
use once_cell::sync::OnceCell;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// An immutable view of text with a cursor and an optional selection.
///
/// Positions are char offsets. `\r\n` and bare `\r` are normalized to `\n` on
/// construction. Line data is looked up lazily in a process-wide flyweight
/// cache, so documents over the same text share it.
#[derive(Clone)]
pub struct Document {
    text: Arc<str>,
    cursor_position: usize,
    selection: Option<Arc<SelectionState>>,
    index: OnceCell<Arc<LineIndex>>,
}

impl Document {
    /// Document with the cursor at the end of `text`.
    pub fn new(text: impl Into<String>) -> Self {
        let mut text: String = text.into();
        if text.contains('\r') {
            text = to_lf(&text).into_owned();
        }
        let cursor = chars::char_len(&text);
        Self::from_parts(Arc::from(text), cursor, None)
    }

    pub fn empty() -> Self {
        Self::from_parts(Arc::from(""), 0, None)
    }

    /// Fails when `cursor_position` exceeds the char length of `text`.
    /// The position is given in units of the text as passed in, before
    /// line-ending normalization.
    pub fn with_cursor(text: impl Into<String>, cursor_position: usize) -> Result<Self, TextError> {
        Self::with_selection(text, cursor_position, None)
    }

    pub fn with_selection(
        text: impl Into<String>,
        cursor_position: usize,
        selection: Option<Arc<SelectionState>>,
    ) -> Result<Self, TextError> {
        let raw = text.into();
        let invalid = |raw: &str| TextError::InvalidCursorPosition {
            position: cursor_position,
            len: chars::char_len(raw),
        };
        if raw.contains('\r') {
            let cursor = map_position_to_normalized(&raw, cursor_position).ok_or_else(|| invalid(&raw))?;
            let text = to_lf(&raw).into_owned();
            return Ok(Self::from_parts(Arc::from(text), cursor, selection));
        }
        if cursor_position > chars::char_len(&raw) {
            return Err(invalid(&raw));
        }
        Ok(Self::from_parts(Arc::from(raw), cursor_position, selection))
    }

    /// Like [`Document::with_cursor`] but an out-of-range cursor is clamped
    /// to the end of the text instead of rejected.
    pub fn with_cursor_clamped(text: impl Into<String>, cursor_position: usize) -> Self {
        Self::from_edit(text.into(), cursor_position, None)
    }

    /// Build from the output of an edit; the cursor is clamped rather than rejected.
    pub(crate) fn from_edit(text: String, cursor_position: usize, selection: Option<Arc<SelectionState>>) -> Self {
        if text.contains('\r') {
            let len = chars::char_len(&text);
            let cursor = map_position_to_normalized(&text, cursor_position.min(len)).unwrap_or(0);
            let text = to_lf(&text).into_owned();
            return Self::from_parts(Arc::from(text), cursor, selection);
        }
        let cursor = cursor_position.min(chars::char_len(&text));
        Self::from_parts(Arc::from(text), cursor, selection)
    }

    fn from_parts(text: Arc<str>, cursor_position: usize, selection: Option<Arc<SelectionState>>) -> Self {
        Self {
            text,
            cursor_position,
            selection,
            index: OnceCell::new(),
        }
    }

    /// Same text and selection with the cursor moved (clamped to the text).
    pub fn with_cursor_at(&self, position: usize) -> Self {
        let mut doc = self.clone();
        doc.cursor_position = position.min(self.text_len());
        doc
    }

    /// Same text and cursor with `selection` replacing the current one.
    pub fn with_selection_state(&self, selection: Option<Arc<SelectionState>>) -> Self {
        let mut doc = self.clone();
        doc.selection = selection;
        doc
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Shared handle to the text.
    pub fn text_arc(&self) -> &Arc<str> {
        &self.text
    }

    pub fn cursor_position(&self) -> usize {
        self.cursor_position
    }

    pub fn selection(&self) -> Option<&Arc<SelectionState>> {
        self.selection.as_ref()
    }

    pub(crate) fn index(&self) -> &Arc<LineIndex> {
        self.index.get_or_init(|| line_index(&self.text))
    }

    /// Text length in chars.
    pub fn text_len(&self) -> usize {
        self.index().char_len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub(crate) fn byte_at(&self, position: usize) -> usize {
        if self.index().is_ascii() {
            position.min(self.text.len())
        } else {
            chars::byte_offset(&self.text, position)
        }
    }

    pub fn text_before_cursor(&self) -> &str {
        &self.text[..self.byte_at(self.cursor_position)]
    }

    pub fn text_after_cursor(&self) -> &str {
        &self.text[self.byte_at(self.cursor_position)..]
    }

    pub fn current_line_before_cursor(&self) -> &str {
        let before = self.text_before_cursor();
        before.rsplit_once('\n').map_or(before, |(_, line)| line)
    }

    pub fn current_line_after_cursor(&self) -> &str {
        let after = self.text_after_cursor();
        after.split_once('\n').map_or(after, |(line, _)| line)
    }

    /// Text split on `\n`; a trailing terminator yields a final empty line.
    pub fn lines(&self) -> &[String] {
        self.index().lines()
    }

    pub fn line_count(&self) -> usize {
        self.index().line_count()
    }

    pub fn current_line(&self) -> &str {
        &self.lines()[self.cursor_position_row()]
    }

    pub fn leading_whitespace_in_current_line(&self) -> &str {
        let line = self.current_line();
        &line[..line.len() - line.trim_start().len()]
    }

    /// Char under the cursor, `'\0'` at the end of the text.
    pub fn current_char(&self) -> char {
        self.text_after_cursor().chars().next().unwrap_or('\0')
    }

    /// Char left of the cursor, `'\0'` at the start of the text.
    pub fn char_before_cursor(&self) -> char {
        self.text_before_cursor().chars().next_back().unwrap_or('\0')
    }

    pub fn get_char_relative_to_cursor(&self, offset: isize) -> char {
        let Some(pos) = self.cursor_position.checked_add_signed(offset) else {
            return '\0';
        };
        chars::tail(&self.text, pos).chars().next().unwrap_or('\0')
    }

    pub fn cursor_position_row(&self) -> usize {
        self.index().row_of(self.cursor_position)
    }

    pub fn cursor_position_col(&self) -> usize {
        let idx = self.index();
        self.cursor_position - idx.line_starts()[idx.row_of(self.cursor_position)]
    }

    /// Terminal cell column of the cursor within its line.
    pub fn cursor_display_column(&self) -> usize {
        width::str_width(self.current_line_before_cursor())
    }

    pub fn on_first_line(&self) -> bool {
        self.cursor_position_row() == 0
    }

    pub fn on_last_line(&self) -> bool {
        self.cursor_position_row() + 1 == self.line_count()
    }

    pub fn is_cursor_at_the_end(&self) -> bool {
        self.cursor_position == self.text_len()
    }

    pub fn is_cursor_at_the_end_of_line(&self) -> bool {
        let after = self.text_after_cursor();
        after.is_empty() || after.starts_with('\n')
    }

    /// `(row, col)` of a char offset. Offsets past the end land on the last row.
    pub fn translate_index_to_position(&self, index: usize) -> (usize, usize) {
        let idx = self.index();
        let row = idx.row_of(index);
        (row, index - idx.line_starts()[row])
    }

    /// Char offset of `(row, col)`. Negative rows clamp to the first line,
    /// rows past the end to the last; the column clamps into the line.
    pub fn translate_row_col_to_index(&self, row: isize, col: isize) -> usize {
        let idx = self.index();
        let row = usize::try_from(row).unwrap_or(0).min(idx.line_count() - 1);
        let col = usize::try_from(col).unwrap_or(0).min(idx.line_len(row));
        (idx.line_starts()[row] + col).min(idx.char_len())
    }

    /// Trailing lines that are empty or whitespace only.
    pub fn empty_line_count_at_the_end(&self) -> usize {
        self.lines()
            .iter()
            .rev()
            .take_while(|line| line.trim().is_empty())
            .count()
    }

    pub fn get_cursor_left_position(&self, count: usize) -> isize {
        -(count.min(self.cursor_position_col()) as isize)
    }

    pub fn get_cursor_right_position(&self, count: usize) -> isize {
        count.min(chars::char_len(self.current_line_after_cursor())) as isize
    }

    /// Offset to the same (or preferred) column `count` rows up.
    pub fn get_cursor_up_position(&self, count: usize, preferred_column: Option<usize>) -> isize {
        let column = preferred_column.unwrap_or_else(|| self.cursor_position_col());
        let row = self.cursor_position_row().saturating_sub(count);
        self.offset_to(self.translate_row_col_to_index(row as isize, clamp_isize(column)))
    }

    pub fn get_cursor_down_position(&self, count: usize, preferred_column: Option<usize>) -> isize {
        let column = preferred_column.unwrap_or_else(|| self.cursor_position_col());
        let row = self.cursor_position_row().saturating_add(count);
        self.offset_to(self.translate_row_col_to_index(clamp_isize(row), clamp_isize(column)))
    }

    pub fn get_start_of_line_position(&self, after_whitespace: bool) -> isize {
        if after_whitespace {
            let ws = chars::char_len(self.leading_whitespace_in_current_line());
            ws as isize - self.cursor_position_col() as isize
        } else {
            -(chars::char_len(self.current_line_before_cursor()) as isize)
        }
    }

    pub fn get_end_of_line_position(&self) -> isize {
        chars::char_len(self.current_line_after_cursor()) as isize
    }

    pub fn get_start_of_document_position(&self) -> isize {
        -(self.cursor_position as isize)
    }

    pub fn get_end_of_document_position(&self) -> isize {
        (self.text_len() - self.cursor_position) as isize
    }

    /// Offset to the last non-blank char of the line (`-1 - col` on a blank line).
    pub fn last_non_blank_of_current_line_position(&self) -> isize {
        let len = chars::char_len(self.current_line().trim_end()) as isize;
        len - self.cursor_position_col() as isize - 1
    }

    pub fn get_column_cursor_position(&self, column: usize) -> isize {
        let line_len = chars::char_len(self.current_line());
        column.min(line_len) as isize - self.cursor_position_col() as isize
    }

    /// Row offset of the `count`-th following line matching `pred`, or of the
    /// last match found when fewer exist.
    pub fn find_next_matching_line<F>(&self, pred: F, count: usize) -> Option<isize>
    where
        F: Fn(&str) -> bool,
    {
        let mut remaining = count;
        let mut result = None;
        for (i, line) in self.lines().iter().skip(self.cursor_position_row() + 1).enumerate() {
            if remaining == 0 {
                break;
            }
            if pred(line) {
                result = Some(1 + i as isize);
                remaining -= 1;
            }
        }
        result
    }

    pub fn find_previous_matching_line<F>(&self, pred: F, count: usize) -> Option<isize>
    where
        F: Fn(&str) -> bool,
    {
        let mut remaining = count;
        let mut result = None;
        let row = self.cursor_position_row();
        for (i, line) in self.lines()[..row].iter().rev().enumerate() {
            if remaining == 0 {
                break;
            }
            if pred(line) {
                result = Some(-1 - i as isize);
                remaining -= 1;
            }
        }
        result
    }

    /// Offset to the blank line that starts the paragraph (or just after it
    /// unless `before`); start of document when there is none.
    pub fn start_of_paragraph(&self, count: usize, before: bool) -> isize {
        match self.find_previous_matching_line(is_blank, count) {
            Some(rows) => {
                let add = if before { 0 } else { 1 };
                (self.get_cursor_up_position(rows.unsigned_abs(), None) + add).min(0)
            }
            None => self.get_start_of_document_position(),
        }
    }

    pub fn end_of_paragraph(&self, count: usize, after: bool) -> isize {
        match self.find_next_matching_line(is_blank, count) {
            Some(rows) => {
                let sub = if after { 0 } else { 1 };
                (self.get_cursor_down_position(rows.unsigned_abs(), None) - sub).max(0)
            }
            None => chars::char_len(self.text_after_cursor()) as isize,
        }
    }

    fn offset_to(&self, index: usize) -> isize {
        index as isize - self.cursor_position as isize
    }
}

fn is_blank(line: &str) -> bool {
    line.trim().is_empty()
}

fn clamp_isize(v: usize) -> isize {
    isize::try_from(v).unwrap_or(isize::MAX)
}

impl Default for Document {
    fn default() -> Self {
        Self::empty()
    }
}

/// Text and cursor compare by value; selections compare by identity.
impl PartialEq for Document {
    fn eq(&self, other: &Self) -> bool {
        self.cursor_position == other.cursor_position
            && self.text == other.text
            && match (&self.selection, &other.selection) {
                (None, None) => true,
                (Some(a), Some(b)) => Arc::ptr_eq(a, b),
                _ => false,
            }
    }
}

impl Eq for Document {}

impl Hash for Document {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.text.hash(state);
        self.cursor_position.hash(state);
    }
}

impl fmt::Debug for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Document")
            .field("text", &self.text)
            .field("cursor_position", &self.cursor_position)
            .field("selection", &self.selection)
            .finish()
    }
}
