//! Selection ranges, cut and paste as pure document transforms.

use crate::Document;
use crate::chars;
use crate::line_ending::to_lf;
use crate::selection::{SelectionState, SelectionType};
use std::sync::Arc;

/// How pasted text is positioned relative to the cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PasteMode {
    /// Insert at the cursor, leaving the cursor after the text.
    #[default]
    Emacs,
    /// Insert before the cursor (or above the line), vi `P`.
    ViBefore,
    /// Insert after the cursor (or below the line), vi `p`.
    ViAfter,
}

/// Text moved through a clipboard, tagged with the selection shape it came from.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ClipboardData {
    pub text: String,
    pub selection_type: SelectionType,
}

impl ClipboardData {
    pub fn new(text: impl Into<String>, selection_type: SelectionType) -> Self {
        Self {
            text: to_lf(&text.into()).into_owned(),
            selection_type,
        }
    }
}

impl Document {
    /// `(start, end)` of the selection, sorted and clamped into the text.
    /// Without a selection both ends sit at the cursor.
    pub fn selection_range(&self) -> (usize, usize) {
        let cursor = self.cursor_position();
        match self.selection() {
            Some(sel) => {
                let anchor = self.clamp_anchor(sel);
                (cursor.min(anchor), cursor.max(anchor))
            }
            None => (cursor, cursor),
        }
    }

    fn clamp_anchor(&self, sel: &SelectionState) -> usize {
        usize::try_from(sel.original_cursor_position())
            .unwrap_or(0)
            .min(self.text_len())
    }

    /// Half-open char ranges covered by the selection: one per row for
    /// block selections, whole lines (with their newline) for line selections.
    pub fn selection_ranges(&self) -> Vec<(usize, usize)> {
        let Some(sel) = self.selection() else {
            return Vec::new();
        };
        let (from, to) = self.selection_range();
        match sel.selection_type() {
            SelectionType::Characters => vec![(from, to)],
            SelectionType::Lines => {
                let idx = self.index();
                let first = idx.row_of(from);
                let last = idx.row_of(to);
                let start = idx.line_starts()[first];
                let end = if last + 1 < idx.line_count() {
                    idx.line_starts()[last + 1]
                } else {
                    idx.char_len()
                };
                vec![(start, end)]
            }
            SelectionType::Block => {
                let (from_row, from_col) = self.translate_index_to_position(from);
                let (to_row, to_col) = self.translate_index_to_position(to);
                let (col1, col2) = (from_col.min(to_col), from_col.max(to_col));
                let idx = self.index();
                (from_row..=to_row)
                    .filter_map(|row| {
                        let line_len = idx.line_len(row);
                        (col1 <= line_len).then(|| {
                            let start = idx.line_starts()[row];
                            (start + col1, start + col2.min(line_len))
                        })
                    })
                    .collect()
            }
        }
    }

    /// Column range `(from, to)` of the selection on `row`, if it touches that row.
    pub fn selection_range_at_line(&self, row: usize) -> Option<(usize, usize)> {
        let sel = self.selection()?;
        let idx = self.index();
        if row >= idx.line_count() {
            return None;
        }
        let row_start = idx.line_starts()[row];
        let line_len = idx.line_len(row);
        let row_end = row_start + line_len;
        let (from, to) = self.selection_range();
        let (start, end) = (row_start.max(from), row_end.min(to));
        if start > end {
            return None;
        }
        match sel.selection_type() {
            SelectionType::Characters => Some((start - row_start, end - row_start)),
            SelectionType::Lines => Some((0, line_len)),
            SelectionType::Block => {
                let (_, c1) = self.translate_index_to_position(from);
                let (_, c2) = self.translate_index_to_position(to);
                let (col1, col2) = (c1.min(c2), c1.max(c2));
                (col1 <= line_len).then(|| (col1, col2.min(line_len)))
            }
        }
    }

    /// Remove the selected text. Returns the remaining document (no
    /// selection, cursor at the start of the cut) and the removed text.
    /// Without a selection the document is returned unchanged with empty data.
    pub fn cut_selection(&self) -> (Document, ClipboardData) {
        let Some(sel) = self.selection() else {
            return (self.clone(), ClipboardData::default());
        };
        let text = self.text();
        let ranges = self.selection_ranges();
        let new_cursor = ranges.first().map_or(self.cursor_position(), |r| r.0);
        let mut remaining = String::with_capacity(text.len());
        let mut cut_parts = Vec::with_capacity(ranges.len());
        let mut last_to = 0usize;
        for (from, to) in ranges {
            remaining.push_str(chars::slice(text, last_to, from));
            cut_parts.push(chars::slice(text, from, to));
            last_to = to;
        }
        remaining.push_str(chars::tail(text, last_to));
        let mut cut = cut_parts.join("\n");
        if sel.selection_type() == SelectionType::Lines && cut.ends_with('\n') {
            cut.pop();
        }
        (
            Document::from_edit(remaining, new_cursor, None),
            ClipboardData {
                text: cut,
                selection_type: sel.selection_type(),
            },
        )
    }

    /// Paste `data` `count` times according to `mode` and the data's shape.
    pub fn paste_clipboard_data(&self, data: &ClipboardData, mode: PasteMode, count: usize) -> Document {
        let payload = to_lf(&data.text);
        let before = mode == PasteMode::ViBefore;
        let text = self.text();
        let cursor = self.cursor_position();
        match data.selection_type {
            SelectionType::Characters => {
                let at = if mode == PasteMode::ViAfter {
                    (cursor + 1).min(self.text_len())
                } else {
                    cursor
                };
                let repeated = payload.repeat(count);
                let split = self.byte_at(at);
                let new_text = [&text[..split], repeated.as_str(), &text[split..]].concat();
                let mut new_cursor = cursor + chars::char_len(&payload) * count;
                if before {
                    new_cursor = new_cursor.saturating_sub(1);
                }
                Document::from_edit(new_text, new_cursor, None)
            }
            SelectionType::Lines => {
                let idx = self.index();
                let row = self.cursor_position_row();
                let insert_row = if before { row } else { row + 1 };
                let mut lines: Vec<&str> = idx.lines().iter().map(String::as_str).collect();
                lines.splice(insert_row..insert_row, std::iter::repeat_n(payload.as_ref(), count));
                let new_cursor = if before {
                    idx.line_starts()[row]
                } else {
                    idx.line_starts()[row] + idx.line_len(row) + 1
                };
                Document::from_edit(lines.join("\n"), new_cursor, None)
            }
            SelectionType::Block => {
                let mut lines: Vec<String> = self.lines().to_vec();
                let start_row = self.cursor_position_row();
                let start_col = self.cursor_position_col() + if before { 0 } else { 1 };
                for (i, piece) in payload.split('\n').enumerate() {
                    let row = start_row + i;
                    if row >= lines.len() {
                        lines.push(String::new());
                    }
                    let line = &mut lines[row];
                    let len = chars::char_len(line);
                    if len < start_col {
                        line.extend(std::iter::repeat_n(' ', start_col - len));
                    }
                    let at = chars::byte_offset(line, start_col);
                    line.insert_str(at, &piece.repeat(count));
                }
                let new_cursor = cursor + if before { 0 } else { 1 };
                Document::from_edit(lines.join("\n"), new_cursor, None)
            }
        }
    }

    /// Prepend `text`, shifting the cursor and selection anchor past it.
    pub fn insert_before(&self, text: &str) -> Document {
        let text = to_lf(text);
        let shift = chars::char_len(&text);
        let selection = self
            .selection()
            .map(|sel| Arc::new(sel.shifted(shift as isize)));
        let mut new_text = String::with_capacity(text.len() + self.text().len());
        new_text.push_str(&text);
        new_text.push_str(self.text());
        Document::from_edit(new_text, self.cursor_position() + shift, selection)
    }

    /// Append `text`; cursor and selection are unchanged.
    pub fn insert_after(&self, text: &str) -> Document {
        let text = to_lf(text);
        let new_text = [self.text(), text.as_ref()].concat();
        Document::from_edit(new_text, self.cursor_position(), self.selection().cloned())
    }
}
