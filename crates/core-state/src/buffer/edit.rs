use super::{Buffer, NoticeKind, Tx};
use crate::BufferError;
use core_text::{ClipboardData, PasteMode, SelectionState, SelectionType, chars};
use std::sync::Arc;

/// Spaces added or removed per indentation level.
pub const INDENT_WIDTH: usize = 4;

/// Apply `f` to the lines at `indices`; indices past the last line are skipped.
fn transformed_lines<I, F>(text: &str, indices: I, mut f: F) -> String
where
    I: IntoIterator<Item = usize>,
    F: FnMut(&str) -> String,
{
    let mut lines: Vec<String> = text.split('\n').map(str::to_string).collect();
    for i in indices {
        if let Some(line) = lines.get_mut(i) {
            *line = f(line);
        }
    }
    lines.join("\n")
}

impl Tx<'_> {
    pub(crate) fn insert_text(
        &mut self,
        data: &str,
        overwrite: bool,
        move_cursor: bool,
        fire_event: bool,
    ) -> Result<(), BufferError> {
        let doc = self.doc();
        let cursor = doc.cursor_position();
        let before = doc.text_before_cursor();
        let mut after = doc.text_after_cursor();
        let data_len = chars::char_len(data);
        if overwrite {
            // Never overwrite a line terminator.
            let overwritten = chars::head(after, data_len);
            let overwritten = overwritten.split('\n').next().unwrap_or_default();
            after = &after[overwritten.len()..];
        }
        let text = format!("{before}{data}{after}");
        let cursor = if move_cursor { cursor + data_len } else { cursor };
        self.replace(text, cursor)?;
        if fire_event {
            self.notify(NoticeKind::TextInsert);
        }
        Ok(())
    }

    pub(crate) fn delete(&mut self, count: usize) -> Result<String, BufferError> {
        let doc = self.doc();
        if count == 0 || doc.is_cursor_at_the_end() {
            return Ok(String::new());
        }
        let after = doc.text_after_cursor();
        let deleted = chars::head(after, count);
        let text = format!("{}{}", doc.text_before_cursor(), &after[deleted.len()..]);
        let deleted = deleted.to_string();
        self.set_text(text)?;
        Ok(deleted)
    }

    pub(crate) fn delete_before_cursor(&mut self, count: usize) -> Result<String, BufferError> {
        let doc = self.doc();
        let cursor = doc.cursor_position();
        if count == 0 || cursor == 0 {
            return Ok(String::new());
        }
        let start = cursor.saturating_sub(count);
        let before = doc.text_before_cursor();
        let deleted = chars::tail(before, start).to_string();
        let text = format!("{}{}", chars::head(before, start), doc.text_after_cursor());
        self.replace(text, start)?;
        Ok(deleted)
    }

    fn margin(&self, copy_margin: bool) -> String {
        if copy_margin {
            self.doc().leading_whitespace_in_current_line().to_string()
        } else {
            String::new()
        }
    }

    pub(crate) fn newline(&mut self, copy_margin: bool) -> Result<(), BufferError> {
        let data = format!("\n{}", self.margin(copy_margin));
        self.insert_text(&data, false, true, true)
    }

    pub(crate) fn insert_line_above(&mut self, copy_margin: bool) -> Result<(), BufferError> {
        self.ensure_writable()?;
        let data = format!("{}\n", self.margin(copy_margin));
        let to_start = self.doc().get_start_of_line_position(false);
        self.move_cursor(to_start);
        self.insert_text(&data, false, true, true)?;
        self.move_cursor(-1);
        Ok(())
    }

    pub(crate) fn insert_line_below(&mut self, copy_margin: bool) -> Result<(), BufferError> {
        self.ensure_writable()?;
        let data = format!("\n{}", self.margin(copy_margin));
        let to_end = self.doc().get_end_of_line_position();
        self.move_cursor(to_end);
        self.insert_text(&data, false, true, true)
    }

    pub(crate) fn join_next_line(&mut self, separator: &str) -> Result<(), BufferError> {
        if self.doc().on_last_line() {
            return Ok(());
        }
        self.ensure_writable()?;
        let to_end = self.doc().get_end_of_line_position();
        self.move_cursor(to_end);
        self.delete(1)?;
        let doc = self.doc();
        let text = format!(
            "{}{}{}",
            doc.text_before_cursor(),
            separator,
            doc.text_after_cursor().trim_start_matches(' ')
        );
        self.set_text(text)
    }

    pub(crate) fn join_selected_lines(&mut self, separator: &str) -> Result<(), BufferError> {
        let doc = self.doc();
        let Some(selection) = doc.selection() else {
            return Ok(());
        };
        let len = doc.text_len();
        let anchor = selection.original_cursor_position().clamp(0, len as isize) as usize;
        let (from, to) = if anchor < doc.cursor_position() {
            (anchor, doc.cursor_position())
        } else {
            (doc.cursor_position(), anchor)
        };
        let text = doc.text();
        let before = chars::head(text, from);
        let after = chars::tail(text, to);
        let lines: Vec<String> = chars::slice(text, from, to)
            .lines()
            .map(|l| format!("{}{separator}", l.trim_start_matches(' ')))
            .collect();
        let kept = lines.len().saturating_sub(1);
        let cursor = chars::char_len(before) + lines[..kept].iter().map(|l| chars::char_len(l)).sum::<usize>();
        let joined = format!("{before}{}{after}", lines.concat());
        self.replace(joined, cursor.saturating_sub(1))
    }

    pub(crate) fn swap_characters_before_cursor(&mut self) -> Result<(), BufferError> {
        let doc = self.doc();
        let pos = doc.cursor_position();
        if pos < 2 {
            return Ok(());
        }
        let text = doc.text();
        let a = chars::slice(text, pos - 2, pos - 1);
        let b = chars::slice(text, pos - 1, pos);
        let swapped = format!("{}{b}{a}{}", chars::head(text, pos - 2), chars::tail(text, pos));
        self.set_text(swapped)
    }

    pub(crate) fn transform_lines<I, F>(&mut self, indices: I, f: F) -> Result<(), BufferError>
    where
        I: IntoIterator<Item = usize>,
        F: FnMut(&str) -> String,
    {
        let text = transformed_lines(self.doc().text(), indices, f);
        self.set_text(text)
    }

    pub(crate) fn transform_current_line<F>(&mut self, f: F) -> Result<(), BufferError>
    where
        F: FnOnce(&str) -> String,
    {
        let doc = self.doc();
        let cursor = doc.cursor_position();
        let a = cursor.saturating_add_signed(doc.get_start_of_line_position(false));
        let b = cursor.saturating_add_signed(doc.get_end_of_line_position());
        let text = doc.text();
        let out = format!("{}{}{}", chars::head(text, a), f(chars::slice(text, a, b)), chars::tail(text, b));
        self.set_text(out)
    }

    pub(crate) fn transform_region<F>(&mut self, from: usize, to: usize, f: F) -> Result<(), BufferError>
    where
        F: FnOnce(&str) -> String,
    {
        if from >= to {
            return Err(BufferError::InvalidRegion { from, to });
        }
        let text = self.doc().text();
        let out = format!("{}{}{}", chars::head(text, from), f(chars::slice(text, from, to)), chars::tail(text, to));
        self.set_text(out)
    }

    /// Re-place the cursor at `(row, col)` of `text`.
    fn replace_at_row_col(&mut self, text: String, row: usize, col: usize) -> Result<(), BufferError> {
        let probe = core_text::Document::new(text.clone());
        let index = probe.translate_row_col_to_index(row as isize, col as isize);
        self.replace(text, index)
    }

    pub(crate) fn indent(&mut self, from_row: usize, to_row: usize, count: usize) -> Result<(), BufferError> {
        let doc = self.doc();
        let (row, col) = (doc.cursor_position_row(), doc.cursor_position_col());
        let pad = " ".repeat(INDENT_WIDTH * count);
        let text = transformed_lines(doc.text(), from_row..to_row, |l| format!("{pad}{l}"));
        let shift = if (from_row..to_row).contains(&row) { pad.len() } else { 0 };
        self.replace_at_row_col(text, row, col + shift)
    }

    pub(crate) fn unindent(&mut self, from_row: usize, to_row: usize, count: usize) -> Result<(), BufferError> {
        let doc = self.doc();
        let (row, col) = (doc.cursor_position_row(), doc.cursor_position_col());
        let remove = " ".repeat(INDENT_WIDTH * count);
        let text = transformed_lines(doc.text(), from_row..to_row, |l| match l.strip_prefix(remove.as_str()) {
            Some(rest) => rest.to_string(),
            None => l.trim_start().to_string(),
        });
        let old_len = doc.lines().get(row).map_or(0, |l| chars::char_len(l));
        let new_len = text.split('\n').nth(row).map_or(0, chars::char_len);
        let col = col.saturating_sub(old_len.saturating_sub(new_len));
        self.replace_at_row_col(text, row, col)
    }

    pub(crate) fn start_selection(&mut self, selection_type: SelectionType) {
        let anchor = self.doc().cursor_position() as isize;
        let selection = Arc::new(SelectionState::new(anchor, selection_type));
        self.st.document = self.st.document.with_selection_state(Some(selection));
    }

    pub(crate) fn exit_selection(&mut self) {
        if self.doc().selection().is_some() {
            self.st.document = self.st.document.with_selection_state(None);
        }
    }

    pub(crate) fn copy_selection(&mut self) -> ClipboardData {
        let (_, data) = self.doc().cut_selection();
        self.exit_selection();
        data
    }

    pub(crate) fn cut_selection(&mut self) -> Result<ClipboardData, BufferError> {
        let (remaining, data) = self.doc().cut_selection();
        self.set_document(remaining, false)?;
        self.exit_selection();
        Ok(data)
    }

    pub(crate) fn paste_clipboard_data(
        &mut self,
        data: &ClipboardData,
        mode: PasteMode,
        count: usize,
    ) -> Result<(), BufferError> {
        let original = self.doc().clone();
        let pasted = original.paste_clipboard_data(data, mode, count);
        self.set_document(pasted, false)?;
        self.st.document_before_paste = Some(original);
        Ok(())
    }
}

impl Buffer {
    /// Insert `data` at the cursor. In overwrite mode existing chars are
    /// replaced one for one, stopping at the end of the line.
    pub fn insert_text(&self, data: &str, overwrite: bool, move_cursor: bool, fire_event: bool) -> Result<(), BufferError> {
        self.transact(|tx| tx.insert_text(data, overwrite, move_cursor, fire_event))
    }

    /// Delete up to `count` chars after the cursor and return them.
    pub fn delete(&self, count: usize) -> Result<String, BufferError> {
        self.transact(|tx| tx.delete(count))
    }

    /// Delete up to `count` chars before the cursor and return them.
    pub fn delete_before_cursor(&self, count: usize) -> Result<String, BufferError> {
        self.transact(|tx| tx.delete_before_cursor(count))
    }

    pub fn newline(&self, copy_margin: bool) -> Result<(), BufferError> {
        self.transact(|tx| tx.newline(copy_margin))
    }

    pub fn insert_line_above(&self, copy_margin: bool) -> Result<(), BufferError> {
        self.transact(|tx| tx.insert_line_above(copy_margin))
    }

    pub fn insert_line_below(&self, copy_margin: bool) -> Result<(), BufferError> {
        self.transact(|tx| tx.insert_line_below(copy_margin))
    }

    /// Merge the next line into this one, dropping its leading spaces.
    pub fn join_next_line(&self, separator: &str) -> Result<(), BufferError> {
        self.transact(|tx| tx.join_next_line(separator))
    }

    /// Join every line touched by the selection. No-op without a selection.
    pub fn join_selected_lines(&self, separator: &str) -> Result<(), BufferError> {
        self.transact(|tx| tx.join_selected_lines(separator))
    }

    pub fn swap_characters_before_cursor(&self) -> Result<(), BufferError> {
        self.transact(|tx| tx.swap_characters_before_cursor())
    }

    pub fn transform_lines<I, F>(&self, indices: I, f: F) -> Result<(), BufferError>
    where
        I: IntoIterator<Item = usize>,
        F: FnMut(&str) -> String,
    {
        self.transact(|tx| tx.transform_lines(indices, f))
    }

    pub fn transform_current_line<F>(&self, f: F) -> Result<(), BufferError>
    where
        F: FnOnce(&str) -> String,
    {
        self.transact(|tx| tx.transform_current_line(f))
    }

    /// Transform chars `from..to`; fails unless `from < to`.
    pub fn transform_region<F>(&self, from: usize, to: usize, f: F) -> Result<(), BufferError>
    where
        F: FnOnce(&str) -> String,
    {
        self.transact(|tx| tx.transform_region(from, to, f))
    }

    /// Indent rows `from_row..to_row` by `count` levels.
    pub fn indent(&self, from_row: usize, to_row: usize, count: usize) -> Result<(), BufferError> {
        self.transact(|tx| tx.indent(from_row, to_row, count))
    }

    /// Remove `count` levels of indentation from rows `from_row..to_row`.
    /// Lines with less indentation lose all of it.
    pub fn unindent(&self, from_row: usize, to_row: usize, count: usize) -> Result<(), BufferError> {
        self.transact(|tx| tx.unindent(from_row, to_row, count))
    }

    pub fn start_selection(&self, selection_type: SelectionType) {
        self.transact(|tx| tx.start_selection(selection_type));
    }

    pub fn exit_selection(&self) {
        self.transact(|tx| tx.exit_selection());
    }

    /// Selected text; the selection is cleared and the text kept.
    pub fn copy_selection(&self) -> ClipboardData {
        self.transact(|tx| tx.copy_selection())
    }

    pub fn cut_selection(&self) -> Result<ClipboardData, BufferError> {
        self.transact(|tx| tx.cut_selection())
    }

    pub fn paste_clipboard_data(&self, data: &ClipboardData, mode: PasteMode, count: usize) -> Result<(), BufferError> {
        self.transact(|tx| tx.paste_clipboard_data(data, mode, count))
    }
}
