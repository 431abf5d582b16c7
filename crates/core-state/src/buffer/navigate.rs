use super::{Buffer, Tx};
use crate::BufferError;
use crate::history::{YankNthArgState, nth_word, split_arguments};
use core_text::{Document, FindOptions, SearchDirection, SearchState, chars};
use tracing::debug;

impl Tx<'_> {
    pub(crate) fn cursor_left(&mut self, count: usize) {
        let delta = self.doc().get_cursor_left_position(count);
        self.move_cursor(delta);
    }

    pub(crate) fn cursor_right(&mut self, count: usize) {
        let delta = self.doc().get_cursor_right_position(count);
        self.move_cursor(delta);
    }

    pub(crate) fn cursor_up(&mut self, count: usize) {
        let column = self.st.preferred_column.unwrap_or_else(|| self.doc().cursor_position_col());
        let delta = self.doc().get_cursor_up_position(count, Some(column));
        self.move_cursor(delta);
        // Sticky column survives the cursor-change reset.
        self.st.preferred_column = Some(column);
    }

    pub(crate) fn cursor_down(&mut self, count: usize) {
        let column = self.st.preferred_column.unwrap_or_else(|| self.doc().cursor_position_col());
        let delta = self.doc().get_cursor_down_position(count, Some(column));
        self.move_cursor(delta);
        self.st.preferred_column = Some(column);
    }

    pub(crate) fn auto_up(&mut self, count: usize, go_to_start_of_line: bool) -> Result<(), BufferError> {
        if self.st.complete_state.is_some() {
            return self.complete_previous(count, false);
        }
        if self.doc().cursor_position_row() > 0 {
            self.cursor_up(count);
        } else if self.doc().selection().is_none() {
            self.history_backward(count);
            if go_to_start_of_line {
                let delta = self.doc().get_start_of_line_position(false);
                self.move_cursor(delta);
            }
        }
        Ok(())
    }

    pub(crate) fn auto_down(&mut self, count: usize, go_to_start_of_line: bool) -> Result<(), BufferError> {
        if self.st.complete_state.is_some() {
            return self.complete_next(count, false);
        }
        let doc = self.doc();
        if doc.cursor_position_row() + 1 < doc.line_count() {
            self.cursor_down(count);
        } else if doc.selection().is_none() {
            self.history_forward(count);
            if go_to_start_of_line {
                let delta = self.doc().get_start_of_line_position(false);
                self.move_cursor(delta);
            }
        }
        Ok(())
    }

    fn set_history_search(&mut self) {
        if self.buf.options.enable_history_search.eval() {
            if self.st.history_search_text.is_none() {
                self.st.history_search_text = Some(self.doc().text_before_cursor().to_string());
            }
        } else {
            self.st.history_search_text = None;
        }
    }

    fn history_matches(&self, index: usize) -> bool {
        self.st
            .history_search_text
            .as_deref()
            .is_none_or(|prefix| self.st.working_lines[index].starts_with(prefix))
    }

    pub(crate) fn history_backward(&mut self, count: usize) {
        self.set_history_search();
        let mut remaining = count;
        let mut found = false;
        let mut index = self.st.working_index;
        while remaining > 0 && index > 0 {
            index -= 1;
            if self.history_matches(index) {
                self.set_working_index(index);
                remaining -= 1;
                found = true;
            }
        }
        if found {
            let end = self.doc().text_len();
            self.set_cursor(end);
        }
        debug!(target: "state.history", working_index = self.st.working_index, found, "history_backward");
    }

    pub(crate) fn history_forward(&mut self, count: usize) {
        self.set_history_search();
        let mut remaining = count;
        let mut found = false;
        let mut index = self.st.working_index;
        while remaining > 0 && index + 1 < self.st.working_lines.len() {
            index += 1;
            if self.history_matches(index) {
                self.set_working_index(index);
                remaining -= 1;
                found = true;
            }
        }
        if found {
            self.set_cursor(0);
            let end_of_line = self.doc().get_end_of_line_position();
            self.move_cursor(end_of_line);
        }
        debug!(target: "state.history", working_index = self.st.working_index, found, "history_forward");
    }

    pub(crate) fn go_to_history(&mut self, index: usize) {
        if index < self.st.working_lines.len() {
            self.set_working_index(index);
            let end = self.doc().text_len();
            self.set_cursor(end);
        }
    }

    pub(crate) fn yank_nth_arg(
        &mut self,
        n: Option<isize>,
        last: bool,
        history: &[String],
    ) -> Result<(), BufferError> {
        if history.is_empty() {
            return Ok(());
        }
        self.ensure_writable()?;
        let mut state = self
            .st
            .yank_nth_arg_state
            .clone()
            .unwrap_or_else(|| YankNthArgState::new(if last { -1 } else { 1 }));
        if let Some(n) = n {
            state.n = n;
        }
        let mut position = state.history_position - 1;
        if position.unsigned_abs() > history.len() {
            position = -1;
        }
        let line = &history[history.len() - position.unsigned_abs()];
        let words = split_arguments(line);
        let word = nth_word(&words, state.n).to_string();
        if !state.previous_inserted_word.is_empty() {
            self.delete_before_cursor(chars::char_len(&state.previous_inserted_word))?;
        }
        self.insert_text(&word, false, true, true)?;
        state.previous_inserted_word = word;
        state.history_position = position;
        self.st.yank_nth_arg_state = Some(state);
        Ok(())
    }

    /// One search step from `(index, document)`: first the document itself,
    /// then the other working lines, wrapping around.
    fn search_once(
        &self,
        query: &SearchState,
        include_current_position: bool,
        index: usize,
        document: &Document,
    ) -> Option<(usize, Document)> {
        let text = query.text();
        let ignore_case = query.ignore_case();
        let lines = &self.st.working_lines;
        let n = lines.len();
        match query.direction() {
            SearchDirection::Forward => {
                let opts = FindOptions {
                    include_current_position,
                    ignore_case,
                    ..FindOptions::default()
                };
                if let Some(offset) = document.find(text, opts) {
                    let at = document.cursor_position().saturating_add_signed(offset);
                    return Some((index, document.with_cursor_at(at)));
                }
                let opts = FindOptions {
                    include_current_position: true,
                    ..opts
                };
                (index + 1..=n).map(|i| i % n).find_map(|i| {
                    let candidate = Document::with_cursor_clamped(lines[i].to_string(), 0);
                    let offset = candidate.find(text, opts)?;
                    Some((i, candidate.with_cursor_at(offset.max(0) as usize)))
                })
            }
            SearchDirection::Backward => {
                let opts = FindOptions {
                    ignore_case,
                    ..FindOptions::default()
                };
                if let Some(offset) = document.find_backwards(text, opts) {
                    let at = document.cursor_position().saturating_add_signed(offset);
                    return Some((index, document.with_cursor_at(at)));
                }
                (-1..index as isize).rev().map(|i| i.rem_euclid(n as isize) as usize).find_map(|i| {
                    let candidate = Document::new(lines[i].to_string());
                    let offset = candidate.find_backwards(text, opts)?;
                    let at = candidate.text_len().saturating_add_signed(offset);
                    Some((i, candidate.with_cursor_at(at)))
                })
            }
        }
    }

    /// `(working_index, cursor_position)` of the `count`-th match.
    pub(crate) fn search(
        &self,
        query: &SearchState,
        include_current_position: bool,
        count: usize,
    ) -> Option<(usize, usize)> {
        if count == 0 {
            return None;
        }
        let mut index = self.st.working_index;
        let mut document = self.st.document.clone();
        for _ in 0..count {
            (index, document) = self.search_once(query, include_current_position, index, &document)?;
        }
        Some((index, document.cursor_position()))
    }

    pub(crate) fn document_for_search(&self, query: &SearchState) -> Document {
        let Some((index, position)) = self.search(query, true, 1) else {
            return self.st.document.clone();
        };
        let selection = if index == self.st.working_index {
            self.st.document.selection().cloned()
        } else {
            None
        };
        Document::with_cursor_clamped(self.st.working_lines[index].to_string(), position).with_selection_state(selection)
    }

    pub(crate) fn apply_search(&mut self, query: &SearchState, include_current_position: bool, count: usize) {
        if let Some((index, position)) = self.search(query, include_current_position, count) {
            self.set_working_index(index);
            self.set_cursor(position);
        }
    }
}

impl Buffer {
    pub fn cursor_left(&self, count: usize) {
        self.transact(|tx| tx.cursor_left(count));
    }

    pub fn cursor_right(&self, count: usize) {
        self.transact(|tx| tx.cursor_right(count));
    }

    /// Move up `count` lines, keeping the column of the first vertical move.
    pub fn cursor_up(&self, count: usize) {
        self.transact(|tx| tx.cursor_up(count));
    }

    pub fn cursor_down(&self, count: usize) {
        self.transact(|tx| tx.cursor_down(count));
    }

    /// Previous completion if cycling, else the line above, else older history.
    pub fn auto_up(&self, count: usize, go_to_start_of_line_if_history_changes: bool) -> Result<(), BufferError> {
        self.ensure_history_loaded();
        self.transact(|tx| tx.auto_up(count, go_to_start_of_line_if_history_changes))
    }

    /// Next completion if cycling, else the line below, else newer history.
    pub fn auto_down(&self, count: usize, go_to_start_of_line_if_history_changes: bool) -> Result<(), BufferError> {
        self.ensure_history_loaded();
        self.transact(|tx| tx.auto_down(count, go_to_start_of_line_if_history_changes))
    }

    /// Jump to the bracket matching the one under the cursor, if any.
    pub fn go_to_matching_bracket(&self) {
        self.transact(|tx| {
            let delta = tx.doc().find_matching_bracket_position(None, None);
            tx.move_cursor(delta);
        });
    }

    /// Materialize the history store into the working list (once per reset).
    pub fn load_history_if_not_yet_loaded(&self) {
        self.ensure_history_loaded();
    }

    pub fn history_backward(&self, count: usize) {
        self.ensure_history_loaded();
        self.transact(|tx| tx.history_backward(count));
    }

    pub fn history_forward(&self, count: usize) {
        self.ensure_history_loaded();
        self.transact(|tx| tx.history_forward(count));
    }

    pub fn go_to_history(&self, index: usize) {
        self.ensure_history_loaded();
        self.transact(|tx| tx.go_to_history(index));
    }

    /// Insert argument `n` (default 1) of a history entry. Repeating the
    /// call walks to older entries, replacing the previous insertion.
    pub fn yank_nth_arg(&self, n: Option<isize>) -> Result<(), BufferError> {
        let history = self.history.load();
        self.transact(|tx| tx.yank_nth_arg(n, false, &history))
    }

    /// Like [`Buffer::yank_nth_arg`] with the last argument as default.
    pub fn yank_last_arg(&self, n: Option<isize>) -> Result<(), BufferError> {
        let history = self.history.load();
        self.transact(|tx| tx.yank_nth_arg(n, true, &history))
    }

    /// Absolute cursor position of the `count`-th match, or the current
    /// position when there is none.
    pub fn get_search_position(&self, query: &SearchState, include_current_position: bool, count: usize) -> usize {
        self.ensure_history_loaded();
        self.transact(|tx| {
            tx.search(query, include_current_position, count)
                .map_or_else(|| tx.doc().cursor_position(), |(_, position)| position)
        })
    }

    /// The document a search would land on, without moving the buffer.
    pub fn document_for_search(&self, query: &SearchState) -> Document {
        self.ensure_history_loaded();
        self.transact(|tx| tx.document_for_search(query))
    }

    pub fn apply_search(&self, query: &SearchState, include_current_position: bool, count: usize) {
        self.ensure_history_loaded();
        self.transact(|tx| tx.apply_search(query, include_current_position, count));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::InMemoryHistory;
    use crate::options::{BufferOptions, Condition};
    use core_text::SelectionType;
    use pretty_assertions::assert_eq;
    use std::sync::Arc;

    fn with_history(entries: &[&str], text: &str) -> Buffer {
        Buffer::builder()
            .history(Arc::new(InMemoryHistory::with_entries(entries.iter().copied())))
            .document(Document::new(text))
            .build()
    }

    #[test]
    fn preferred_column_sticks_across_short_lines() {
        let b = Buffer::new(Document::with_cursor("abcdef\nab\nabcdef", 5).unwrap());
        b.cursor_down(1);
        assert_eq!(b.cursor_position(), 9);
        b.cursor_down(1);
        assert_eq!(b.cursor_position(), 15);
        assert_eq!(b.preferred_column(), Some(5));
        b.cursor_left(1);
        assert_eq!(b.preferred_column(), None);
    }

    #[test]
    fn history_backward_then_forward() {
        let b = with_history(&["ls -la", "cd /home", "pwd"], "");
        b.history_backward(1);
        assert_eq!(b.text(), "pwd");
        assert_eq!(b.cursor_position(), 3);
        b.history_backward(2);
        assert_eq!(b.text(), "ls -la");
        b.history_backward(1);
        assert_eq!(b.text(), "ls -la");
        b.history_forward(3);
        assert_eq!(b.text(), "");
        assert_eq!(b.working_index(), 3);
    }

    #[test]
    fn history_forward_lands_on_end_of_first_line() {
        let b = with_history(&["x", "first\nsecond"], "");
        b.go_to_history(0);
        assert_eq!((b.text().as_str(), b.cursor_position()), ("x", 1));
        b.history_forward(1);
        assert_eq!(b.text(), "first\nsecond");
        assert_eq!(b.cursor_position(), 5);
    }

    #[test]
    fn history_search_filters_by_prefix() {
        let b = Buffer::builder()
            .history(Arc::new(InMemoryHistory::with_entries(["git log", "ls", "git status"])))
            .options(BufferOptions {
                enable_history_search: Condition::constant(true),
                ..BufferOptions::default()
            })
            .document(Document::new("git"))
            .build();
        b.history_backward(1);
        assert_eq!(b.text(), "git status");
        b.history_backward(1);
        assert_eq!(b.text(), "git log");
        assert_eq!(b.history_search_text().as_deref(), Some("git"));
        b.history_forward(1);
        assert_eq!(b.text(), "git status");
    }

    #[test]
    fn go_to_history_ignores_invalid_index() {
        let b = with_history(&["a"], "b");
        b.go_to_history(7);
        assert_eq!(b.text(), "b");
        b.go_to_history(0);
        assert_eq!(b.text(), "a");
    }

    #[test]
    fn auto_up_prefers_lines_then_history() {
        let b = with_history(&["older"], "one\ntwo");
        b.auto_up(1, false).unwrap();
        assert_eq!(b.document().cursor_position_row(), 0);
        b.auto_up(1, true).unwrap();
        assert_eq!(b.text(), "older");
        assert_eq!(b.cursor_position(), 0);
        b.auto_down(1, false).unwrap();
        assert_eq!(b.text(), "one\ntwo");
    }

    #[test]
    fn auto_up_with_selection_stays_put() {
        let b = with_history(&["older"], "one");
        b.start_selection(SelectionType::Characters);
        b.auto_up(1, false).unwrap();
        assert_eq!(b.text(), "one");
    }

    #[test]
    fn matching_bracket_jump() {
        let b = Buffer::new(Document::with_cursor("(foo (bar) baz)", 0).unwrap());
        b.go_to_matching_bracket();
        assert_eq!(b.cursor_position(), 14);
        b.go_to_matching_bracket();
        assert_eq!(b.cursor_position(), 0);
    }

    #[test]
    fn yank_args_walk_back_through_history() {
        let b = with_history(&["cp a.txt b.txt", "echo \"one two\" three"], "");
        b.yank_last_arg(None).unwrap();
        assert_eq!(b.text(), "three");
        b.yank_last_arg(None).unwrap();
        assert_eq!(b.text(), "b.txt");
        b.yank_last_arg(None).unwrap();
        assert_eq!(b.text(), "three");
        b.reset(None, false);
        b.yank_nth_arg(None).unwrap();
        assert_eq!(b.text(), "\"one two\"");
        b.yank_nth_arg(Some(0)).unwrap();
        assert_eq!(b.text(), "cp");
    }

    #[test]
    fn yank_with_empty_history_is_noop() {
        let b = with_history(&[], "x");
        b.yank_nth_arg(None).unwrap();
        assert_eq!(b.text(), "x");
    }

    #[test]
    fn search_wraps_into_history() {
        let b = with_history(&["alpha beta", "gamma"], "delta beta");
        let forward = SearchState::new("beta", SearchDirection::Forward);
        b.set_cursor_position(0);
        assert_eq!(b.get_search_position(&forward, true, 1), 6);
        let backward = SearchState::new("alpha", SearchDirection::Backward);
        let found = b.document_for_search(&backward);
        assert_eq!(found.text(), "alpha beta");
        assert_eq!(found.cursor_position(), 0);
        assert_eq!(b.text(), "delta beta");
        b.apply_search(&backward, true, 1);
        assert_eq!(b.working_index(), 0);
        assert_eq!(b.text(), "alpha beta");
    }

    #[test]
    fn search_without_match_keeps_position() {
        let b = with_history(&["a"], "bcd");
        let q = SearchState::new("zzz", SearchDirection::Forward);
        assert_eq!(b.get_search_position(&q, true, 1), 3);
        assert_eq!(b.get_search_position(&SearchState::new("b", SearchDirection::Forward), true, 0), 3);
    }

    #[test]
    fn document_for_search_keeps_selection_in_same_slot() {
        let b = with_history(&[], "foo bar foo");
        b.set_cursor_position(0);
        b.start_selection(SelectionType::Characters);
        let q = SearchState::new("bar", SearchDirection::Forward);
        let found = b.document_for_search(&q);
        assert_eq!(found.cursor_position(), 4);
        assert!(found.selection().is_some());
    }
}
