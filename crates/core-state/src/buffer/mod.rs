//! The mutable editing surface.
//!
//! A [`Buffer`] owns the current [`Document`] plus session state (undo
//! stacks, completion cycle, history working list, validation result, yank
//! cycle). Every public operation locks the state once, computes the new
//! document from pure `Document`/`CompletionState` functions, swaps it in and
//! unlocks. Change notices gathered while locked are published on the event
//! channels afterwards, so subscribers never run under the lock.
//!
//! Collaborators (completer, validator, history store, auto-suggest) are
//! always called with the lock released. Operations that need them run in
//! two phases: snapshot the document, call out, then install the result only
//! if the document is still the one that was snapshotted.

mod complete;
mod edit;
mod navigate;
mod validate;

pub use complete::CompletionStart;
pub use edit::INDENT_WIDTH;

use crate::completion::CompletionState;
use crate::history::{History, InMemoryHistory, YankNthArgState};
use crate::options::BufferOptions;
use crate::suggest::{AutoSuggest, Suggestion};
use crate::undo::UndoEngine;
use crate::validation::{ValidationError, ValidationState, Validator};
use crate::{BufferError, Completer};
use core_events::EventChannel;
use core_text::{Document, SelectionState, chars};
use parking_lot::{Mutex, MutexGuard};
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// Called by [`Buffer::validate_and_handle`] with valid input. Returns true
/// to keep the text in the buffer instead of resetting it.
pub type AcceptHandler = Arc<dyn Fn(&Buffer) -> bool + Send + Sync>;

pub(crate) struct BufferState {
    document: Document,
    undo: UndoEngine,
    complete_state: Option<CompletionState>,
    validation_state: ValidationState,
    validation_error: Option<ValidationError>,
    // History entries followed by the live text; `working_index` selects the
    // slot mirrored by `document`.
    working_lines: Vec<Arc<str>>,
    working_index: usize,
    history_loaded: bool,
    history_search_text: Option<String>,
    suggestion: Option<Suggestion>,
    multiple_cursor_positions: Vec<usize>,
    preferred_column: Option<usize>,
    yank_nth_arg_state: Option<YankNthArgState>,
    document_before_paste: Option<Document>,
}

impl BufferState {
    fn new(document: Document, undo_limit: usize) -> Self {
        Self {
            working_lines: vec![document.text_arc().clone()],
            document,
            undo: UndoEngine::new(undo_limit),
            complete_state: None,
            validation_state: ValidationState::Unknown,
            validation_error: None,
            working_index: 0,
            history_loaded: false,
            history_search_text: None,
            suggestion: None,
            multiple_cursor_positions: Vec::new(),
            preferred_column: None,
            yank_nth_arg_state: None,
            document_before_paste: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NoticeKind {
    TextChanged,
    CursorPositionChanged,
    TextInsert,
}

struct Notice {
    kind: NoticeKind,
    document: Document,
}

/// One locked unit of work. Holds the state guard and the notices to
/// publish once it is released.
pub(crate) struct Tx<'a> {
    buf: &'a Buffer,
    st: MutexGuard<'a, BufferState>,
    notices: Vec<Notice>,
}

pub struct Buffer {
    name: String,
    options: BufferOptions,
    completer: Option<Arc<dyn Completer>>,
    auto_suggest: Option<Arc<dyn AutoSuggest>>,
    history: Arc<dyn History>,
    validator: Option<Arc<dyn Validator>>,
    accept_handler: Option<AcceptHandler>,
    state: Mutex<BufferState>,
    on_text_changed: EventChannel<Document>,
    on_cursor_position_changed: EventChannel<Document>,
    on_text_insert: EventChannel<Document>,
}

/// Builder for [`Buffer`]; every part is optional.
#[derive(Default)]
pub struct BufferBuilder {
    name: Option<String>,
    document: Option<Document>,
    options: Option<BufferOptions>,
    completer: Option<Arc<dyn Completer>>,
    auto_suggest: Option<Arc<dyn AutoSuggest>>,
    history: Option<Arc<dyn History>>,
    validator: Option<Arc<dyn Validator>>,
    accept_handler: Option<AcceptHandler>,
}

impl BufferBuilder {
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn document(mut self, document: Document) -> Self {
        self.document = Some(document);
        self
    }

    pub fn options(mut self, options: BufferOptions) -> Self {
        self.options = Some(options);
        self
    }

    pub fn completer(mut self, completer: Arc<dyn Completer>) -> Self {
        self.completer = Some(completer);
        self
    }

    pub fn auto_suggest(mut self, auto_suggest: Arc<dyn AutoSuggest>) -> Self {
        self.auto_suggest = Some(auto_suggest);
        self
    }

    pub fn history(mut self, history: Arc<dyn History>) -> Self {
        self.history = Some(history);
        self
    }

    pub fn validator(mut self, validator: Arc<dyn Validator>) -> Self {
        self.validator = Some(validator);
        self
    }

    pub fn accept_handler<F>(mut self, handler: F) -> Self
    where
        F: Fn(&Buffer) -> bool + Send + Sync + 'static,
    {
        self.accept_handler = Some(Arc::new(handler));
        self
    }

    pub fn build(self) -> Buffer {
        let options = self.options.unwrap_or_default();
        let document = self.document.unwrap_or_default();
        let state = BufferState::new(document, options.undo_limit);
        Buffer {
            name: self.name.unwrap_or_else(|| "default".to_string()),
            options,
            completer: self.completer,
            auto_suggest: self.auto_suggest,
            history: self.history.unwrap_or_else(|| Arc::new(InMemoryHistory::new())),
            validator: self.validator,
            accept_handler: self.accept_handler,
            state: Mutex::new(state),
            on_text_changed: EventChannel::new("text_changed"),
            on_cursor_position_changed: EventChannel::new("cursor_position_changed"),
            on_text_insert: EventChannel::new("text_insert"),
        }
    }
}

impl Default for Buffer {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl Buffer {
    pub fn builder() -> BufferBuilder {
        BufferBuilder::default()
    }

    pub fn new(document: Document) -> Self {
        Self::builder().document(document).build()
    }

    pub(crate) fn transact<R>(&self, f: impl FnOnce(&mut Tx<'_>) -> R) -> R {
        let mut tx = Tx {
            buf: self,
            st: self.state.lock(),
            notices: Vec::new(),
        };
        let out = f(&mut tx);
        let Tx { st, notices, .. } = tx;
        drop(st);
        self.publish(notices);
        out
    }

    fn publish(&self, notices: Vec<Notice>) {
        if notices.is_empty() {
            return;
        }
        let mut text_changed = false;
        let mut inserted = None;
        for Notice { kind, document } in notices {
            match kind {
                NoticeKind::TextChanged => {
                    text_changed = true;
                    self.on_text_changed.fire(document);
                }
                NoticeKind::CursorPositionChanged => self.on_cursor_position_changed.fire(document),
                NoticeKind::TextInsert => {
                    inserted = Some(document.clone());
                    self.on_text_insert.fire(document);
                }
            }
        }
        if text_changed && self.options.validate_while_typing.eval() {
            self.validate(false);
        }
        if let Some(document) = inserted {
            self.after_insert(&document);
        }
    }

    // ---------------------------------------------------------------------
    // Read access
    // ---------------------------------------------------------------------

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn options(&self) -> &BufferOptions {
        &self.options
    }

    /// Snapshot of the current document.
    pub fn document(&self) -> Document {
        self.state.lock().document.clone()
    }

    pub fn text(&self) -> String {
        self.state.lock().document.text().to_string()
    }

    pub fn cursor_position(&self) -> usize {
        self.state.lock().document.cursor_position()
    }

    pub fn selection_state(&self) -> Option<Arc<SelectionState>> {
        self.state.lock().document.selection().cloned()
    }

    pub fn complete_state(&self) -> Option<CompletionState> {
        self.state.lock().complete_state.clone()
    }

    pub fn validation_state(&self) -> ValidationState {
        self.state.lock().validation_state
    }

    pub fn validation_error(&self) -> Option<ValidationError> {
        self.state.lock().validation_error.clone()
    }

    pub fn suggestion(&self) -> Option<Suggestion> {
        self.state.lock().suggestion.clone()
    }

    pub fn working_index(&self) -> usize {
        self.state.lock().working_index
    }

    /// History entries (once loaded) followed by the live text.
    pub fn working_lines(&self) -> Vec<String> {
        self.state.lock().working_lines.iter().map(|l| l.to_string()).collect()
    }

    pub fn history_search_text(&self) -> Option<String> {
        self.state.lock().history_search_text.clone()
    }

    pub fn preferred_column(&self) -> Option<usize> {
        self.state.lock().preferred_column
    }

    pub fn yank_nth_arg_state(&self) -> Option<YankNthArgState> {
        self.state.lock().yank_nth_arg_state.clone()
    }

    /// Document as it was before the last paste, until the next change.
    pub fn document_before_paste(&self) -> Option<Document> {
        self.state.lock().document_before_paste.clone()
    }

    pub fn multiple_cursor_positions(&self) -> Vec<usize> {
        self.state.lock().multiple_cursor_positions.clone()
    }

    pub fn set_multiple_cursor_positions(&self, positions: Vec<usize>) {
        self.state.lock().multiple_cursor_positions = positions;
    }

    pub fn undo_depth(&self) -> usize {
        self.state.lock().undo.undo_depth()
    }

    pub fn redo_depth(&self) -> usize {
        self.state.lock().undo.redo_depth()
    }

    pub fn undo_snapshots_skipped(&self) -> u64 {
        self.state.lock().undo.snapshots_skipped()
    }

    pub fn is_read_only(&self) -> bool {
        self.options.read_only.eval()
    }

    pub fn is_multiline(&self) -> bool {
        self.options.multiline.eval()
    }

    /// True when an accept handler is installed.
    pub fn is_returnable(&self) -> bool {
        self.accept_handler.is_some()
    }

    pub fn on_text_changed(&self) -> &EventChannel<Document> {
        &self.on_text_changed
    }

    pub fn on_cursor_position_changed(&self) -> &EventChannel<Document> {
        &self.on_cursor_position_changed
    }

    pub fn on_text_insert(&self) -> &EventChannel<Document> {
        &self.on_text_insert
    }

    // ---------------------------------------------------------------------
    // Write access
    // ---------------------------------------------------------------------

    /// Replace text and cursor. The document's own selection is kept unless
    /// the text changes. `bypass_readonly` lets privileged callers edit a
    /// read-only buffer.
    pub fn set_document(&self, document: Document, bypass_readonly: bool) -> Result<(), BufferError> {
        self.transact(|tx| tx.set_document(document, bypass_readonly))
    }

    /// Replace the text, keeping the cursor where possible.
    pub fn set_text(&self, text: impl Into<String>) -> Result<(), BufferError> {
        let text = text.into();
        self.transact(|tx| tx.set_text(text))
    }

    /// Move the cursor, clamped into the text. Allowed on read-only buffers.
    pub fn set_cursor_position(&self, position: usize) {
        self.transact(|tx| tx.set_cursor(position));
    }

    /// Switch the visible slot of the working list; the cursor goes to 0.
    pub fn set_working_index(&self, index: usize) {
        self.transact(|tx| tx.set_working_index(index));
    }

    /// Install `document` (default empty) and drop all session state.
    pub fn reset(&self, document: Option<Document>, append_to_history: bool) {
        if append_to_history {
            self.append_to_history();
        }
        let document = document.unwrap_or_default();
        self.transact(|tx| tx.reset(document));
    }

    /// Append the current text to the history store unless it is empty or
    /// equal to the newest entry.
    pub fn append_to_history(&self) {
        let text = self.text();
        if text.is_empty() {
            return;
        }
        let entries = self.history.load();
        if entries.last().is_some_and(|last| *last == text) {
            return;
        }
        self.history.append_string(&text);
        debug!(target: "state.history", entries = entries.len() + 1, "append_to_history");
    }

    // ---------------------------------------------------------------------
    // Undo
    // ---------------------------------------------------------------------

    pub fn save_to_undo_stack(&self, clear_redo_stack: bool) {
        self.transact(|tx| tx.save_to_undo_stack(clear_redo_stack));
    }

    pub fn undo(&self) -> Result<(), BufferError> {
        self.transact(|tx| tx.undo())
    }

    pub fn redo(&self) -> Result<(), BufferError> {
        self.transact(|tx| tx.redo())
    }

    fn ensure_history_loaded(&self) {
        if self.state.lock().history_loaded {
            return;
        }
        let entries = self.history.load();
        self.transact(|tx| tx.load_history(entries));
    }
}

impl Tx<'_> {
    pub(crate) fn doc(&self) -> &Document {
        &self.st.document
    }

    fn notify(&mut self, kind: NoticeKind) {
        let document = self.st.document.clone();
        self.notices.push(Notice { kind, document });
    }

    pub(crate) fn ensure_writable(&self) -> Result<(), BufferError> {
        if self.buf.options.read_only.eval() {
            return Err(BufferError::ReadOnly);
        }
        Ok(())
    }

    pub(crate) fn set_document(&mut self, document: Document, bypass_readonly: bool) -> Result<(), BufferError> {
        let text_changed = document.text() != self.st.document.text();
        if text_changed && !bypass_readonly {
            self.ensure_writable()?;
        }
        let cursor_changed = document.cursor_position() != self.st.document.cursor_position();
        self.st.document = document;
        if text_changed {
            let slot = self.st.working_index;
            self.st.working_lines[slot] = self.st.document.text_arc().clone();
            self.text_changed();
            self.st.history_search_text = None;
        }
        if cursor_changed {
            self.cursor_position_changed();
        }
        Ok(())
    }

    pub(crate) fn set_text(&mut self, text: String) -> Result<(), BufferError> {
        let cursor = self.st.document.cursor_position();
        let selection = self.st.document.selection().cloned();
        let document = Document::with_cursor_clamped(text, cursor).with_selection_state(selection);
        self.set_document(document, false)
    }

    /// Replace text and cursor together.
    pub(crate) fn replace(&mut self, text: String, cursor: usize) -> Result<(), BufferError> {
        self.set_document(Document::with_cursor_clamped(text, cursor), false)
    }

    pub(crate) fn set_cursor(&mut self, position: usize) {
        let document = self.st.document.with_cursor_at(position);
        if document.cursor_position() != self.st.document.cursor_position() {
            self.st.document = document;
            self.cursor_position_changed();
        }
    }

    pub(crate) fn move_cursor(&mut self, delta: isize) {
        let target = self.st.document.cursor_position().saturating_add_signed(delta);
        self.set_cursor(target);
    }

    fn text_changed(&mut self) {
        let st = &mut *self.st;
        st.validation_error = None;
        st.validation_state = ValidationState::Unknown;
        st.complete_state = None;
        st.yank_nth_arg_state = None;
        st.document_before_paste = None;
        st.suggestion = None;
        st.preferred_column = None;
        if st.document.selection().is_some() {
            st.document = st.document.with_selection_state(None);
        }
        self.notify(NoticeKind::TextChanged);
    }

    fn cursor_position_changed(&mut self) {
        let st = &mut *self.st;
        st.complete_state = None;
        st.yank_nth_arg_state = None;
        st.document_before_paste = None;
        st.preferred_column = None;
        self.notify(NoticeKind::CursorPositionChanged);
    }

    pub(crate) fn set_working_index(&mut self, index: usize) {
        if index == self.st.working_index || index >= self.st.working_lines.len() {
            return;
        }
        let document = Document::with_cursor_clamped(self.st.working_lines[index].to_string(), 0);
        let cursor_moved = self.st.document.cursor_position() != 0;
        self.st.working_index = index;
        self.st.working_lines[index] = document.text_arc().clone();
        self.st.document = document;
        if cursor_moved {
            self.cursor_position_changed();
        }
        self.text_changed();
        debug!(target: "state.history", working_index = index, lines = self.st.working_lines.len(), "working_index_changed");
    }

    fn load_history(&mut self, entries: Vec<String>) {
        if self.st.history_loaded {
            return;
        }
        self.st.history_loaded = true;
        let loaded = entries.len();
        let mut lines: Vec<Arc<str>> = entries.into_iter().map(Arc::from).collect();
        lines.append(&mut self.st.working_lines);
        self.st.working_lines = lines;
        self.st.working_index += loaded;
        debug!(target: "state.history", entries = loaded, working_index = self.st.working_index, "history_loaded");
    }

    fn reset(&mut self, document: Document) {
        let text_changed = document.text() != self.st.document.text();
        let cursor_changed = document.cursor_position() != self.st.document.cursor_position();
        let limit = self.st.undo.limit();
        *self.st = BufferState::new(document.with_selection_state(None), limit);
        if text_changed {
            self.notify(NoticeKind::TextChanged);
        }
        if cursor_changed {
            self.notify(NoticeKind::CursorPositionChanged);
        }
        debug!(target: "state.buffer", buffer = %self.buf.name, "reset");
    }

    pub(crate) fn save_to_undo_stack(&mut self, clear_redo_stack: bool) {
        let st = &mut *self.st;
        st.undo.save(&st.document, clear_redo_stack);
    }

    pub(crate) fn undo(&mut self) -> Result<(), BufferError> {
        if self.st.undo.undo_depth() == 0 {
            return Ok(());
        }
        self.ensure_writable()?;
        let st = &mut *self.st;
        if let Some(previous) = st.undo.undo(&st.document) {
            self.set_document(previous, false)?;
        }
        Ok(())
    }

    pub(crate) fn redo(&mut self) -> Result<(), BufferError> {
        if self.st.undo.redo_depth() == 0 {
            return Ok(());
        }
        self.ensure_writable()?;
        let st = &mut *self.st;
        if let Some(next) = st.undo.redo(&st.document) {
            self.set_document(next, false)?;
        }
        Ok(())
    }
}

impl fmt::Display for Buffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = self.text();
        let cap = self.options.preview_len;
        if chars::char_len(&text) < cap {
            write!(f, "Buffer(name={:?}, text={:?})", self.name, text)
        } else {
            let preview = format!("{}...", chars::head(&text, cap.saturating_sub(3)));
            write!(f, "Buffer(name={:?}, text={:?})", self.name, preview)
        }
    }
}

impl fmt::Debug for Buffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let st = self.state.lock();
        f.debug_struct("Buffer")
            .field("name", &self.name)
            .field("text_len", &st.document.text_len())
            .field("cursor_position", &st.document.cursor_position())
            .field("working_index", &st.working_index)
            .field("validation_state", &st.validation_state)
            .finish_non_exhaustive()
    }
}
