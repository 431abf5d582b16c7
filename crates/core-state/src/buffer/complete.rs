use super::{Buffer, Tx};
use crate::BufferError;
use crate::completion::{Completion, CompletionState, completion_does_nothing, get_common_complete_suffix};
use core_text::{Document, chars};
use tracing::debug;

/// What [`Buffer::start_completion`] does once candidates arrive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CompletionStart {
    /// Show the candidates; keep the original text.
    #[default]
    Show,
    SelectFirst,
    SelectLast,
    /// Insert the suffix all candidates share, if any.
    InsertCommonPart,
}

impl Tx<'_> {
    pub(crate) fn set_completions(&mut self, completions: Vec<Completion>) -> CompletionState {
        let state = CompletionState::new(self.doc().clone(), completions);
        debug!(target: "state.completion", candidates = state.completions().len(), "completions_set");
        self.st.complete_state = Some(state.clone());
        state
    }

    pub(crate) fn go_to_completion(&mut self, index: Option<usize>) -> Result<(), BufferError> {
        let Some(mut state) = self.st.complete_state.clone() else {
            return Ok(());
        };
        state.go_to_index(index);
        let (text, cursor) = state.new_text_and_position();
        self.replace(text, cursor)?;
        debug!(target: "state.completion", index = ?state.complete_index(), "go_to_completion");
        // The text/cursor change above dropped the cycle; reinstate it.
        self.st.complete_state = Some(state);
        Ok(())
    }

    pub(crate) fn complete_next(&mut self, count: usize, disable_wrap_around: bool) -> Result<(), BufferError> {
        let Some(state) = &self.st.complete_state else {
            return Ok(());
        };
        let total = state.completions().len();
        let index = match state.complete_index() {
            None => Some(0),
            Some(i) if i + 1 >= total => {
                if disable_wrap_around {
                    return Ok(());
                }
                None
            }
            Some(i) => Some((i + count).min(total.saturating_sub(1))),
        };
        self.go_to_completion(index)
    }

    pub(crate) fn complete_previous(&mut self, count: usize, disable_wrap_around: bool) -> Result<(), BufferError> {
        let Some(state) = &self.st.complete_state else {
            return Ok(());
        };
        let total = state.completions().len();
        let index = match state.complete_index() {
            Some(0) => {
                if disable_wrap_around {
                    return Ok(());
                }
                None
            }
            None => total.checked_sub(1),
            Some(i) => Some(i.saturating_sub(count)),
        };
        self.go_to_completion(index)
    }

    pub(crate) fn cancel_completion(&mut self) -> Result<(), BufferError> {
        if self.st.complete_state.is_some() {
            self.go_to_completion(None)?;
            self.st.complete_state = None;
        }
        Ok(())
    }

    pub(crate) fn apply_completion(&mut self, completion: &Completion) -> Result<(), BufferError> {
        self.ensure_writable()?;
        if self.st.complete_state.is_some() {
            self.go_to_completion(None)?;
        }
        self.st.complete_state = None;
        self.delete_before_cursor(completion.start_position.unsigned_abs())?;
        self.insert_text(&completion.text, false, true, true)
    }

    /// Install freshly generated candidates if `origin` is still current and
    /// nobody started cycling in the meantime.
    fn install_completions(
        &mut self,
        origin: &Document,
        completions: Vec<Completion>,
        start: CompletionStart,
    ) -> Result<(), BufferError> {
        if self.doc() != origin {
            debug!(target: "state.completion", "completions_discarded_stale");
            return Ok(());
        }
        if self.st.complete_state.as_ref().is_some_and(|s| s.complete_index().is_some()) {
            return Ok(());
        }
        if completions.is_empty() {
            self.st.complete_state = None;
            return Ok(());
        }
        let total = completions.len();
        match start {
            CompletionStart::Show => {
                self.set_completions(completions);
            }
            CompletionStart::SelectFirst => {
                self.set_completions(completions);
                self.go_to_completion(Some(0))?;
            }
            CompletionStart::SelectLast => {
                self.set_completions(completions);
                self.go_to_completion(Some(total - 1))?;
            }
            CompletionStart::InsertCommonPart => {
                let common = get_common_complete_suffix(origin, &completions);
                if !common.is_empty() {
                    self.insert_text(&common, false, true, false)?;
                    if total > 1 {
                        let shift = chars::char_len(&common);
                        let rest = completions.iter().map(|c| c.new_completion_from_position(shift)).collect();
                        self.set_completions(rest);
                    } else {
                        self.st.complete_state = None;
                    }
                } else if total == 1 {
                    self.set_completions(completions);
                    self.go_to_completion(Some(0))?;
                } else {
                    self.set_completions(completions);
                }
            }
        }
        Ok(())
    }
}

impl Buffer {
    /// Start a completion cycle over `completions`, anchored at the current
    /// document, with nothing selected.
    pub fn set_completions(&self, completions: Vec<Completion>) -> CompletionState {
        self.transact(|tx| tx.set_completions(completions))
    }

    /// Select candidate `index` (`None` restores the original text).
    pub fn go_to_completion(&self, index: Option<usize>) -> Result<(), BufferError> {
        self.transact(|tx| tx.go_to_completion(index))
    }

    /// Select the next candidate; past the last one the original text
    /// comes back unless `disable_wrap_around` holds the selection there.
    pub fn complete_next(&self, count: usize, disable_wrap_around: bool) -> Result<(), BufferError> {
        self.transact(|tx| tx.complete_next(count, disable_wrap_around))
    }

    pub fn complete_previous(&self, count: usize, disable_wrap_around: bool) -> Result<(), BufferError> {
        self.transact(|tx| tx.complete_previous(count, disable_wrap_around))
    }

    /// Restore the original text and drop the cycle.
    pub fn cancel_completion(&self) -> Result<(), BufferError> {
        self.transact(|tx| tx.cancel_completion())
    }

    /// Replace the text before the cursor with `completion` in one step.
    pub fn apply_completion(&self, completion: &Completion) -> Result<(), BufferError> {
        self.transact(|tx| tx.apply_completion(completion))
    }

    /// Ask the completer for candidates and start a cycle. Does nothing
    /// without a completer or when a cycle is already active.
    pub fn start_completion(&self, start: CompletionStart) -> Result<(), BufferError> {
        let Some(completer) = self.completer.clone() else {
            return Ok(());
        };
        let origin = {
            let st = self.state.lock();
            if st.complete_state.is_some() {
                return Ok(());
            }
            st.document.clone()
        };
        let mut completions = completer.get_completions(&origin);
        if completions.len() == 1 && completion_does_nothing(&origin, &completions[0]) {
            completions.clear();
        }
        self.transact(|tx| tx.install_completions(&origin, completions, start))
    }

    /// Follow-ups for typed input: live completion and suggestion refresh.
    pub(super) fn after_insert(&self, inserted: &Document) {
        if self.completer.is_some() && self.options.complete_while_typing.eval() {
            if let Err(error) = self.start_completion(CompletionStart::Show) {
                debug!(target: "state.completion", %error, "complete_while_typing_failed");
            }
        }
        if let Some(auto_suggest) = &self.auto_suggest {
            let suggestion = auto_suggest.get_suggestion(inserted);
            self.transact(|tx| {
                if tx.doc() == inserted && tx.st.suggestion.is_none() {
                    tx.st.suggestion = suggestion;
                }
            });
        }
    }
}
