//! Inline suggestions shown after the cursor.

use crate::history::History;
use core_text::Document;
use std::sync::Arc;

/// Text that would follow the cursor if accepted.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Suggestion {
    pub text: String,
}

impl Suggestion {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

/// Supplies an optional suggestion for a document. The buffer only stores
/// the result and clears it on the next text change.
pub trait AutoSuggest: Send + Sync {
    fn get_suggestion(&self, document: &Document) -> Option<Suggestion>;
}

/// Suggests the remainder of the newest history entry starting with the
/// current line.
pub struct AutoSuggestFromHistory {
    history: Arc<dyn History>,
}

impl AutoSuggestFromHistory {
    pub fn new(history: Arc<dyn History>) -> Self {
        Self { history }
    }
}

impl AutoSuggest for AutoSuggestFromHistory {
    fn get_suggestion(&self, document: &Document) -> Option<Suggestion> {
        let text = document.text();
        let line = text.rsplit('\n').next().unwrap_or(text);
        if line.trim().is_empty() {
            return None;
        }
        self.history
            .load()
            .iter()
            .rev()
            .flat_map(|entry| entry.lines().rev())
            .find_map(|l| l.strip_prefix(line).filter(|rest| !rest.is_empty()))
            .map(Suggestion::new)
    }
}
