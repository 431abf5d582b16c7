//! Completion candidates, the in-progress completion cycle and the
//! completer contract.

use core_text::Document;
use core_text::chars;

/// A candidate replacing the text just before the cursor.
///
/// `start_position` is zero or negative: the number of chars before the
/// cursor the candidate replaces.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Completion {
    pub text: String,
    pub start_position: isize,
    pub display: Option<String>,
    pub display_meta: Option<String>,
}

impl Completion {
    /// Positive start positions are clamped to zero.
    pub fn new(text: impl Into<String>, start_position: isize) -> Self {
        Self {
            text: text.into(),
            start_position: start_position.min(0),
            display: None,
            display_meta: None,
        }
    }

    pub fn with_display(mut self, display: impl Into<String>) -> Self {
        self.display = Some(display.into());
        self
    }

    pub fn with_meta(mut self, meta: impl Into<String>) -> Self {
        self.display_meta = Some(meta.into());
        self
    }

    /// Label for menus; falls back to the inserted text.
    pub fn display_text(&self) -> &str {
        self.display.as_deref().unwrap_or(&self.text)
    }

    fn replaced_len(&self) -> usize {
        self.start_position.unsigned_abs()
    }

    /// The same completion as seen from a cursor `position` chars further
    /// right, after that much of it has already been inserted.
    pub fn new_completion_from_position(&self, position: usize) -> Completion {
        let skip = position + self.replaced_len();
        Completion {
            text: chars::tail(&self.text, skip).to_string(),
            start_position: 0,
            display: self.display.clone(),
            display_meta: self.display_meta.clone(),
        }
    }
}

/// Produces candidates for a document. Called outside the buffer lock.
pub trait Completer: Send + Sync {
    fn get_completions(&self, document: &Document) -> Vec<Completion>;
}

impl<F> Completer for F
where
    F: Fn(&Document) -> Vec<Completion> + Send + Sync,
{
    fn get_completions(&self, document: &Document) -> Vec<Completion> {
        self(document)
    }
}

/// Completes the word before the cursor from a fixed list of words.
#[derive(Debug, Clone, Default)]
pub struct WordCompleter {
    words: Vec<String>,
    ignore_case: bool,
}

impl WordCompleter {
    pub fn new<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            words: words.into_iter().map(Into::into).collect(),
            ignore_case: false,
        }
    }

    pub fn ignore_case(mut self, ignore_case: bool) -> Self {
        self.ignore_case = ignore_case;
        self
    }
}

impl Completer for WordCompleter {
    fn get_completions(&self, document: &Document) -> Vec<Completion> {
        let before = document.text_before_cursor();
        let prefix_start = before
            .char_indices()
            .rev()
            .find(|(_, c)| c.is_whitespace())
            .map(|(i, c)| i + c.len_utf8())
            .unwrap_or(0);
        let prefix = &before[prefix_start..];
        let replaced = -(chars::char_len(prefix) as isize);
        self.words
            .iter()
            .filter(|w| {
                if self.ignore_case {
                    w.to_lowercase().starts_with(&prefix.to_lowercase())
                } else {
                    w.starts_with(prefix)
                }
            })
            .map(|w| Completion::new(w.clone(), replaced))
            .collect()
    }
}

/// An active completion cycle: the document it started from, the
/// candidates and the selected index (`None` shows the original text).
#[derive(Debug, Clone)]
pub struct CompletionState {
    original_document: Document,
    completions: Vec<Completion>,
    complete_index: Option<usize>,
}

impl CompletionState {
    pub fn new(original_document: Document, completions: Vec<Completion>) -> Self {
        Self {
            original_document,
            completions,
            complete_index: None,
        }
    }

    pub fn original_document(&self) -> &Document {
        &self.original_document
    }

    pub fn completions(&self) -> &[Completion] {
        &self.completions
    }

    pub fn complete_index(&self) -> Option<usize> {
        self.complete_index
    }

    pub fn current_completion(&self) -> Option<&Completion> {
        self.complete_index.and_then(|i| self.completions.get(i))
    }

    /// Select `index`. Ignored when there are no candidates; out-of-range
    /// indices are clamped to the last candidate.
    pub fn go_to_index(&mut self, index: Option<usize>) {
        if self.completions.is_empty() {
            return;
        }
        self.complete_index = index.map(|i| i.min(self.completions.len() - 1));
    }

    /// Text and cursor with the selected candidate applied to the original document.
    pub fn new_text_and_position(&self) -> (String, usize) {
        let original = &self.original_document;
        let Some(c) = self.current_completion() else {
            return (original.text().to_string(), original.cursor_position());
        };
        let before_cursor = original.text_before_cursor();
        let keep = chars::char_len(before_cursor).saturating_sub(c.replaced_len());
        let before = chars::head(before_cursor, keep);
        let mut text = String::with_capacity(original.text().len() + c.text.len());
        text.push_str(before);
        text.push_str(&c.text);
        text.push_str(original.text_after_cursor());
        (text, keep + chars::char_len(&c.text))
    }
}

/// True when applying `completion` would leave the text unchanged.
pub(crate) fn completion_does_nothing(document: &Document, completion: &Completion) -> bool {
    let before = document.text_before_cursor();
    let len = chars::char_len(before);
    let replaced = chars::tail(before, len.saturating_sub(completion.replaced_len()));
    replaced == completion.text
}

/// Longest suffix every candidate would add without altering the text before
/// the cursor. Empty when any candidate rewrites what was typed.
pub fn get_common_complete_suffix(document: &Document, completions: &[Completion]) -> String {
    let before = document.text_before_cursor();
    let keeps_typed_text = |c: &Completion| {
        let typed = chars::head(&c.text, c.replaced_len());
        before.ends_with(typed)
    };
    if completions.is_empty() || !completions.iter().all(keeps_typed_text) {
        return String::new();
    }
    let suffixes: Vec<&str> = completions
        .iter()
        .map(|c| chars::tail(&c.text, c.replaced_len()))
        .collect();
    common_prefix(&suffixes)
}

fn common_prefix(items: &[&str]) -> String {
    let Some((first, rest)) = items.split_first() else {
        return String::new();
    };
    let mut len = first.len();
    for s in rest {
        len = first[..len]
            .char_indices()
            .zip(s.chars())
            .find(|((_, a), b)| a != b)
            .map_or(len.min(s.len()), |((at, _), _)| at);
    }
    first[..len].to_string()
}
