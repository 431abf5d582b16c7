//! Immutable text documents for line editing.
//!
//! [`Document`] is a text + cursor + selection snapshot with the structural
//! queries an editor needs: line/column translation, word and WORD motions,
//! bracket matching, literal search and clipboard-style cut/paste. All
//! transforms return new documents. Positions are char offsets.

pub mod bracket;
pub mod chars;
pub mod clipboard;
pub mod document;
pub mod find;
pub mod line_ending;
pub mod line_index;
pub mod search_state;
pub mod selection;
pub mod width;
pub mod word;

pub use bracket::BRACKET_PAIRS;
pub use clipboard::{ClipboardData, PasteMode};
pub use document::Document;
pub use find::FindOptions;
pub use line_ending::to_lf;
pub use search_state::{CaseFilter, SearchDirection, SearchState};
pub use selection::{SelectionState, SelectionType};
pub use word::WordKind;

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TextError {
    #[error("cursor position {position} is outside text of length {len}")]
    InvalidCursorPosition { position: usize, len: usize },
}
