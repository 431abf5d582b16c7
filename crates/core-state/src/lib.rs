//! Line-editing state: the mutable [`Buffer`] and its collaborators.
//!
//! A [`Buffer`] owns the current [`core_text::Document`] plus the session
//! state built around it: undo/redo stacks, the completion cycle, the
//! history working list, validation outcome, yank state and suggestion.
//! Every public operation runs as one locked unit of work; change
//! notifications are published on [`core_events::EventChannel`]s after the
//! lock is released.
//!
//! Completers, validators, history stores, clipboards and suggestion
//! providers are traits. The in-memory implementations here cover tests and
//! simple hosts.

mod buffer;
pub mod clipboard;
pub mod completion;
mod error;
pub mod history;
pub mod options;
pub mod suggest;
pub mod undo;
pub mod validation;

pub use buffer::{AcceptHandler, Buffer, BufferBuilder, CompletionStart, INDENT_WIDTH};
pub use clipboard::{Clipboard, InMemoryClipboard};
pub use completion::{Completer, Completion, CompletionState, WordCompleter, get_common_complete_suffix};
pub use error::BufferError;
pub use history::{History, InMemoryHistory, YankNthArgState, split_arguments};
pub use options::{BufferOptions, Condition};
pub use suggest::{AutoSuggest, AutoSuggestFromHistory, Suggestion};
pub use undo::UndoEngine;
pub use validation::{FnValidator, ValidationError, ValidationState, Validator};
