//! Input validation contract.

use async_trait::async_trait;
use core_text::Document;
use std::fmt;

/// Outcome of the last validation of the current text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ValidationState {
    Valid,
    Invalid,
    /// Not validated since the last text change.
    #[default]
    Unknown,
}

/// Rejection reported by a [`Validator`]: where the problem is and why.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid input at {cursor_position}: {message}")]
pub struct ValidationError {
    pub cursor_position: usize,
    pub message: String,
}

impl ValidationError {
    pub fn new(cursor_position: usize, message: impl Into<String>) -> Self {
        Self {
            cursor_position,
            message: message.into(),
        }
    }
}

/// Accepts or rejects a document.
///
/// `validate_async` defaults to the synchronous check; implementations with
/// slow checks override it. Both run without the buffer lock held.
#[async_trait]
pub trait Validator: Send + Sync {
    fn validate(&self, document: &Document) -> Result<(), ValidationError>;

    async fn validate_async(&self, document: &Document) -> Result<(), ValidationError> {
        self.validate(document)
    }
}

/// Validator built from a predicate and a fixed message.
pub struct FnValidator<F> {
    check: F,
    message: String,
    move_cursor_to_end: bool,
}

impl<F> FnValidator<F>
where
    F: Fn(&str) -> bool + Send + Sync,
{
    pub fn new(check: F, message: impl Into<String>) -> Self {
        Self {
            check,
            message: message.into(),
            move_cursor_to_end: false,
        }
    }

    /// Report failures at the end of the text instead of at offset zero.
    pub fn move_cursor_to_end(mut self, yes: bool) -> Self {
        self.move_cursor_to_end = yes;
        self
    }
}

impl<F> Validator for FnValidator<F>
where
    F: Fn(&str) -> bool + Send + Sync,
{
    fn validate(&self, document: &Document) -> Result<(), ValidationError> {
        if (self.check)(document.text()) {
            return Ok(());
        }
        let at = if self.move_cursor_to_end { document.text_len() } else { 0 };
        Err(ValidationError::new(at, self.message.clone()))
    }
}

impl<F> fmt::Debug for FnValidator<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnValidator").field("message", &self.message).finish_non_exhaustive()
    }
}
