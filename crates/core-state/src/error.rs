use core_text::TextError;
use thiserror::Error;

/// Failures surfaced by [`crate::Buffer`] operations.
///
/// Not-found outcomes (no match, no history entry, no active completion) are
/// never errors; they leave the buffer unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BufferError {
    /// The buffer is read-only and the operation would change its text.
    #[error("edit rejected: buffer is read-only")]
    ReadOnly,
    #[error("invalid region {from}..{to}: start must precede end")]
    InvalidRegion { from: usize, to: usize },
    #[error(transparent)]
    Text(#[from] TextError),
    /// An injected collaborator (validator task, runtime) failed.
    #[error("collaborator failed: {0}")]
    Collaborator(String),
}

impl BufferError {
    /// True for the "edit rejected" case callers usually report to the user.
    pub fn is_read_only(&self) -> bool {
        matches!(self, BufferError::ReadOnly)
    }
}
