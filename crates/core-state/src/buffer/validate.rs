use super::Buffer;
use crate::BufferError;
use crate::validation::{ValidationError, ValidationState};
use core_text::Document;
use tracing::{debug, warn};

/// Attempts before giving up on text that keeps changing under validation.
const VALIDATE_MAX_ATTEMPTS: usize = 16;

impl Buffer {
    /// Validate the current text once; later calls reuse the outcome until
    /// the text changes. On failure, `set_cursor` moves the cursor to the
    /// reported offset.
    pub fn validate(&self, set_cursor: bool) -> bool {
        for _ in 0..VALIDATE_MAX_ATTEMPTS {
            let origin = match self.pending_validation() {
                Ok(state) => return state == ValidationState::Valid,
                Err(origin) => origin,
            };
            let result = match &self.validator {
                Some(validator) => validator.validate(&origin),
                None => Ok(()),
            };
            if let Some(state) = self.install_validation(&origin, result, set_cursor) {
                return state == ValidationState::Valid;
            }
        }
        debug!(target: "state.validation", buffer = %self.name, "validation_abandoned");
        false
    }

    /// Like [`Buffer::validate`], awaiting the validator's async entry point
    /// on a spawned task. Must run inside a tokio runtime.
    ///
    /// A validator task that panics or is cancelled yields
    /// [`BufferError::Collaborator`]; an unresolved state becomes `Invalid`
    /// with the failure detail.
    pub async fn validate_async(&self) -> Result<ValidationState, BufferError> {
        let handle =
            tokio::runtime::Handle::try_current().map_err(|e| BufferError::Collaborator(e.to_string()))?;
        for _ in 0..VALIDATE_MAX_ATTEMPTS {
            let origin = match self.pending_validation() {
                Ok(state) => return Ok(state),
                Err(origin) => origin,
            };
            let Some(validator) = self.validator.clone() else {
                if let Some(state) = self.install_validation(&origin, Ok(()), false) {
                    return Ok(state);
                }
                continue;
            };
            let snapshot = origin.clone();
            let joined = handle
                .spawn(async move { validator.validate_async(&snapshot).await })
                .await;
            match joined {
                Ok(result) => {
                    if let Some(state) = self.install_validation(&origin, result, false) {
                        return Ok(state);
                    }
                }
                Err(e) => {
                    let detail = e.to_string();
                    warn!(target: "state.validation", buffer = %self.name, error = %detail, "validator_task_failed");
                    self.transact(|tx| {
                        if tx.st.validation_state == ValidationState::Unknown && tx.doc().text() == origin.text() {
                            tx.st.validation_state = ValidationState::Invalid;
                            tx.st.validation_error = Some(ValidationError::new(0, detail.clone()));
                        }
                    });
                    return Err(BufferError::Collaborator(detail));
                }
            }
        }
        debug!(target: "state.validation", buffer = %self.name, "validation_abandoned");
        Ok(ValidationState::Unknown)
    }

    /// Validate and, if valid, accept: run the accept handler, append the
    /// text to history and reset unless the handler asked to keep it.
    pub fn validate_and_handle(&self) -> bool {
        if !self.validate(true) {
            return false;
        }
        let keep_text = self.accept_handler.as_ref().is_some_and(|handler| handler(self));
        self.append_to_history();
        if !keep_text {
            self.reset(None, false);
        }
        debug!(target: "state.validation", buffer = %self.name, keep_text, "accepted");
        true
    }

    /// The resolved state, or the document still waiting for a verdict.
    fn pending_validation(&self) -> Result<ValidationState, Document> {
        let st = self.state.lock();
        match st.validation_state {
            ValidationState::Unknown => Err(st.document.clone()),
            resolved => Ok(resolved),
        }
    }

    /// Record `result` for `origin`. `None` means the text moved on and the
    /// verdict was dropped.
    fn install_validation(
        &self,
        origin: &Document,
        result: Result<(), ValidationError>,
        set_cursor: bool,
    ) -> Option<ValidationState> {
        self.transact(|tx| {
            if tx.doc().text() != origin.text() {
                debug!(target: "state.validation", buffer = %self.name, "validation_stale");
                return None;
            }
            if tx.st.validation_state != ValidationState::Unknown {
                return Some(tx.st.validation_state);
            }
            match result {
                Ok(()) => {
                    tx.st.validation_state = ValidationState::Valid;
                    tx.st.validation_error = None;
                }
                Err(error) => {
                    debug!(target: "state.validation", buffer = %self.name, offset = error.cursor_position, "invalid");
                    if set_cursor {
                        tx.set_cursor(error.cursor_position);
                    }
                    tx.st.validation_state = ValidationState::Invalid;
                    tx.st.validation_error = Some(error);
                }
            }
            Some(tx.st.validation_state)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::{History, InMemoryHistory};
    use crate::validation::{FnValidator, Validator};
    use async_trait::async_trait;
    use pretty_assertions::assert_eq;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Counting {
        calls: AtomicUsize,
    }

    impl Validator for Counting {
        fn validate(&self, document: &Document) -> Result<(), ValidationError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if document.text().contains(' ') {
                Err(ValidationError::new(99, "no spaces"))
            } else {
                Ok(())
            }
        }
    }

    fn counting(text: &str) -> (Buffer, Arc<Counting>) {
        let validator = Arc::new(Counting {
            calls: AtomicUsize::new(0),
        });
        let b = Buffer::builder()
            .validator(validator.clone())
            .document(Document::with_cursor(text, 0).unwrap())
            .build();
        (b, validator)
    }

    #[test]
    fn outcome_is_memoized_until_text_changes() {
        let (b, v) = counting("ok");
        assert!(b.validate(false));
        assert!(b.validate(false));
        assert_eq!(v.calls.load(Ordering::SeqCst), 1);
        b.set_cursor_position(1);
        assert!(b.validate(false));
        assert_eq!(v.calls.load(Ordering::SeqCst), 1);
        b.set_text("not ok").unwrap();
        assert_eq!(b.validation_state(), ValidationState::Unknown);
        assert!(!b.validate(false));
        assert_eq!(v.calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn failure_moves_cursor_clamped() {
        let (b, _) = counting("a b");
        assert!(!b.validate(true));
        assert_eq!(b.cursor_position(), 3);
        assert_eq!(b.validation_state(), ValidationState::Invalid);
        assert_eq!(b.validation_error().unwrap().message, "no spaces");
    }

    #[test]
    fn no_validator_is_always_valid() {
        let b = Buffer::new(Document::new("anything"));
        assert!(b.validate(true));
        assert_eq!(b.validation_state(), ValidationState::Valid);
    }

    #[test]
    fn accept_resets_and_appends_history() {
        let history = Arc::new(InMemoryHistory::new());
        let b = Buffer::builder()
            .history(history.clone())
            .validator(Arc::new(FnValidator::new(|t: &str| !t.is_empty(), "empty")))
            .build();
        assert!(!b.validate_and_handle());
        b.set_text("ls -la").unwrap();
        assert!(b.validate_and_handle());
        assert_eq!(b.text(), "");
        assert_eq!(history.load(), vec!["ls -la".to_string()]);
    }

    #[test]
    fn accept_handler_can_keep_text() {
        let b = Buffer::builder()
            .document(Document::new("keep me"))
            .accept_handler(|buf: &Buffer| buf.text().starts_with("keep"))
            .build();
        assert!(b.validate_and_handle());
        assert_eq!(b.text(), "keep me");
    }

    struct Panicking;

    #[async_trait]
    impl Validator for Panicking {
        fn validate(&self, _: &Document) -> Result<(), ValidationError> {
            Ok(())
        }

        async fn validate_async(&self, _: &Document) -> Result<(), ValidationError> {
            panic!("validator blew up");
        }
    }

    #[tokio::test]
    async fn async_validation_memoizes() {
        let (b, v) = counting("fine");
        assert_eq!(b.validate_async().await.unwrap(), ValidationState::Valid);
        assert_eq!(b.validate_async().await.unwrap(), ValidationState::Valid);
        assert_eq!(v.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn panicking_validator_surfaces_as_collaborator_error() {
        let b = Buffer::builder()
            .document(Document::new("x"))
            .validator(Arc::new(Panicking))
            .build();
        let err = b.validate_async().await.unwrap_err();
        assert!(matches!(err, BufferError::Collaborator(_)));
        assert_eq!(b.validation_state(), ValidationState::Invalid);
        assert_eq!(b.validation_error().unwrap().cursor_position, 0);
    }
}
