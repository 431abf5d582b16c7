use core_text::Document;
use std::sync::Arc;
use tracing::trace;

/// Default number of snapshots retained in undo history.
pub const UNDO_HISTORY_MAX: usize = 200;

/// Text and cursor captured by [`UndoEngine::save`]. Selection is not kept.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EditSnapshot {
    pub text: Arc<str>,
    pub cursor_position: usize,
}

impl EditSnapshot {
    fn of(doc: &Document) -> Self {
        Self {
            text: doc.text_arc().clone(),
            cursor_position: doc.cursor_position(),
        }
    }

    fn same_text(&self, doc: &Document) -> bool {
        Arc::ptr_eq(&self.text, doc.text_arc()) || *self.text == *doc.text()
    }

    fn into_document(self) -> Document {
        Document::with_cursor_clamped(self.text.to_string(), self.cursor_position)
    }
}

/// Explicit-checkpoint undo/redo stacks.
///
/// Snapshots are only taken when the owner calls [`UndoEngine::save`]; edits
/// themselves never record anything.
#[derive(Debug)]
pub struct UndoEngine {
    undo_stack: Vec<EditSnapshot>,
    redo_stack: Vec<EditSnapshot>,
    limit: usize,
    /// Saves that only refreshed the cursor of an identical top snapshot.
    snapshots_skipped: u64,
}

impl Default for UndoEngine {
    fn default() -> Self {
        Self::new(UNDO_HISTORY_MAX)
    }
}

impl UndoEngine {
    pub fn new(limit: usize) -> Self {
        Self {
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            limit: limit.max(1),
            snapshots_skipped: 0,
        }
    }

    pub fn undo_depth(&self) -> usize {
        self.undo_stack.len()
    }
    pub fn redo_depth(&self) -> usize {
        self.redo_stack.len()
    }
    pub fn snapshots_skipped(&self) -> u64 {
        self.snapshots_skipped
    }
    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Record `current`. When the top snapshot already holds the same text
    /// only its cursor is refreshed.
    pub fn save(&mut self, current: &Document, clear_redo: bool) {
        if let Some(last) = self.undo_stack.last_mut()
            && last.same_text(current)
        {
            last.cursor_position = current.cursor_position();
            self.snapshots_skipped += 1;
            trace!(target: "state.undo", undo_depth = self.undo_stack.len(), redo_depth = self.redo_stack.len(), "snapshot_dedupe_skip");
        } else {
            self.undo_stack.push(EditSnapshot::of(current));
            trace!(target: "state.undo", undo_depth = self.undo_stack.len(), redo_depth = self.redo_stack.len(), lines = current.line_count(), "push_snapshot");
            if self.undo_stack.len() > self.limit {
                let _ = self.undo_stack.remove(0);
                trace!(target: "state.undo", "undo_stack_trimmed");
            }
        }
        if clear_redo && !self.redo_stack.is_empty() {
            self.redo_stack.clear();
            trace!(target: "state.undo", "redo_stack_cleared_on_new_edit");
        }
    }

    /// Pop snapshots until one differs in text from `current`, park `current`
    /// on the redo stack and return the snapshot to restore.
    pub fn undo(&mut self, current: &Document) -> Option<Document> {
        while let Some(snap) = self.undo_stack.pop() {
            trace!(target: "state.undo", undo_depth = self.undo_stack.len(), redo_depth = self.redo_stack.len(), "undo_pop");
            if snap.same_text(current) {
                continue;
            }
            self.redo_stack.push(EditSnapshot::of(current));
            trace!(target: "state.undo", redo_depth = self.redo_stack.len(), "redo_push_from_undo");
            return Some(snap.into_document());
        }
        None
    }

    /// Save `current` (keeping the redo stack) and return the newest redo snapshot.
    pub fn redo(&mut self, current: &Document) -> Option<Document> {
        if self.redo_stack.is_empty() {
            return None;
        }
        self.save(current, false);
        trace!(target: "state.undo", undo_depth = self.undo_stack.len(), "undo_push_from_redo");
        let next = self.redo_stack.pop()?;
        trace!(target: "state.undo", redo_depth = self.redo_stack.len(), undo_depth = self.undo_stack.len(), "redo_pop");
        Some(next.into_document())
    }

    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn doc(text: &str, cursor: usize) -> Document {
        Document::with_cursor(text, cursor).unwrap()
    }

    #[test]
    fn identical_text_only_refreshes_cursor() {
        let mut u = UndoEngine::default();
        u.save(&doc("abc", 0), true);
        u.save(&doc("abc", 2), true);
        assert_eq!(u.undo_depth(), 1);
        assert_eq!(u.snapshots_skipped(), 1);
        let restored = u.undo(&doc("abcd", 4)).unwrap();
        assert_eq!(restored.cursor_position(), 2);
    }

    #[test]
    fn undo_skips_snapshots_equal_to_current() {
        let mut u = UndoEngine::default();
        u.save(&doc("a", 1), true);
        u.save(&doc("ab", 2), true);
        // Current text matches the top, so undo goes one further.
        let restored = u.undo(&doc("ab", 2)).unwrap();
        assert_eq!(restored.text(), "a");
        assert_eq!(u.undo_depth(), 0);
        assert_eq!(u.redo_depth(), 1);
    }

    #[test]
    fn undo_on_empty_is_none() {
        let mut u = UndoEngine::default();
        assert!(u.undo(&doc("x", 0)).is_none());
        u.save(&doc("x", 0), true);
        assert!(u.undo(&doc("x", 1)).is_none());
        assert_eq!(u.redo_depth(), 0);
    }

    #[test]
    fn redo_round_trip() {
        let mut u = UndoEngine::default();
        u.save(&doc("one", 3), true);
        let current = doc("one two", 7);
        let back = u.undo(&current).unwrap();
        assert_eq!(back.text(), "one");
        let fwd = u.redo(&back).unwrap();
        assert_eq!(fwd.text(), "one two");
        assert_eq!(fwd.cursor_position(), 7);
        assert_eq!(u.undo_depth(), 1);
        assert!(u.redo(&fwd).is_none());
    }

    #[test]
    fn new_save_clears_redo() {
        let mut u = UndoEngine::default();
        u.save(&doc("a", 1), true);
        let _ = u.undo(&doc("ab", 2));
        assert_eq!(u.redo_depth(), 1);
        u.save(&doc("a", 1), true);
        assert_eq!(u.redo_depth(), 0);
    }

    #[test]
    fn limit_trims_oldest() {
        let mut u = UndoEngine::new(3);
        for t in ["a", "b", "c", "d"] {
            u.save(&doc(t, 0), true);
        }
        assert_eq!(u.undo_depth(), 3);
        let mut seen = Vec::new();
        let mut cur = doc("z", 0);
        while let Some(d) = u.undo(&cur) {
            seen.push(d.text().to_string());
            cur = d;
        }
        assert_eq!(seen, vec!["d", "c", "b"]);
    }
}
