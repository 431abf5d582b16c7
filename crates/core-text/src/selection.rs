use std::sync::atomic::{AtomicBool, Ordering};

/// Shape of a selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SelectionType {
    /// Contiguous characters between anchor and cursor.
    #[default]
    Characters,
    /// Whole lines touched by the range.
    Lines,
    /// Rectangular column range across rows.
    Block,
}

/// Anchor of an active selection.
///
/// The anchor is not bounds-checked; range queries clamp it. Documents compare
/// selections by identity (`Arc::ptr_eq`), so this type has no `PartialEq`.
#[derive(Debug)]
pub struct SelectionState {
    original_cursor_position: isize,
    selection_type: SelectionType,
    shift_mode: AtomicBool,
}

impl SelectionState {
    pub fn new(original_cursor_position: isize, selection_type: SelectionType) -> Self {
        Self {
            original_cursor_position,
            selection_type,
            shift_mode: AtomicBool::new(false),
        }
    }

    pub fn original_cursor_position(&self) -> isize {
        self.original_cursor_position
    }

    pub fn selection_type(&self) -> SelectionType {
        self.selection_type
    }

    pub fn shift_mode(&self) -> bool {
        self.shift_mode.load(Ordering::Acquire)
    }

    /// One-way latch; there is no way to leave shift mode.
    pub fn enter_shift_mode(&self) {
        self.shift_mode.store(true, Ordering::Release);
    }

    /// Same selection with the anchor moved by `delta`.
    pub(crate) fn shifted(&self, delta: isize) -> Self {
        Self {
            original_cursor_position: self.original_cursor_position + delta,
            selection_type: self.selection_type,
            shift_mode: AtomicBool::new(self.shift_mode()),
        }
    }
}

impl Clone for SelectionState {
    fn clone(&self) -> Self {
        self.shifted(0)
    }
}

impl Default for SelectionState {
    fn default() -> Self {
        Self::new(0, SelectionType::Characters)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shift_mode_latches() {
        let s = SelectionState::new(-4, SelectionType::Block);
        assert!(!s.shift_mode());
        s.enter_shift_mode();
        s.enter_shift_mode();
        assert!(s.shift_mode());
        assert_eq!(s.original_cursor_position(), -4);
        let c = s.clone();
        assert!(c.shift_mode());
        assert_eq!(c.selection_type(), SelectionType::Block);
    }

    #[test]
    fn shifted_moves_anchor_only() {
        let s = SelectionState::new(3, SelectionType::Lines);
        let t = s.shifted(5);
        assert_eq!(t.original_cursor_position(), 8);
        assert_eq!(t.selection_type(), SelectionType::Lines);
        assert_eq!(SelectionState::default().selection_type(), SelectionType::Characters);
    }
}
