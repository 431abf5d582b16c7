//! Clipboard contract and an in-process kill ring.

use core_config::Config;
use core_text::ClipboardData;
use parking_lot::Mutex;
use std::collections::VecDeque;
use tracing::trace;

/// Default kill-ring capacity.
pub const KILL_RING_MAX: usize = 60;

/// Store for cut/copied text. The buffer produces [`ClipboardData`] values
/// and pastes them; key handlers move them in and out of a clipboard.
pub trait Clipboard: Send + Sync {
    fn set_data(&self, data: ClipboardData);

    /// Most recent data; empty when nothing was stored.
    fn get_data(&self) -> ClipboardData;

    fn set_text(&self, text: &str) {
        self.set_data(ClipboardData::new(text, Default::default()));
    }

    /// Make the next-older entry current (yank-pop). No-op by default.
    fn rotate(&self) {}
}

/// Kill ring: newest entry at the front, bounded to `max_size` entries.
#[derive(Debug)]
pub struct InMemoryClipboard {
    ring: Mutex<VecDeque<ClipboardData>>,
    max_size: usize,
}

impl Default for InMemoryClipboard {
    fn default() -> Self {
        Self::new(KILL_RING_MAX)
    }
}

impl InMemoryClipboard {
    pub fn new(max_size: usize) -> Self {
        Self {
            ring: Mutex::new(VecDeque::new()),
            max_size: max_size.max(1),
        }
    }

    /// Ring sized by the `[clipboard] ring_size` setting.
    pub fn from_config(config: &Config) -> Self {
        Self::new(config.kill_ring_size())
    }

    pub fn len(&self) -> usize {
        self.ring.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn max_size(&self) -> usize {
        self.max_size
    }
}

impl Clipboard for InMemoryClipboard {
    fn set_data(&self, data: ClipboardData) {
        let mut ring = self.ring.lock();
        ring.push_front(data);
        if ring.len() > self.max_size {
            ring.pop_back();
            trace!(target: "state.clipboard", max = self.max_size, "kill_ring_trimmed");
        }
    }

    fn get_data(&self) -> ClipboardData {
        self.ring.lock().front().cloned().unwrap_or_default()
    }

    fn rotate(&self) {
        let mut ring = self.ring.lock();
        if let Some(front) = ring.pop_front() {
            ring.push_back(front);
            trace!(target: "state.clipboard", len = ring.len(), "kill_ring_rotated");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_text::SelectionType;

    #[test]
    fn empty_ring_yields_empty_data() {
        let c = InMemoryClipboard::default();
        assert_eq!(c.get_data().text, "");
        c.rotate();
        assert!(c.is_empty());
    }

    #[test]
    fn newest_entry_wins_and_ring_is_bounded() {
        let c = InMemoryClipboard::new(2);
        c.set_text("a");
        c.set_text("b");
        c.set_data(ClipboardData::new("c\n", SelectionType::Lines));
        assert_eq!(c.len(), 2);
        let top = c.get_data();
        assert_eq!(top.text, "c\n");
        assert_eq!(top.selection_type, SelectionType::Lines);
    }

    #[test]
    fn ring_size_comes_from_config_file() {
        let tmp = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(tmp.path(), "[clipboard]\nring_size = 2\n").unwrap();
        let cfg = core_config::load_from(Some(tmp.path().to_path_buf())).unwrap();
        let c = InMemoryClipboard::from_config(&cfg);
        assert_eq!(c.max_size(), 2);
        for t in ["oldest", "middle", "newest"] {
            c.set_text(t);
        }
        assert_eq!(c.len(), 2);
        c.rotate();
        assert_eq!(c.get_data().text, "middle");
        // "oldest" was evicted, so rotation wraps back to the newest entry.
        c.rotate();
        assert_eq!(c.get_data().text, "newest");
    }

    #[test]
    fn default_ring_matches_config_default() {
        let c = InMemoryClipboard::from_config(&Config::default());
        assert_eq!(c.max_size(), KILL_RING_MAX);
    }

    #[test]
    fn rotate_cycles_to_older_entries() {
        let c = InMemoryClipboard::default();
        for t in ["one", "two", "three"] {
            c.set_text(t);
        }
        c.rotate();
        assert_eq!(c.get_data().text, "two");
        c.rotate();
        c.rotate();
        assert_eq!(c.get_data().text, "three");
    }
}
