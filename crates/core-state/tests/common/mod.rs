#![allow(dead_code)] // Shared across integration tests; each test binary uses a subset of helpers.

use core_state::{Buffer, BufferOptions, Condition, History, InMemoryHistory};
use core_text::Document;
use std::io::Write;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::Level;
use tracing::subscriber::with_default;
use tracing_subscriber::fmt::MakeWriter;

pub fn history_of(entries: &[&str]) -> Arc<InMemoryHistory> {
    Arc::new(InMemoryHistory::with_entries(entries.iter().copied()))
}

pub fn shell_buffer(history: Arc<dyn History>) -> Buffer {
    Buffer::builder()
        .name("shell")
        .history(history)
        .options(BufferOptions {
            multiline: Condition::constant(false),
            ..BufferOptions::default()
        })
        .build()
}

pub fn multiline(text: &str, cursor: usize) -> Buffer {
    Buffer::new(Document::with_cursor(text, cursor).unwrap())
}

/// True when `0 <= cursor <= len(text)` for a consistent snapshot.
pub fn cursor_in_bounds(buffer: &Buffer) -> bool {
    let doc = buffer.document();
    doc.cursor_position() <= doc.text().chars().count()
}

#[derive(Clone)]
struct BufferWriter {
    inner: Arc<Mutex<Vec<u8>>>,
}

struct LockedWriter<'a> {
    guard: MutexGuard<'a, Vec<u8>>,
}

impl Write for LockedWriter<'_> {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.guard.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for BufferWriter {
    type Writer = LockedWriter<'a>;

    fn make_writer(&'a self) -> Self::Writer {
        LockedWriter {
            guard: self.inner.lock().expect("log buffer poisoned"),
        }
    }
}

/// Run `f` under a thread-local fmt subscriber and return what it logged.
pub fn capture<F: FnOnce()>(level: Level, f: F) -> String {
    let inner = Arc::new(Mutex::new(Vec::new()));
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(true)
        .with_ansi(false)
        .without_time()
        .with_writer(BufferWriter { inner: inner.clone() })
        .finish();
    with_default(subscriber, f);
    let out = inner.lock().unwrap().clone();
    String::from_utf8(out).unwrap()
}
