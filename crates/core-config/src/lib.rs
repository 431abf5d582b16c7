//! Configuration loading and parsing.
//!
//! Parses `lineedit.toml` (or an override path supplied by the embedding
//! application) into static editing defaults: buffer behaviour flags, the
//! diagnostic preview length, the undo depth and the kill-ring size. Every
//! field is optional; unknown fields are ignored so newer files still load
//! with older builds. Out-of-range values are clamped by `Config::sanitize`.

use anyhow::Result;
use serde::Deserialize;
use std::{fs, path::PathBuf};
use tracing::{info, warn};

/// File name looked up in the working directory, then in the platform config dir.
pub const CONFIG_FILE_NAME: &str = "lineedit.toml";

/// Shortest preview that still leaves room for the ellipsis.
pub const MIN_PREVIEW_LEN: usize = 4;

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct BufferConfig {
    #[serde(default = "BufferConfig::default_multiline")]
    pub multiline: bool,
    #[serde(default)]
    pub read_only: bool,
    #[serde(default)]
    pub complete_while_typing: bool,
    #[serde(default)]
    pub validate_while_typing: bool,
    #[serde(default)]
    pub enable_history_search: bool,
    #[serde(default = "BufferConfig::default_preview_len")]
    pub preview_len: usize,
}

impl Default for BufferConfig {
    fn default() -> Self {
        Self {
            multiline: Self::default_multiline(),
            read_only: false,
            complete_while_typing: false,
            validate_while_typing: false,
            enable_history_search: false,
            preview_len: Self::default_preview_len(),
        }
    }
}

impl BufferConfig {
    const fn default_multiline() -> bool {
        true
    }
    const fn default_preview_len() -> usize {
        15
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct UndoConfig {
    #[serde(default = "UndoConfig::default_limit")]
    pub limit: usize,
}

impl Default for UndoConfig {
    fn default() -> Self {
        Self {
            limit: Self::default_limit(),
        }
    }
}

impl UndoConfig {
    const fn default_limit() -> usize {
        200
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct ClipboardConfig {
    #[serde(default = "ClipboardConfig::default_ring_size")]
    pub ring_size: usize,
}

impl Default for ClipboardConfig {
    fn default() -> Self {
        Self {
            ring_size: Self::default_ring_size(),
        }
    }
}

impl ClipboardConfig {
    const fn default_ring_size() -> usize {
        60
    }
}

#[derive(Debug, Deserialize, Default, Clone, PartialEq, Eq)]
pub struct ConfigFile {
    #[serde(default)]
    pub buffer: BufferConfig,
    #[serde(default)]
    pub undo: UndoConfig,
    #[serde(default)]
    pub clipboard: ClipboardConfig,
}

#[derive(Debug, Clone, Default)]
pub struct Config {
    pub raw: Option<String>, // original file string (optional)
    pub file: ConfigFile,    // parsed (or default) data
}

/// Best-effort config path following platform conventions (XDG / AppData Roaming).
pub fn discover() -> PathBuf {
    let local = PathBuf::from(CONFIG_FILE_NAME);
    if local.exists() {
        return local;
    }
    if let Some(dir) = dirs::config_dir() {
        return dir.join("lineedit").join(CONFIG_FILE_NAME);
    }
    PathBuf::from(CONFIG_FILE_NAME)
}

/// Load configuration from `path` (or [`discover`]). A missing or malformed
/// file yields the defaults.
pub fn load_from(path: Option<PathBuf>) -> Result<Config> {
    let path = path.unwrap_or_else(discover);
    let Ok(content) = fs::read_to_string(&path) else {
        return Ok(Config::default());
    };
    let mut cfg = match toml::from_str::<ConfigFile>(&content) {
        Ok(file) => Config {
            raw: Some(content),
            file,
        },
        Err(e) => {
            warn!(target: "config", path = %path.display(), error = %e, "config_parse_failed");
            return Ok(Config::default());
        }
    };
    cfg.sanitize();
    Ok(cfg)
}

impl Config {
    /// Clamp values that would make the dependent components misbehave.
    /// Returns true when anything changed.
    pub fn sanitize(&mut self) -> bool {
        let mut changed = false;
        let preview = self.file.buffer.preview_len;
        if preview < MIN_PREVIEW_LEN {
            self.file.buffer.preview_len = MIN_PREVIEW_LEN;
            info!(target: "config", raw = preview, clamped = MIN_PREVIEW_LEN, "preview_len_clamped");
            changed = true;
        }
        if self.file.undo.limit == 0 {
            self.file.undo.limit = 1;
            info!(target: "config", raw = 0, clamped = 1, "undo_limit_clamped");
            changed = true;
        }
        if self.file.clipboard.ring_size == 0 {
            self.file.clipboard.ring_size = 1;
            info!(target: "config", raw = 0, clamped = 1, "ring_size_clamped");
            changed = true;
        }
        changed
    }

    pub fn buffer(&self) -> &BufferConfig {
        &self.file.buffer
    }

    pub fn undo_limit(&self) -> usize {
        self.file.undo.limit
    }

    pub fn kill_ring_size(&self) -> usize {
        self.file.clipboard.ring_size
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::path::PathBuf;
    use std::sync::{Arc, Mutex, MutexGuard};
    use tracing::Level;
    use tracing::subscriber::with_default;
    use tracing_subscriber::fmt::MakeWriter;

    #[derive(Clone)]
    struct BufferWriter {
        inner: Arc<Mutex<Vec<u8>>>,
    }

    impl BufferWriter {
        fn new() -> (Self, Arc<Mutex<Vec<u8>>>) {
            let buf = Arc::new(Mutex::new(Vec::new()));
            (Self { inner: buf.clone() }, buf)
        }
    }

    struct LockedWriter<'a> {
        guard: MutexGuard<'a, Vec<u8>>,
    }

    impl<'a> Write for LockedWriter<'a> {
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

    fn capture<F: FnOnce()>(level: Level, f: F) -> String {
        let (writer, buffer) = BufferWriter::new();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(level)
            .with_target(true)
            .with_ansi(false)
            .without_time()
            .with_writer(writer)
            .finish();
        with_default(subscriber, f);
        let out = buffer.lock().unwrap().clone();
        String::from_utf8(out).unwrap()
    }

    fn write_config(body: &str) -> tempfile::NamedTempFile {
        let tmp = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(tmp.path(), body).unwrap();
        tmp
    }

    #[test]
    fn default_config_when_missing_file() {
        let cfg = load_from(Some(PathBuf::from("__nonexistent_hopefully__.toml"))).unwrap();
        assert!(cfg.raw.is_none());
        assert!(cfg.buffer().multiline);
        assert!(!cfg.buffer().read_only);
        assert_eq!(cfg.buffer().preview_len, 15);
        assert_eq!(cfg.undo_limit(), 200);
        assert_eq!(cfg.kill_ring_size(), 60);
    }

    #[test]
    fn parses_buffer_section() {
        let tmp = write_config(
            "[buffer]\nmultiline = false\ncomplete_while_typing = true\nenable_history_search = true\npreview_len = 30\n",
        );
        let cfg = load_from(Some(tmp.path().to_path_buf())).unwrap();
        assert!(!cfg.buffer().multiline);
        assert!(cfg.buffer().complete_while_typing);
        assert!(cfg.buffer().enable_history_search);
        assert!(!cfg.buffer().validate_while_typing);
        assert_eq!(cfg.buffer().preview_len, 30);
        assert!(cfg.raw.is_some());
    }

    #[test]
    fn parses_undo_and_clipboard_sections() {
        let tmp = write_config("[undo]\nlimit = 5\n[clipboard]\nring_size = 3\n");
        let cfg = load_from(Some(tmp.path().to_path_buf())).unwrap();
        assert_eq!(cfg.undo_limit(), 5);
        assert_eq!(cfg.kill_ring_size(), 3);
        assert_eq!(cfg.file.buffer, BufferConfig::default());
    }

    #[test]
    fn unknown_fields_are_ignored() {
        let tmp = write_config("[buffer]\nread_only = true\nfuture_knob = 1\n[render]\nx = 2\n");
        let cfg = load_from(Some(tmp.path().to_path_buf())).unwrap();
        assert!(cfg.buffer().read_only);
    }

    #[test]
    fn parse_failure_falls_back_and_warns() {
        let tmp = write_config("[buffer\nmultiline = ");
        let path = tmp.path().to_path_buf();
        let mut result = None;
        let log = capture(Level::WARN, || {
            result = Some(load_from(Some(path)).unwrap());
        });
        let cfg = result.unwrap();
        assert!(cfg.raw.is_none());
        assert_eq!(cfg.undo_limit(), 200);
        assert!(log.contains("WARN config:"));
        assert!(log.contains("config_parse_failed"));
    }

    #[test]
    fn clamping_logs_under_config_target() {
        let tmp = write_config("[buffer]\npreview_len = 1\n[undo]\nlimit = 0\n");
        let path = tmp.path().to_path_buf();
        let mut result = None;
        let log = capture(Level::INFO, || {
            result = Some(load_from(Some(path)).unwrap());
        });
        let cfg = result.unwrap();
        assert_eq!(cfg.buffer().preview_len, MIN_PREVIEW_LEN);
        assert_eq!(cfg.undo_limit(), 1);
        assert!(log.contains("INFO config:"));
        assert!(log.contains("preview_len_clamped"));
        assert!(log.contains("undo_limit_clamped"));
    }

    #[test]
    fn sanitize_is_idempotent() {
        let mut cfg = Config::default();
        assert!(!cfg.sanitize());
        cfg.file.clipboard.ring_size = 0;
        assert!(cfg.sanitize());
        assert!(!cfg.sanitize());
        assert_eq!(cfg.kill_ring_size(), 1);
    }
}
