//! Line sinks: destinations that accept one complete record per call.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use tracing::debug;

use crate::error::LogError;

/// Anything that can take a newline-terminated record.
///
/// Implementations serialize their own writes; a call must either write the
/// whole line or fail.
pub trait Sink: Send + Sync {
    fn write_line(&self, line: &str) -> io::Result<()>;

    /// Short name used in diagnostics when a write fails.
    fn label(&self) -> &str {
        "sink"
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    // A panic mid-write leaves at worst a torn line; keep accepting records.
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

// ---------------------------------------------------------------------------
// Generic writer
// ---------------------------------------------------------------------------

/// Wraps any `Write` behind a mutex, flushing after every line.
pub struct WriterSink<W> {
    label: String,
    writer: Mutex<W>,
}

impl<W: Write + Send> WriterSink<W> {
    pub fn new(label: impl Into<String>, writer: W) -> Self {
        Self {
            label: label.into(),
            writer: Mutex::new(writer),
        }
    }

    pub fn into_inner(self) -> W {
        self.writer.into_inner().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<W: Write + Send> Sink for WriterSink<W> {
    fn write_line(&self, line: &str) -> io::Result<()> {
        let mut writer = lock(&self.writer);
        writer.write_all(line.as_bytes())?;
        writer.flush()
    }

    fn label(&self) -> &str {
        &self.label
    }
}

// ---------------------------------------------------------------------------
// Standard streams
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Clone, Copy)]
pub struct StdoutSink;

impl Sink for StdoutSink {
    fn write_line(&self, line: &str) -> io::Result<()> {
        let mut out = io::stdout().lock();
        out.write_all(line.as_bytes())?;
        out.flush()
    }

    fn label(&self) -> &str {
        "stdout"
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct StderrSink;

impl Sink for StderrSink {
    fn write_line(&self, line: &str) -> io::Result<()> {
        let mut err = io::stderr().lock();
        err.write_all(line.as_bytes())?;
        err.flush()
    }

    fn label(&self) -> &str {
        "stderr"
    }
}

// ---------------------------------------------------------------------------
// File
// ---------------------------------------------------------------------------

/// Appends to a file, creating it (and its parent directories) on open.
pub struct FileSink {
    path: PathBuf,
    label: String,
    file: Mutex<File>,
}

impl FileSink {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, LogError> {
        let path = path.as_ref().to_path_buf();
        let open_err = |source| LogError::SinkOpen {
            path: path.display().to_string(),
            source,
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(open_err)?;
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(open_err)?;

        debug!(path = %path.display(), "Opened file sink");

        Ok(Self {
            label: path.display().to_string(),
            path,
            file: Mutex::new(file),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Sink for FileSink {
    fn write_line(&self, line: &str) -> io::Result<()> {
        let mut file = lock(&self.file);
        file.write_all(line.as_bytes())?;
        file.flush()
    }

    fn label(&self) -> &str {
        &self.label
    }
}

// ---------------------------------------------------------------------------
// In-memory
// ---------------------------------------------------------------------------

/// Keeps every line it receives. Handy for tests and for embedding callers
/// that forward records elsewhere.
#[derive(Debug, Default)]
pub struct MemorySink {
    lines: Mutex<Vec<String>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> Vec<String> {
        lock(&self.lines).clone()
    }

    pub fn len(&self) -> usize {
        lock(&self.lines).len()
    }

    pub fn is_empty(&self) -> bool {
        lock(&self.lines).is_empty()
    }

    /// Drain everything received so far.
    pub fn take(&self) -> Vec<String> {
        std::mem::take(&mut *lock(&self.lines))
    }
}

impl Sink for MemorySink {
    fn write_line(&self, line: &str) -> io::Result<()> {
        lock(&self.lines).push(line.to_string());
        Ok(())
    }

    fn label(&self) -> &str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_sink_collects_and_drains() {
        let sink = MemorySink::new();
        sink.write_line("one\n").unwrap();
        sink.write_line("two\n").unwrap();
        assert_eq!(sink.len(), 2);
        assert_eq!(sink.take(), vec!["one\n", "two\n"]);
        assert!(sink.is_empty());
    }

    #[test]
    fn test_writer_sink_writes_whole_lines() {
        let sink = WriterSink::new("buffer", Vec::new());
        sink.write_line("{\"a\":1}\n").unwrap();
        sink.write_line("{\"b\":2}\n").unwrap();
        assert_eq!(sink.label(), "buffer");
        assert_eq!(sink.into_inner(), b"{\"a\":1}\n{\"b\":2}\n");
    }

    #[test]
    fn test_file_sink_appends_and_creates_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("app.log");

        let sink = FileSink::open(&path).unwrap();
        sink.write_line("first\n").unwrap();
        drop(sink);

        let sink = FileSink::open(&path).unwrap();
        sink.write_line("second\n").unwrap();
        assert_eq!(sink.path(), path.as_path());

        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(contents, "first\nsecond\n");
    }

    #[test]
    fn test_file_sink_reports_open_failure() {
        let dir = tempfile::tempdir().unwrap();
        // A directory cannot be opened for appending.
        let err = FileSink::open(dir.path()).err().unwrap();
        assert!(matches!(err, LogError::SinkOpen { .. }));
    }
}
