//! Where log records go.
//!
//! Logs never touch stdout, which carries the protocol. They go to stderr
//! until the `LogFileName` option names a file, and back to stderr when the
//! option is cleared.

use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::Path;
use std::sync::{Arc, Mutex};

use tracing_subscriber::fmt::MakeWriter;

/// A switchable log destination, shared between the subscriber and the
/// protocol handler.
#[derive(Debug, Clone, Default)]
pub struct LogSink {
    file: Arc<Mutex<Option<File>>>,
}

impl LogSink {
    /// A sink writing to stderr.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append to `path` from now on, or return to stderr with `None`.
    ///
    /// On error the previous destination is kept.
    pub fn redirect(&self, path: Option<&Path>) -> io::Result<()> {
        let file = match path {
            Some(path) => Some(OpenOptions::new().create(true).append(true).open(path)?),
            None => None,
        };
        let mut current = self
            .file
            .lock()
            .map_err(|_| io::Error::other("log sink mutex poisoned"))?;
        *current = file;
        Ok(())
    }

    /// Whether records currently go to a file.
    pub fn is_redirected(&self) -> bool {
        self.file.lock().is_ok_and(|file| file.is_some())
    }
}

/// Writer handed out per record by [`LogSink`].
#[derive(Debug)]
pub struct LogWriter {
    file: Arc<Mutex<Option<File>>>,
}

impl LogWriter {
    fn with<T>(&self, op: impl FnOnce(&mut dyn Write) -> io::Result<T>) -> io::Result<T> {
        let mut file = self
            .file
            .lock()
            .map_err(|_| io::Error::other("log sink mutex poisoned"))?;
        match file.as_mut() {
            Some(file) => op(file),
            None => op(&mut io::stderr()),
        }
    }
}

impl Write for LogWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.with(|w| w.write(buf))
    }

    fn write_all(&mut self, buf: &[u8]) -> io::Result<()> {
        self.with(|w| w.write_all(buf))
    }

    fn flush(&mut self) -> io::Result<()> {
        self.with(|w| w.flush())
    }
}

impl<'a> MakeWriter<'a> for LogSink {
    type Writer = LogWriter;

    fn make_writer(&'a self) -> Self::Writer {
        LogWriter {
            file: Arc::clone(&self.file),
        }
    }
}
