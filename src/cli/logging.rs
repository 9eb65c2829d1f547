use std::fs::File;
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use tracing_subscriber::fmt::writer::MakeWriter;

/// Writes log lines to stderr and, when configured, to a log file.
#[derive(Clone)]
pub(crate) struct LogWriter {
    file: Option<Arc<Mutex<File>>>,
}

impl LogWriter {
    pub(crate) fn new(path: Option<PathBuf>) -> io::Result<Self> {
        let file = match path {
            Some(path) => Some(Arc::new(Mutex::new(File::create(path)?))),
            None => None,
        };
        Ok(Self { file })
    }

    pub(crate) fn has_file(&self) -> bool {
        self.file.is_some()
    }
}

pub(crate) struct LogWriterGuard {
    file: Option<Arc<Mutex<File>>>,
}

impl<'a> MakeWriter<'a> for LogWriter {
    type Writer = LogWriterGuard;

    fn make_writer(&'a self) -> Self::Writer {
        LogWriterGuard {
            file: self.file.clone(),
        }
    }
}

fn lock_poisoned() -> io::Error {
    io::Error::other("log file lock poisoned")
}

impl Write for LogWriterGuard {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        io::stderr().write_all(buf)?;
        if let Some(file) = &self.file {
            let mut handle = file.lock().map_err(|_| lock_poisoned())?;
            handle.write_all(buf)?;
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        io::stderr().flush()?;
        if let Some(file) = &self.file {
            let mut handle = file.lock().map_err(|_| lock_poisoned())?;
            handle.flush()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tees_into_log_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("smoke.log");
        let writer = LogWriter::new(Some(path.clone())).unwrap();
        assert!(writer.has_file());

        let mut guard = writer.make_writer();
        guard.write_all(b"connected\n").unwrap();
        writer.make_writer().write_all(b"dropped t1\n").unwrap();
        guard.flush().unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(contents, "connected\ndropped t1\n");
    }

    #[test]
    fn stderr_only_without_path() {
        let writer = LogWriter::new(None).unwrap();
        assert!(!writer.has_file());
        assert_eq!(writer.make_writer().write(b"x").unwrap(), 1);
    }

    #[test]
    fn unwritable_path_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("smoke.log");
        assert!(LogWriter::new(Some(path)).is_err());
    }
}
