//! Per-process output sinks
//!
//! Each supervised process gets a uniquely named file in the supervisor's
//! sink directory. The child's stdout and stderr are opened on it in append
//! mode; the file is unlinked when the sink is released.

use std::fs::{File, OpenOptions};
use std::path::Path;

use tempfile::NamedTempFile;
use tracing::{debug, warn};

use crate::SupervisorError;

/// Exclusively owned output sink of one supervised process
#[derive(Debug)]
pub struct OutputSink {
    name: String,
    file: NamedTempFile,
}

impl OutputSink {
    /// Create a fresh sink in `dir`, named after the program it collects output for
    pub(crate) fn create(dir: &Path, program: &str) -> Result<Self, SupervisorError> {
        debug!(?dir, %program, "OutputSink::create: called");
        let stem: String = Path::new(program)
            .file_name()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "process".to_string())
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
            .collect();

        let file = tempfile::Builder::new()
            .prefix(&format!("{}-", stem))
            .suffix(".out")
            .tempfile_in(dir)?;
        let name = format!("*{}*", stem);

        debug!(path = ?file.path(), %name, "OutputSink::create: sink created");
        Ok(Self { name, file })
    }

    /// Display name of the sink, e.g. `*make*`
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Location of the backing file
    pub fn path(&self) -> &Path {
        self.file.path()
    }

    /// Open an append-only handle to hand to the child as stdout or stderr
    pub(crate) fn writer(&self) -> Result<File, SupervisorError> {
        debug!(path = ?self.file.path(), "OutputSink::writer: called");
        Ok(OpenOptions::new().append(true).open(self.file.path())?)
    }

    /// Everything written to the sink so far
    pub fn contents(&self) -> Result<String, SupervisorError> {
        let bytes = std::fs::read(self.file.path())?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    /// Release the sink, removing its backing file
    pub(crate) fn release(self) {
        debug!(name = %self.name, path = ?self.file.path(), "OutputSink::release: called");
        if let Err(e) = self.file.close() {
            warn!(name = %self.name, error = %e, "Failed to remove output sink file");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    #[test]
    fn test_sink_name_from_program_path() {
        let dir = TempDir::new().unwrap();
        let sink = OutputSink::create(dir.path(), "/usr/bin/make").unwrap();

        assert_eq!(sink.name(), "*make*");
        assert!(sink.path().starts_with(dir.path()));
        assert!(sink.path().exists());
    }

    #[test]
    fn test_sinks_are_unique() {
        let dir = TempDir::new().unwrap();
        let a = OutputSink::create(dir.path(), "cargo").unwrap();
        let b = OutputSink::create(dir.path(), "cargo").unwrap();

        assert_ne!(a.path(), b.path());
    }

    #[test]
    fn test_writer_appends() {
        let dir = TempDir::new().unwrap();
        let sink = OutputSink::create(dir.path(), "echo").unwrap();

        sink.writer().unwrap().write_all(b"first\n").unwrap();
        sink.writer().unwrap().write_all(b"second\n").unwrap();

        assert_eq!(sink.contents().unwrap(), "first\nsecond\n");
    }

    #[test]
    fn test_release_removes_file() {
        let dir = TempDir::new().unwrap();
        let sink = OutputSink::create(dir.path(), "echo").unwrap();
        let path = sink.path().to_path_buf();

        sink.release();

        assert!(!path.exists());
    }
}
