//! The creation log: a JSON-lines record of every object we created.
//!
//! ```text
//! {"row":0,"column":1,"type":"POLYANET"}
//! {"row":1,"column":0,"type":"SOLOON","color":"red"}
//! ```
//!
//! Appended to after each successful create. Cleanup reads it back and
//! rewrites it with only the entries it could not delete, so the file is a
//! work queue that shrinks as objects are removed.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

// Traits must be in scope for `.split()` on BufReader and `.write_all()` on File.
use io::{BufRead, Write};

use crate::model::GridObject;

/// Default file name, relative to the working directory.
pub const DEFAULT_LOG_FILE: &str = "megaverse_created.log";

/// Errors that can occur while reading or writing the creation log.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = core::result::Result<T, StorageError>;

/// One line of the log as read back from disk, with the bytes it was read
/// from. Rewrites copy those bytes back untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogLine {
    /// A well-formed record.
    Object { object: GridObject, raw: Vec<u8> },

    /// A line that doesn't decode to a valid object, including lines that
    /// aren't UTF-8.
    Unreadable { raw: Vec<u8>, reason: String },
}

impl LogLine {
    fn decode(raw: Vec<u8>) -> Self {
        match serde_json::from_slice(&raw) {
            Ok(object) => Self::Object { object, raw },
            Err(e) => Self::Unreadable {
                raw,
                reason: e.to_string(),
            },
        }
    }

    /// The decoded object, if the line held one.
    pub fn object(&self) -> Option<&GridObject> {
        match self {
            Self::Object { object, .. } => Some(object),
            Self::Unreadable { .. } => None,
        }
    }

    pub fn raw(&self) -> &[u8] {
        match self {
            Self::Object { raw, .. } | Self::Unreadable { raw, .. } => raw,
        }
    }
}

/// Handle to the creation log file.
#[derive(Debug, Clone)]
pub struct CreationLog {
    path: PathBuf,
}

impl CreationLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Appends one object as a new line, creating the file if needed.
    pub fn append(&self, object: &GridObject) -> Result<()> {
        let mut line = serde_json::to_string(object)?;
        line.push('\n');
        let mut file = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| self.io_error(e))?;
        file.write_all(line.as_bytes())
            .map_err(|e| self.io_error(e))?;
        Ok(())
    }

    /// Loads every line in file order.
    ///
    /// Returns `None` if the log doesn't exist. Blank lines are skipped. Only
    /// a failure to read the file is an error; a bad line is returned as
    /// [`LogLine::Unreadable`].
    pub fn load(&self) -> Result<Option<Vec<LogLine>>> {
        let file = match fs::File::open(&self.path) {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(self.io_error(e)),
        };
        let reader = io::BufReader::new(file);
        let mut lines = Vec::new();
        for raw in reader.split(b'\n') {
            let mut raw = raw.map_err(|e| self.io_error(e))?;
            if raw.last() == Some(&b'\r') {
                raw.pop();
            }
            if raw.iter().all(u8::is_ascii_whitespace) {
                continue;
            }
            lines.push(LogLine::decode(raw));
        }
        Ok(Some(lines))
    }

    /// Replaces the whole log with `lines`, each written back exactly as it
    /// was read. An empty slice leaves an empty file behind rather than
    /// removing it.
    ///
    /// Writes to a sibling temp file first and renames it over the log.
    pub fn rewrite(&self, lines: &[LogLine]) -> Result<()> {
        let mut contents = Vec::new();
        for line in lines {
            contents.extend_from_slice(line.raw());
            contents.push(b'\n');
        }

        let tmp = self.tmp_path();
        fs::write(&tmp, contents).map_err(|source| StorageError::Io {
            path: tmp.clone(),
            source,
        })?;
        fs::rename(&tmp, &self.path).map_err(|e| self.io_error(e))?;
        Ok(())
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(std::ffi::OsStr::to_os_string)
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    fn io_error(&self, source: io::Error) -> StorageError {
        StorageError::Io {
            path: self.path.clone(),
            source,
        }
    }
}
