//! Single-entry filesystem operations.
//!
//! Every public operation classifies its target first, performs exactly one
//! filesystem mutation, and on failure hands one message to the configured
//! [`Reporter`] before returning the error.

use std::fmt;
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::Path;
use std::sync::Arc;

use stagetree_core::{EntryKind, FsError, Reporter, TracingReporter};

use crate::operation::OperationType;

/// Entry point for single-entry operations.
///
/// Cloning is cheap; clones share the same reporter.
#[derive(Clone)]
pub struct FileOps {
    reporter: Arc<dyn Reporter>,
}

impl FileOps {
    /// Create operations that report failures through `tracing`.
    pub fn new() -> Self {
        Self::with_reporter(TracingReporter)
    }

    /// Create operations that report failures to `reporter`.
    pub fn with_reporter(reporter: impl Reporter + 'static) -> Self {
        Self {
            reporter: Arc::new(reporter),
        }
    }

    /// The reporter failures are sent to.
    pub fn reporter(&self) -> &dyn Reporter {
        self.reporter.as_ref()
    }

    /// Send `result`'s error, if any, to the reporter.
    pub(crate) fn report<T>(
        &self,
        result: Result<T, FsError>,
        context: impl FnOnce() -> String,
    ) -> Result<T, FsError> {
        if let Err(err) = &result {
            self.reporter.error(&format!("{}: {err}", context()));
        }
        result
    }

    /// Read the whole file at `path`.
    ///
    /// An empty file yields an empty vector; every failure is an error.
    pub fn read_file(&self, path: impl AsRef<Path>) -> Result<Vec<u8>, FsError> {
        let path = path.as_ref();
        self.report(read_file(path), || OperationType::ReadFile.describe(path))
    }

    /// Read the whole file at `path` as UTF-8 text.
    pub fn read_file_to_string(&self, path: impl AsRef<Path>) -> Result<String, FsError> {
        let path = path.as_ref();
        let result = read_file(path).and_then(|bytes| {
            String::from_utf8(bytes).map_err(|e| FsError::Io {
                path: path.to_path_buf(),
                source: io::Error::new(io::ErrorKind::InvalidData, e),
            })
        });
        self.report(result, || OperationType::ReadFile.describe(path))
    }

    /// Create or truncate `path` and write `contents` to it.
    pub fn write_file(
        &self,
        path: impl AsRef<Path>,
        contents: impl AsRef<[u8]>,
    ) -> Result<(), FsError> {
        let path = path.as_ref();
        self.report(write_file(path, contents.as_ref()), || {
            OperationType::WriteFile.describe(path)
        })
    }
}

impl Default for FileOps {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for FileOps {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FileOps").finish_non_exhaustive()
    }
}

/// Kind of the entry at `path`, or `NotFound`.
pub(crate) fn require_entry(path: &Path) -> Result<EntryKind, FsError> {
    EntryKind::of(path)
        .map_err(|e| FsError::io(path, e))?
        .ok_or_else(|| FsError::NotFound {
            path: path.to_path_buf(),
        })
}

/// Fail with `AlreadyExists` if anything, even a dangling link, is at `path`.
pub(crate) fn require_vacant(path: &Path) -> Result<(), FsError> {
    match EntryKind::of(path).map_err(|e| FsError::io(path, e))? {
        Some(_) => Err(FsError::AlreadyExists {
            path: path.to_path_buf(),
        }),
        None => Ok(()),
    }
}

fn read_file(path: &Path) -> Result<Vec<u8>, FsError> {
    let metadata = fs::metadata(path).map_err(|e| FsError::io(path, e))?;
    if metadata.is_dir() {
        return Err(FsError::type_mismatch(
            path,
            EntryKind::File,
            EntryKind::Directory,
        ));
    }
    fs::read(path).map_err(|e| FsError::io(path, e))
}

fn write_file(path: &Path, contents: &[u8]) -> Result<(), FsError> {
    let file = File::create(path).map_err(|e| FsError::io(path, e))?;
    // The handle is closed when the writer drops, on success and failure alike.
    let mut writer = BufWriter::new(file);
    writer
        .write_all(contents)
        .and_then(|()| writer.flush())
        .map_err(|e| FsError::io(path, e))
}
