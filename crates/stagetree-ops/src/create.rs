//! Directory creation.

use std::fs;
use std::io;
use std::path::Path;

use stagetree_core::path::file_form;
use stagetree_core::{EntryKind, FsError};

use crate::file_ops::FileOps;
use crate::operation::OperationType;

impl FileOps {
    /// Create `path` and every missing parent, one segment at a time.
    ///
    /// An existing directory (or a link to one) is success. The first
    /// segment that cannot be created, or that exists as something other
    /// than a directory, aborts the call and is named in the error.
    pub fn create_directory(&self, path: impl AsRef<Path>) -> Result<(), FsError> {
        let path = path.as_ref();
        self.report(create_directory(path), || {
            OperationType::CreateDirectory.describe(path)
        })
    }
}

pub(crate) fn create_directory(path: &Path) -> Result<(), FsError> {
    let path = file_form(path);
    let mut segments: Vec<&Path> = path
        .ancestors()
        .filter(|segment| !segment.as_os_str().is_empty())
        .collect();
    segments.reverse();

    for segment in segments {
        match fs::metadata(segment) {
            Ok(metadata) if metadata.is_dir() => continue,
            Ok(metadata) => {
                return Err(FsError::type_mismatch(
                    segment,
                    EntryKind::Directory,
                    EntryKind::from_file_type(metadata.file_type()),
                ));
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => match fs::create_dir(segment) {
                Ok(()) => {
                    tracing::debug!(path = %segment.display(), "Created directory");
                }
                // Lost a race with another creator; fine if it made a directory.
                Err(e) if e.kind() == io::ErrorKind::AlreadyExists && segment.is_dir() => {}
                Err(e) => return Err(FsError::io(segment, e)),
            },
            Err(e) => return Err(FsError::io(segment, e)),
        }
    }

    Ok(())
}
