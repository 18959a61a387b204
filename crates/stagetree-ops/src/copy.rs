//! Single file copy.

use std::fs;
use std::path::Path;

use stagetree_core::{EntryKind, FsError};

use crate::file_ops::{FileOps, require_entry, require_vacant};
use crate::operation::OperationType;

impl FileOps {
    /// Copy the regular file `src` to `dst`, returning the bytes copied.
    ///
    /// Directories and symbolic links are rejected as a type mismatch
    /// before anything is copied. An existing entry at `dst` is never
    /// overwritten.
    pub fn copy_file(&self, src: impl AsRef<Path>, dst: impl AsRef<Path>) -> Result<u64, FsError> {
        let (src, dst) = (src.as_ref(), dst.as_ref());
        self.report(copy_file(src, dst), || {
            OperationType::CopyFile.describe_pair(src, dst)
        })
    }
}

pub(crate) fn copy_file(src: &Path, dst: &Path) -> Result<u64, FsError> {
    match require_entry(src)? {
        EntryKind::File => {}
        actual => return Err(FsError::type_mismatch(src, EntryKind::File, actual)),
    }
    require_vacant(dst)?;

    fs::copy(src, dst).map_err(|e| FsError::io(dst, e))
}
