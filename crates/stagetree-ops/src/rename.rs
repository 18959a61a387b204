//! Rename operations.

use std::fs;
use std::path::Path;

use stagetree_core::{EntryKind, FsError};

use crate::file_ops::{FileOps, require_entry, require_vacant};
use crate::operation::OperationType;

impl FileOps {
    /// Rename the regular file `current` to `new`.
    ///
    /// Fails if `current` is missing or not a file, or if anything already
    /// exists at `new`. No cross-filesystem fallback is attempted.
    pub fn rename_file(
        &self,
        current: impl AsRef<Path>,
        new: impl AsRef<Path>,
    ) -> Result<(), FsError> {
        let (current, new) = (current.as_ref(), new.as_ref());
        self.report(rename_entry(current, new, EntryKind::File), || {
            OperationType::RenameFile.describe_pair(current, new)
        })
    }

    /// Rename the directory `current` to `new`.
    ///
    /// Fails if `current` is missing or not a directory, or if anything
    /// already exists at `new`.
    pub fn rename_directory(
        &self,
        current: impl AsRef<Path>,
        new: impl AsRef<Path>,
    ) -> Result<(), FsError> {
        let (current, new) = (current.as_ref(), new.as_ref());
        self.report(rename_entry(current, new, EntryKind::Directory), || {
            OperationType::RenameDirectory.describe_pair(current, new)
        })
    }
}

fn rename_entry(current: &Path, new: &Path, expected: EntryKind) -> Result<(), FsError> {
    let actual = require_entry(current)?;
    if actual != expected {
        return Err(FsError::type_mismatch(current, expected, actual));
    }
    require_vacant(new)?;

    fs::rename(current, new).map_err(|e| FsError::io(current, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use stagetree_core::{CapturingReporter, FsErrorKind};
    use tempfile::TempDir;

    #[test]
    fn test_rename_file() {
        let temp = TempDir::new().unwrap();
        let current = temp.path().join("a.txt");
        let new = temp.path().join("b.txt");
        fs::write(&current, "content").unwrap();

        FileOps::new().rename_file(&current, &new).unwrap();
        assert!(!current.exists());
        assert_eq!(fs::read_to_string(&new).unwrap(), "content");
    }

    #[test]
    fn test_rename_directory() {
        let temp = TempDir::new().unwrap();
        let current = temp.path().join("dir");
        fs::create_dir(&current).unwrap();
        fs::write(current.join("inner.txt"), "x").unwrap();

        let new = temp.path().join("renamed");
        FileOps::new().rename_directory(&current, &new).unwrap();
        assert!(new.join("inner.txt").is_file());
    }

    #[test]
    fn test_rename_wrong_kind() {
        let temp = TempDir::new().unwrap();
        let ops = FileOps::with_reporter(CapturingReporter::new());
        let file = temp.path().join("a.txt");
        fs::write(&file, "x").unwrap();

        let err = ops.rename_directory(&file, temp.path().join("b")).unwrap_err();
        assert_eq!(err.kind(), FsErrorKind::TypeMismatch);

        let err = ops.rename_file(temp.path(), temp.path().join("b")).unwrap_err();
        assert_eq!(err.kind(), FsErrorKind::TypeMismatch);
    }

    #[test]
    fn test_rename_onto_existing_fails() {
        let temp = TempDir::new().unwrap();
        let reporter = CapturingReporter::new();
        let current = temp.path().join("a.txt");
        let new = temp.path().join("b.txt");
        fs::write(&current, "a").unwrap();
        fs::write(&new, "b").unwrap();

        let err = FileOps::with_reporter(reporter.clone())
            .rename_file(&current, &new)
            .unwrap_err();
        assert_eq!(err.kind(), FsErrorKind::AlreadyExists);
        assert_eq!(fs::read_to_string(&new).unwrap(), "b");
        assert!(current.exists());
        assert!(reporter.messages()[0].starts_with("Failed to rename file"));
    }

    #[test]
    fn test_rename_missing() {
        let temp = TempDir::new().unwrap();
        let err = FileOps::with_reporter(CapturingReporter::new())
            .rename_file(temp.path().join("nope"), temp.path().join("b"))
            .unwrap_err();
        assert_eq!(err.kind(), FsErrorKind::NotFound);
    }
}
