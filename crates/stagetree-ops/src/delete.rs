//! File and directory deletion.

use std::fs;
use std::path::Path;

use stagetree_core::{EntryKind, FsError};

use crate::file_ops::{FileOps, require_entry};
use crate::operation::OperationType;

impl FileOps {
    /// Delete the regular file at `path`.
    ///
    /// Fails if nothing exists at `path` or if it is not a regular file;
    /// directories are never removed through this call.
    pub fn delete_file(&self, path: impl AsRef<Path>) -> Result<(), FsError> {
        let path = path.as_ref();
        self.report(delete_file(path), || OperationType::DeleteFile.describe(path))
    }

    /// Delete the directory at `path` and everything beneath it.
    ///
    /// A missing directory is success. Symbolic links inside the tree are
    /// removed as links; their targets are left alone. The first child that
    /// cannot be removed aborts the call, leaving the rest in place.
    pub fn delete_directory(&self, path: impl AsRef<Path>) -> Result<(), FsError> {
        let path = path.as_ref();
        self.report(delete_directory(path), || {
            OperationType::DeleteDirectory.describe(path)
        })
    }
}

fn delete_file(path: &Path) -> Result<(), FsError> {
    match require_entry(path)? {
        EntryKind::File => fs::remove_file(path).map_err(|e| FsError::io(path, e)),
        actual => Err(FsError::type_mismatch(path, EntryKind::File, actual)),
    }
}

pub(crate) fn delete_directory(path: &Path) -> Result<(), FsError> {
    match EntryKind::of(path).map_err(|e| FsError::io(path, e))? {
        None => Ok(()),
        Some(EntryKind::Directory) => delete_contents_then_self(path),
        Some(actual) => Err(FsError::type_mismatch(path, EntryKind::Directory, actual)),
    }
}

fn delete_contents_then_self(path: &Path) -> Result<(), FsError> {
    let entries = fs::read_dir(path).map_err(|e| FsError::io(path, e))?;
    for entry in entries {
        let entry = entry.map_err(|e| FsError::io(path, e))?;
        let child = entry.path();
        let file_type = entry.file_type().map_err(|e| FsError::io(&child, e))?;

        match EntryKind::from_file_type(file_type) {
            EntryKind::Directory => delete_contents_then_self(&child)?,
            kind => remove_leaf(&child, kind)?,
        }
    }

    fs::remove_dir(path).map_err(|e| FsError::io(path, e))
}

fn remove_leaf(path: &Path, kind: EntryKind) -> Result<(), FsError> {
    match fs::remove_file(path) {
        // Directory links on Windows must be removed as directories.
        Err(_) if cfg!(windows) && kind.is_symlink() => fs::remove_dir(path),
        other => other,
    }
    .map_err(|e| FsError::io(path, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use stagetree_core::{CapturingReporter, FsErrorKind};
    use tempfile::TempDir;

    #[test]
    fn test_delete_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("x.txt");
        fs::write(&path, "x").unwrap();

        FileOps::new().delete_file(&path).unwrap();
        assert!(!path.exists());
    }

    #[test]
    fn test_delete_file_refuses_directory() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join("dir");
        fs::create_dir(&dir).unwrap();

        let err = FileOps::with_reporter(CapturingReporter::new())
            .delete_file(&dir)
            .unwrap_err();
        assert_eq!(err.kind(), FsErrorKind::TypeMismatch);
        assert!(dir.is_dir());
    }

    #[test]
    fn test_delete_missing_file_fails() {
        let temp = TempDir::new().unwrap();
        let err = FileOps::with_reporter(CapturingReporter::new())
            .delete_file(temp.path().join("missing"))
            .unwrap_err();
        assert_eq!(err.kind(), FsErrorKind::NotFound);
    }

    #[test]
    fn test_delete_directory_recursive() {
        let temp = TempDir::new().unwrap();
        let root = temp.path().join("root");
        fs::create_dir_all(root.join("a/b/c")).unwrap();
        fs::write(root.join("a/one.txt"), "1").unwrap();
        fs::write(root.join("a/b/c/two.txt"), "2").unwrap();

        FileOps::new().delete_directory(&root).unwrap();
        assert!(!root.exists());
        assert!(temp.path().exists());
    }

    #[test]
    fn test_delete_missing_directory_is_success() {
        let temp = TempDir::new().unwrap();
        let reporter = CapturingReporter::new();
        FileOps::with_reporter(reporter.clone())
            .delete_directory(temp.path().join("never-existed"))
            .unwrap();
        assert!(reporter.is_empty());
    }

    #[test]
    fn test_delete_directory_refuses_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("x.txt");
        fs::write(&path, "x").unwrap();

        let err = FileOps::with_reporter(CapturingReporter::new())
            .delete_directory(&path)
            .unwrap_err();
        assert_eq!(err.kind(), FsErrorKind::TypeMismatch);
        assert!(path.exists());
    }

    #[cfg(unix)]
    #[test]
    fn test_delete_directory_leaves_link_targets() {
        let temp = TempDir::new().unwrap();
        let keep = temp.path().join("keep");
        fs::create_dir(&keep).unwrap();
        fs::write(keep.join("precious.txt"), "keep me").unwrap();

        let root = temp.path().join("root");
        fs::create_dir(&root).unwrap();
        std::os::unix::fs::symlink(&keep, root.join("link")).unwrap();

        FileOps::new().delete_directory(&root).unwrap();
        assert!(!root.exists());
        assert!(keep.join("precious.txt").exists());
    }

    #[cfg(unix)]
    #[test]
    fn test_delete_directory_through_link_with_trailing_slash() {
        let temp = TempDir::new().unwrap();
        let keep = temp.path().join("keep");
        fs::create_dir(&keep).unwrap();
        fs::write(keep.join("precious.txt"), "keep me").unwrap();
        let link = temp.path().join("link");
        std::os::unix::fs::symlink(&keep, &link).unwrap();

        let reporter = CapturingReporter::new();
        let err = FileOps::with_reporter(reporter.clone())
            .delete_directory(format!("{}/", link.display()))
            .unwrap_err();
        assert!(matches!(
            err,
            FsError::TypeMismatch {
                actual: EntryKind::Symlink,
                ..
            }
        ));
        assert!(keep.join("precious.txt").exists());
        assert!(fs::symlink_metadata(&link).is_ok());
        assert_eq!(reporter.messages().len(), 1);
    }

    #[cfg(unix)]
    #[test]
    fn test_delete_directory_stops_at_first_failing_child() {
        use std::os::unix::fs::PermissionsExt;

        let temp = TempDir::new().unwrap();
        let root = temp.path().join("root");
        let locked = root.join("locked");
        fs::create_dir_all(&locked).unwrap();
        fs::write(locked.join("stuck.txt"), "x").unwrap();
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o555)).unwrap();

        // Permission bits do not bind a privileged user.
        let canary = locked.join("writable");
        if fs::write(&canary, "").is_ok() {
            fs::remove_file(&canary).unwrap();
            fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();
            return;
        }

        let reporter = CapturingReporter::new();
        let result = FileOps::with_reporter(reporter.clone()).delete_directory(&root);
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();

        let err = result.unwrap_err();
        assert!(matches!(err, FsError::PermissionDenied { .. } | FsError::Io { .. }));
        assert_eq!(err.kind(), FsErrorKind::Io);
        assert!(root.exists());
        assert!(locked.join("stuck.txt").exists());
        assert_eq!(reporter.messages().len(), 1);
    }
}
