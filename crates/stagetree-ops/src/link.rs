//! Symbolic link creation and copying.

use std::fs;
use std::io;
use std::path::Path;

use stagetree_core::{EntryKind, FsError};

use crate::file_ops::{FileOps, require_entry, require_vacant};
use crate::operation::OperationType;

impl FileOps {
    /// Create a symbolic link at `link` pointing to `target`.
    ///
    /// `target` is stored as given and may be relative (to the link's
    /// directory) or absolute. Fails if anything already exists at `link`.
    pub fn create_symbolic_link(
        &self,
        link: impl AsRef<Path>,
        target: impl AsRef<Path>,
    ) -> Result<(), FsError> {
        let (link, target) = (link.as_ref(), target.as_ref());
        let result = symlink(target, link).map_err(|e| FsError::io(link, e));
        self.report(result, || OperationType::CreateSymlink.describe(link))
    }

    /// Duplicate the symbolic link `src` at `dst` without following it.
    ///
    /// The new link stores the same unresolved target as `src`. Fails if
    /// `src` is not itself a link.
    pub fn copy_symbolic_link(
        &self,
        src: impl AsRef<Path>,
        dst: impl AsRef<Path>,
    ) -> Result<(), FsError> {
        let (src, dst) = (src.as_ref(), dst.as_ref());
        self.report(copy_symbolic_link(src, dst), || {
            OperationType::CopySymlink.describe_pair(src, dst)
        })
    }
}

pub(crate) fn copy_symbolic_link(src: &Path, dst: &Path) -> Result<(), FsError> {
    match require_entry(src)? {
        EntryKind::Symlink => {}
        actual => return Err(FsError::type_mismatch(src, EntryKind::Symlink, actual)),
    }
    require_vacant(dst)?;

    let target = fs::read_link(src).map_err(|e| FsError::io(src, e))?;
    symlink(&target, dst).map_err(|e| FsError::io(dst, e))
}

#[cfg(unix)]
fn symlink(target: &Path, link: &Path) -> io::Result<()> {
    std::os::unix::fs::symlink(target, link)
}

#[cfg(windows)]
fn symlink(target: &Path, link: &Path) -> io::Result<()> {
    use std::os::windows::fs::{symlink_dir, symlink_file};

    // Relative targets resolve against the link's directory.
    let resolved = match link.parent() {
        Some(parent) if target.is_relative() => parent.join(target),
        _ => target.to_path_buf(),
    };
    if resolved.is_dir() {
        symlink_dir(target, link)
    } else {
        symlink_file(target, link)
    }
}

#[cfg(not(any(unix, windows)))]
fn symlink(_target: &Path, _link: &Path) -> io::Result<()> {
    Err(io::Error::new(
        io::ErrorKind::Unsupported,
        "Symbolic links are unsupported on this platform",
    ))
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use stagetree_core::{CapturingReporter, FsErrorKind};
    use tempfile::TempDir;

    #[test]
    fn test_create_relative_link() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("target.txt"), "data").unwrap();
        let link = temp.path().join("link");

        FileOps::new().create_symbolic_link(&link, "target.txt").unwrap();
        assert_eq!(fs::read_link(&link).unwrap(), Path::new("target.txt"));
        assert_eq!(fs::read_to_string(&link).unwrap(), "data");
    }

    #[test]
    fn test_create_link_over_existing_fails() {
        let temp = TempDir::new().unwrap();
        let reporter = CapturingReporter::new();
        let link = temp.path().join("link");
        fs::write(&link, "occupied").unwrap();

        let err = FileOps::with_reporter(reporter.clone())
            .create_symbolic_link(&link, "anything")
            .unwrap_err();
        assert_eq!(err.kind(), FsErrorKind::AlreadyExists);
        assert!(reporter.messages()[0].contains("Failed to create symlink"));
    }

    #[test]
    fn test_copy_link_keeps_unresolved_target() {
        let temp = TempDir::new().unwrap();
        let src = temp.path().join("dangling");
        let dst = temp.path().join("copy");
        std::os::unix::fs::symlink("does/not/exist", &src).unwrap();

        FileOps::new().copy_symbolic_link(&src, &dst).unwrap();
        assert_eq!(fs::read_link(&dst).unwrap(), Path::new("does/not/exist"));
    }

    #[test]
    fn test_copy_link_rejects_regular_file() {
        let temp = TempDir::new().unwrap();
        let src = temp.path().join("file.txt");
        fs::write(&src, "not a link").unwrap();

        let err = FileOps::with_reporter(CapturingReporter::new())
            .copy_symbolic_link(&src, temp.path().join("copy"))
            .unwrap_err();
        assert!(matches!(
            err,
            FsError::TypeMismatch {
                expected: EntryKind::Symlink,
                actual: EntryKind::File,
                ..
            }
        ));
        assert!(!temp.path().join("copy").exists());
    }
}
