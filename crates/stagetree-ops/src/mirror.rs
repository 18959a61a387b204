//! Recursive tree copy and delete.

use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use stagetree_core::path::directory_string;
use stagetree_core::{EntryKind, FsError, MirrorOptions, Reporter, is_ignored};

use crate::copy::copy_file;
use crate::create::create_directory;
use crate::delete::delete_directory;
use crate::file_ops::FileOps;
use crate::link::copy_symbolic_link;
use crate::operation::OperationType;

/// Counts for one successful mirror run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MirrorSummary {
    /// Directories created or reused in the destination, root included.
    pub directories: u64,
    /// Regular files copied.
    pub files: u64,
    /// Symbolic links duplicated.
    pub links: u64,
    /// Source entries skipped by the ignore-set.
    pub skipped: u64,
    /// Bytes copied across all files.
    pub bytes_copied: u64,
}

impl fmt::Display for MirrorSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "directories={} files={} links={} skipped={} bytes={}",
            self.directories, self.files, self.links, self.skipped, self.bytes_copied
        )
    }
}

/// Copies and deletes whole directory trees.
///
/// Each entry is classified before it is touched, with the symbolic link
/// check first: links are duplicated as links and never descended into,
/// directories are recreated and walked, everything else is copied as a
/// file. The first failing entry aborts the run; entries already copied are
/// left in place.
#[derive(Debug, Clone, Default)]
pub struct TreeMirror {
    ops: FileOps,
}

impl TreeMirror {
    /// Create a mirror that reports failures through `tracing`.
    pub fn new() -> Self {
        Self::with_ops(FileOps::new())
    }

    /// Create a mirror that reports failures to `reporter`.
    pub fn with_reporter(reporter: impl Reporter + 'static) -> Self {
        Self::with_ops(FileOps::with_reporter(reporter))
    }

    /// Create a mirror sharing `ops` and its reporter.
    pub fn with_ops(ops: FileOps) -> Self {
        Self { ops }
    }

    /// The single-entry operations this mirror uses.
    pub fn ops(&self) -> &FileOps {
        &self.ops
    }

    /// Copy the directory `src` and everything beneath it into `dst`.
    ///
    /// Any source path containing one of `ignore` as a substring is skipped
    /// together with its descendants; an ignored `src` is success with
    /// nothing copied. `dst` is created if absent. Existing destination
    /// entries are never overwritten.
    pub fn copy_tree<S: AsRef<str>>(
        &self,
        src: impl AsRef<Path>,
        dst: impl AsRef<Path>,
        ignore: &[S],
    ) -> Result<MirrorSummary, FsError> {
        let (src, dst) = (src.as_ref(), dst.as_ref());
        self.ops.report(copy_tree(src, dst, ignore), || {
            OperationType::CopyTree.describe_pair(src, dst)
        })
    }

    /// Run a mirror described by `options`: optionally clear `dst`, then
    /// [`copy_tree`](Self::copy_tree).
    pub fn mirror(
        &self,
        src: impl AsRef<Path>,
        dst: impl AsRef<Path>,
        options: &MirrorOptions,
    ) -> Result<MirrorSummary, FsError> {
        let (src, dst) = (src.as_ref(), dst.as_ref());
        let result = if options.clean {
            check_clean_target(src, dst)
                .and_then(|()| delete_directory(dst))
                .and_then(|()| copy_tree(src, dst, &options.ignore))
        } else {
            copy_tree(src, dst, &options.ignore)
        };
        self.ops.report(result, || {
            OperationType::CopyTree.describe_pair(src, dst)
        })
    }

    /// Delete `root` and everything beneath it; a missing root is success.
    pub fn delete_tree(&self, root: impl AsRef<Path>) -> Result<(), FsError> {
        self.ops.delete_directory(root)
    }
}

/// Refuse to clean a destination that is the source or one of its ancestors.
fn check_clean_target(src: &Path, dst: &Path) -> Result<(), FsError> {
    let dst_canonical = match fs::canonicalize(dst) {
        Ok(path) => path,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(()),
        Err(e) => return Err(FsError::io(dst, e)),
    };
    let src_canonical = fs::canonicalize(src).map_err(|e| FsError::io(src, e))?;

    if src_canonical.starts_with(&dst_canonical) {
        return Err(FsError::Overlap {
            path: src.to_path_buf(),
            destination: dst.to_path_buf(),
        });
    }
    Ok(())
}

fn copy_tree<S: AsRef<str>>(
    src: &Path,
    dst: &Path,
    ignore: &[S],
) -> Result<MirrorSummary, FsError> {
    let mut summary = MirrorSummary::default();

    if is_ignored(&directory_string(src), ignore) {
        tracing::debug!(path = %src.display(), "Ignoring source directory");
        summary.skipped += 1;
        return Ok(summary);
    }

    // The root may be reached through a link; nothing beneath it is.
    let metadata = fs::metadata(src).map_err(|e| FsError::io(src, e))?;
    if !metadata.is_dir() {
        return Err(FsError::type_mismatch(
            src,
            EntryKind::Directory,
            EntryKind::from_file_type(metadata.file_type()),
        ));
    }

    create_directory(dst)?;
    summary.directories += 1;
    // A destination nested in the source must not be copied into itself.
    let dst_canonical = fs::canonicalize(dst).ok();

    let mut pending: Vec<(PathBuf, PathBuf)> = vec![(src.to_path_buf(), dst.to_path_buf())];
    while let Some((src_dir, dst_dir)) = pending.pop() {
        let entries = fs::read_dir(&src_dir).map_err(|e| FsError::io(&src_dir, e))?;
        let mut subdirs = Vec::new();

        for entry in entries {
            let entry = entry.map_err(|e| FsError::io(&src_dir, e))?;
            let child_src = entry.path();
            let child_dst = dst_dir.join(entry.file_name());
            let file_type = entry.file_type().map_err(|e| FsError::io(&child_src, e))?;
            let kind = EntryKind::from_file_type(file_type);

            let match_form = if kind.is_dir() {
                directory_string(&child_src)
            } else {
                child_src.to_string_lossy().into_owned()
            };
            if is_ignored(&match_form, ignore) {
                tracing::debug!(path = %child_src.display(), "Ignoring entry");
                summary.skipped += 1;
                continue;
            }

            match kind {
                EntryKind::Symlink => {
                    copy_symbolic_link(&child_src, &child_dst)?;
                    summary.links += 1;
                }
                EntryKind::Directory => {
                    if dst_canonical.is_some() && fs::canonicalize(&child_src).ok() == dst_canonical
                    {
                        tracing::debug!(path = %child_src.display(), "Skipping destination nested in source");
                        continue;
                    }
                    create_directory(&child_dst)?;
                    summary.directories += 1;
                    subdirs.push((child_src, child_dst));
                }
                EntryKind::File | EntryKind::Other => {
                    summary.bytes_copied += copy_file(&child_src, &child_dst)?;
                    summary.files += 1;
                }
            }
        }

        // Reversed so subdirectories pop in listing order.
        pending.extend(subdirs.into_iter().rev());
    }

    Ok(summary)
}
