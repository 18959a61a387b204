//! Compare a mirrored tree against its source.

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use stagetree_core::{EntryKind, FsError, Reporter};
use stagetree_scan::{ListKind, TreeWalker};

use crate::checksum::Checksummer;

/// Differences between a source tree and its mirror.
///
/// All paths are relative to the compared roots.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MirrorReport {
    /// Leaf entries present on both sides and compared.
    pub files_compared: usize,
    /// Present in the source, absent from the mirror.
    pub missing: Vec<PathBuf>,
    /// Present in the mirror, absent from the source.
    pub extra: Vec<PathBuf>,
    /// Present on both sides with different content, link target or kind.
    pub mismatched: Vec<PathBuf>,
}

impl MirrorReport {
    /// Check if the mirror matches the source exactly.
    pub fn is_identical(&self) -> bool {
        self.missing.is_empty() && self.extra.is_empty() && self.mismatched.is_empty()
    }
}

/// Verifies mirrors by listing both trees and comparing each shared leaf.
#[derive(Debug, Clone, Default)]
pub struct MirrorVerifier {
    walker: TreeWalker,
    checksummer: Checksummer,
}

impl MirrorVerifier {
    /// Create a verifier with default checksum settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a verifier that hashes with `checksummer`.
    pub fn with_checksummer(checksummer: Checksummer) -> Self {
        Self {
            walker: TreeWalker::new(),
            checksummer,
        }
    }

    /// Replace the reporter failures are sent to.
    pub fn reporter(mut self, reporter: impl Reporter + 'static) -> Self {
        self.checksummer = self.checksummer.reporter(reporter);
        self
    }

    /// Compare the tree under `src` with the tree under `dst`.
    ///
    /// Both roots must be directories. The first entry that cannot be read
    /// aborts the comparison.
    pub fn verify(
        &self,
        src: impl AsRef<Path>,
        dst: impl AsRef<Path>,
    ) -> Result<MirrorReport, FsError> {
        let (src, dst) = (src.as_ref(), dst.as_ref());
        let result = self.compare(src, dst);
        match &result {
            Ok(report) => tracing::debug!(
                source = %src.display(),
                destination = %dst.display(),
                compared = report.files_compared,
                identical = report.is_identical(),
                "Verified mirror"
            ),
            Err(err) => self.checksummer.report(&format!(
                "Failed to verify '{}' against '{}': {err}",
                src.display(),
                dst.display()
            )),
        }
        result
    }

    fn compare(&self, src: &Path, dst: &Path) -> Result<MirrorReport, FsError> {
        require_directory(src)?;
        require_directory(dst)?;

        let mut report = MirrorReport::default();

        let src_dirs = self.listing(src, ListKind::Directories);
        let dst_dirs = self.listing(dst, ListKind::Directories);
        let src_files = self.listing(src, ListKind::Files);
        let dst_files = self.listing(dst, ListKind::Files);

        report.missing.extend(src_dirs.difference(&dst_dirs).cloned());
        report.missing.extend(src_files.difference(&dst_files).cloned());
        report.extra.extend(dst_dirs.difference(&src_dirs).cloned());
        report.extra.extend(dst_files.difference(&src_files).cloned());

        for relative in src_files.intersection(&dst_files) {
            report.files_compared += 1;
            if !self.same_entry(&src.join(relative), &dst.join(relative))? {
                report.mismatched.push(relative.clone());
            }
        }

        // A directory on one side and a leaf on the other shows up as both
        // missing and extra; fold that into a single mismatch.
        let crossed: BTreeSet<PathBuf> = report
            .missing
            .iter()
            .filter(|path| report.extra.contains(path))
            .cloned()
            .collect();
        if !crossed.is_empty() {
            report.missing.retain(|path| !crossed.contains(path));
            report.extra.retain(|path| !crossed.contains(path));
            report.mismatched.extend(crossed);
        }

        report.missing.sort();
        report.extra.sort();
        report.mismatched.sort();
        Ok(report)
    }

    fn listing(&self, root: &Path, kind: ListKind) -> BTreeSet<PathBuf> {
        self.walker.list_relative(root, kind).into_iter().collect()
    }

    fn same_entry(&self, a: &Path, b: &Path) -> Result<bool, FsError> {
        let kind_a = kind_of(a)?;
        let kind_b = kind_of(b)?;
        if kind_a != kind_b {
            return Ok(false);
        }

        match kind_a {
            EntryKind::Symlink => {
                let target_a = fs::read_link(a).map_err(|e| FsError::io(a, e))?;
                let target_b = fs::read_link(b).map_err(|e| FsError::io(b, e))?;
                Ok(target_a == target_b)
            }
            EntryKind::File => {
                let len_a = fs::metadata(a).map_err(|e| FsError::io(a, e))?.len();
                let len_b = fs::metadata(b).map_err(|e| FsError::io(b, e))?.len();
                if len_a != len_b {
                    return Ok(false);
                }
                Ok(self.checksummer.compute(a)? == self.checksummer.compute(b)?)
            }
            EntryKind::Directory | EntryKind::Other => Ok(true),
        }
    }
}

fn kind_of(path: &Path) -> Result<EntryKind, FsError> {
    EntryKind::of(path)
        .map_err(|e| FsError::io(path, e))?
        .ok_or_else(|| FsError::NotFound {
            path: path.to_path_buf(),
        })
}

fn require_directory(path: &Path) -> Result<(), FsError> {
    let metadata = fs::metadata(path).map_err(|e| FsError::io(path, e))?;
    if metadata.is_dir() {
        Ok(())
    } else {
        Err(FsError::type_mismatch(
            path,
            EntryKind::Directory,
            EntryKind::from_file_type(metadata.file_type()),
        ))
    }
}
