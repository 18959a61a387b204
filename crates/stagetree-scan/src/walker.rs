//! JWalk-based recursive directory listing.

use std::fs;
use std::path::{Path, PathBuf};

use jwalk::{Parallelism, WalkDir};
use serde::{Deserialize, Serialize};

use stagetree_core::EntryKind;
use stagetree_core::path::file_form;

/// Which entries a listing returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ListKind {
    /// Regular files and symbolic links. Sockets, fifos and devices are
    /// left out.
    Files,
    /// Every directory, excluding the root itself.
    Directories,
}

/// Recursive lister for everything beneath a root directory.
///
/// Symbolic links are never followed: a link is reported as a leaf in
/// [`ListKind::Files`] listings, whatever it points at, so circular links
/// cannot cause unbounded traversal.
#[derive(Debug, Clone)]
pub struct TreeWalker {
    sorted: bool,
}

impl TreeWalker {
    /// Create a walker that visits children in name order.
    pub fn new() -> Self {
        Self { sorted: true }
    }

    /// Create a walker that visits children in raw directory-listing order.
    pub fn unsorted() -> Self {
        Self { sorted: false }
    }

    /// Every regular file and symbolic link at any depth beneath `root`,
    /// as full paths. Special files are skipped.
    ///
    /// A missing or non-directory root yields an empty list.
    pub fn list_files_recursive(&self, root: impl AsRef<Path>) -> Vec<PathBuf> {
        self.walk(root.as_ref(), ListKind::Files)
    }

    /// Every directory at any depth beneath `root`, excluding `root`, in
    /// pre-order (a directory before its children).
    pub fn list_directories_recursive(&self, root: impl AsRef<Path>) -> Vec<PathBuf> {
        self.walk(root.as_ref(), ListKind::Directories)
    }

    /// Listing of `kind` with the root prefix stripped from every path.
    pub fn list_relative(&self, root: impl AsRef<Path>, kind: ListKind) -> Vec<PathBuf> {
        let root = file_form(root.as_ref());
        self.walk(&root, kind)
            .into_iter()
            .filter_map(|path| path.strip_prefix(&root).map(Path::to_path_buf).ok())
            .collect()
    }

    /// Files beneath `root`, relative to `root`.
    pub fn list_files_relative(&self, root: impl AsRef<Path>) -> Vec<PathBuf> {
        self.list_relative(root, ListKind::Files)
    }

    /// Directories beneath `root`, relative to `root`.
    pub fn list_directories_relative(&self, root: impl AsRef<Path>) -> Vec<PathBuf> {
        self.list_relative(root, ListKind::Directories)
    }

    fn walk(&self, root: &Path, kind: ListKind) -> Vec<PathBuf> {
        let root = file_form(root);

        // The root itself may be reached through a link; its contents are not.
        match fs::metadata(&root) {
            Ok(metadata) if metadata.is_dir() => {}
            _ => return Vec::new(),
        }

        let is_root_link = matches!(EntryKind::of(&root), Ok(Some(EntryKind::Symlink)));
        let walk_root = if is_root_link {
            match fs::canonicalize(&root) {
                Ok(target) => target,
                Err(err) => {
                    tracing::warn!(path = %root.display(), error = %err, "Failed to resolve root link");
                    return Vec::new();
                }
            }
        } else {
            root.clone()
        };

        let walker = WalkDir::new(&walk_root)
            .parallelism(Parallelism::Serial)
            .sort(self.sorted)
            .skip_hidden(false)
            .follow_links(false)
            .min_depth(1);

        let mut paths = Vec::new();
        for entry_result in walker {
            let entry = match entry_result {
                Ok(e) => e,
                Err(err) => {
                    let path = err.path().map(|p| p.to_path_buf()).unwrap_or_default();
                    tracing::warn!(path = %path.display(), error = %err, "Skipping unreadable entry");
                    continue;
                }
            };

            let entry_kind = EntryKind::from_file_type(entry.file_type());
            let wanted = match kind {
                ListKind::Files => matches!(entry_kind, EntryKind::File | EntryKind::Symlink),
                ListKind::Directories => entry_kind.is_dir(),
            };
            if !wanted {
                continue;
            }

            let path = entry.path();
            if is_root_link {
                // Report paths under the root as given, not under its target.
                match path.strip_prefix(&walk_root) {
                    Ok(rel) => paths.push(root.join(rel)),
                    Err(_) => paths.push(path),
                }
            } else {
                paths.push(path);
            }
        }

        paths
    }
}

impl Default for TreeWalker {
    fn default() -> Self {
        Self::new()
    }
}
