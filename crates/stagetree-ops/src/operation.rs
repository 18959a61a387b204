//! Operation names used in failure reports.

use std::path::Path;

use serde::{Deserialize, Serialize};

/// The type of operation being performed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OperationType {
    ReadFile,
    WriteFile,
    CopyFile,
    CopySymlink,
    CreateSymlink,
    CreateDirectory,
    RenameFile,
    RenameDirectory,
    DeleteFile,
    DeleteDirectory,
    CopyTree,
}

impl std::fmt::Display for OperationType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ReadFile => write!(f, "read file"),
            Self::WriteFile => write!(f, "write file"),
            Self::CopyFile => write!(f, "copy file"),
            Self::CopySymlink => write!(f, "copy symlink"),
            Self::CreateSymlink => write!(f, "create symlink"),
            Self::CreateDirectory => write!(f, "create directory"),
            Self::RenameFile => write!(f, "rename file"),
            Self::RenameDirectory => write!(f, "rename directory"),
            Self::DeleteFile => write!(f, "delete file"),
            Self::DeleteDirectory => write!(f, "delete directory"),
            Self::CopyTree => write!(f, "copy directory"),
        }
    }
}

impl OperationType {
    /// Failure message for an operation on one path.
    pub fn describe(&self, path: &Path) -> String {
        format!("Failed to {self} '{}'", path.display())
    }

    /// Failure message for an operation between two paths.
    pub fn describe_pair(&self, from: &Path, to: &Path) -> String {
        format!("Failed to {self} '{}' to '{}'", from.display(), to.display())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_describe_names_operation_and_paths() {
        assert_eq!(
            OperationType::DeleteFile.describe(Path::new("/a/x.txt")),
            "Failed to delete file '/a/x.txt'"
        );
        assert_eq!(
            OperationType::CopyTree.describe_pair(Path::new("/a"), Path::new("/out")),
            "Failed to copy directory '/a' to '/out'"
        );
    }
}
