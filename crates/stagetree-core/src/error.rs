//! Error types for filesystem operations.

use std::io;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::entry::EntryKind;

/// Errors that can occur during filesystem operations.
#[derive(Debug, Error)]
pub enum FsError {
    /// Path not found.
    #[error("Path not found: {path}")]
    NotFound { path: PathBuf },

    /// Path exists but is the wrong kind of entry for the operation.
    #[error("Expected a {expected} at {path}, found a {actual}")]
    TypeMismatch {
        path: PathBuf,
        expected: EntryKind,
        actual: EntryKind,
    },

    /// Destination is already occupied.
    #[error("Already exists: {path}")]
    AlreadyExists { path: PathBuf },

    /// Destination contains or equals the source tree.
    #[error("Destination {destination} overlaps source {path}")]
    Overlap { path: PathBuf, destination: PathBuf },

    /// Permission denied for a path.
    #[error("Permission denied: {path}")]
    PermissionDenied { path: PathBuf },

    /// Generic I/O error.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl FsError {
    /// Create an I/O error with path context.
    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        let path = path.into();
        match source.kind() {
            io::ErrorKind::PermissionDenied => Self::PermissionDenied { path },
            io::ErrorKind::NotFound => Self::NotFound { path },
            io::ErrorKind::AlreadyExists => Self::AlreadyExists { path },
            _ => Self::Io { path, source },
        }
    }

    /// Create a type mismatch error.
    pub fn type_mismatch(path: impl Into<PathBuf>, expected: EntryKind, actual: EntryKind) -> Self {
        Self::TypeMismatch {
            path: path.into(),
            expected,
            actual,
        }
    }

    /// Coarse classification of this error.
    pub fn kind(&self) -> FsErrorKind {
        match self {
            Self::NotFound { .. } => FsErrorKind::NotFound,
            Self::TypeMismatch { .. } => FsErrorKind::TypeMismatch,
            Self::AlreadyExists { .. } => FsErrorKind::AlreadyExists,
            Self::Overlap { .. } => FsErrorKind::Overlap,
            Self::PermissionDenied { .. } | Self::Io { .. } => FsErrorKind::Io,
        }
    }

    /// The path this error refers to.
    pub fn path(&self) -> &PathBuf {
        match self {
            Self::NotFound { path }
            | Self::TypeMismatch { path, .. }
            | Self::AlreadyExists { path }
            | Self::Overlap { path, .. }
            | Self::PermissionDenied { path }
            | Self::Io { path, .. } => path,
        }
    }
}

/// Errors that can occur while loading a stage manifest.
#[derive(Debug, Error)]
pub enum ManifestError {
    /// Manifest file could not be read.
    #[error("Failed to read manifest {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Manifest is not valid TOML or has the wrong shape.
    #[error("Failed to parse manifest: {0}")]
    Parse(#[from] toml::de::Error),

    /// Manifest parsed but describes an unusable job.
    #[error("Invalid manifest: {message}")]
    Invalid { message: String },
}

/// Kind of filesystem failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FsErrorKind {
    /// Target exists but is the wrong kind of entry.
    TypeMismatch,
    /// Destination already occupied.
    AlreadyExists,
    /// Source does not exist.
    NotFound,
    /// Source and destination trees overlap.
    Overlap,
    /// Underlying filesystem call failed (permissions, disk full, device error).
    Io,
}
