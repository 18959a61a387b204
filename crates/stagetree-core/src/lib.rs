//! Core types for stagetree.
//!
//! This crate provides the pieces shared by every stagetree crate: path
//! normalization, entry classification, the checksum value type, the error
//! taxonomy, failure reporting and configuration.

mod config;
mod entry;
mod error;
pub mod path;
mod report;

pub use config::{
    ChecksumConfig, ChecksumConfigBuilder, DEFAULT_CHUNK_SIZE, MirrorJob, MirrorOptions,
    MirrorOptionsBuilder, StageManifest, is_ignored,
};
pub use entry::{Checksum, EntryKind, ParseChecksumError};
pub use error::{FsError, FsErrorKind, ManifestError};
pub use report::{CapturingReporter, Reporter, TracingReporter};
