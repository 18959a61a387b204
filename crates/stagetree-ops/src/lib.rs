//! File operations engine for stagetree.
//!
//! This crate provides the single-entry operations (read, write, copy,
//! rename, delete, create, link) on [`FileOps`] and the recursive tree
//! copy/delete on [`TreeMirror`]. All operations are synchronous; failures
//! are returned as [`FsError`] and reported once to the injected
//! [`Reporter`](stagetree_core::Reporter).

mod copy;
mod create;
mod delete;
mod file_ops;
mod link;
mod mirror;
mod operation;
mod rename;

pub use file_ops::FileOps;
pub use mirror::{MirrorSummary, TreeMirror};
pub use operation::OperationType;

// Re-export core types for convenience
pub use stagetree_core::{
    CapturingReporter, EntryKind, FsError, FsErrorKind, MirrorOptions, Reporter, TracingReporter,
};
