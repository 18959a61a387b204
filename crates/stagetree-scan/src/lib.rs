//! Recursive directory listing for stagetree.
//!
//! This crate enumerates every file or every directory beneath a root, the
//! traversal primitive shared by copy, delete, listing and verification.
//! Traversal is serial and never follows symbolic links.
//!
//! # Example
//!
//! ```rust,no_run
//! use stagetree_scan::{ListKind, TreeWalker};
//!
//! let walker = TreeWalker::new();
//! for path in walker.list_files_recursive("/path/to/tree") {
//!     println!("{}", path.display());
//! }
//!
//! let dirs = walker.list_relative("/path/to/tree", ListKind::Directories);
//! println!("{} directories", dirs.len());
//! ```

mod walker;

pub use walker::{ListKind, TreeWalker};

// Re-export core types for convenience
pub use stagetree_core::EntryKind;
