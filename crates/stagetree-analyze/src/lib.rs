//! Content checksums and mirror verification for stagetree.
//!
//! - **Checksums** - stream a file through BLAKE3 in fixed-size chunks
//! - **Verification** - compare a mirrored tree against its source
//!
//! ```rust,no_run
//! use stagetree_analyze::{Checksummer, MirrorVerifier};
//!
//! let hex = Checksummer::new().checksum_hex("/path/to/file").unwrap();
//! println!("{hex}");
//!
//! let report = MirrorVerifier::new()
//!     .verify("/path/to/source", "/path/to/stage")
//!     .unwrap();
//! if !report.is_identical() {
//!     println!("{} entries differ", report.mismatched.len());
//! }
//! ```

mod checksum;
mod verify;

pub use checksum::Checksummer;
pub use verify::{MirrorReport, MirrorVerifier};

// Re-export core types for convenience
pub use stagetree_core::{Checksum, ChecksumConfig, ChecksumConfigBuilder};
