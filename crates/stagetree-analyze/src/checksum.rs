//! Streaming content checksums using BLAKE3.

use std::fmt;
use std::fs::{self, File};
use std::io::{self, Read};
use std::path::Path;
use std::sync::Arc;

use blake3::Hasher;

use stagetree_core::{Checksum, ChecksumConfig, EntryKind, FsError, Reporter, TracingReporter};

/// Computes file checksums by streaming content through a BLAKE3 hasher.
///
/// The digest depends only on the bytes read, never on the chunk size.
#[derive(Clone)]
pub struct Checksummer {
    config: ChecksumConfig,
    reporter: Arc<dyn Reporter>,
}

impl Checksummer {
    /// Create a checksummer with default config, reporting through `tracing`.
    pub fn new() -> Self {
        Self::with_config(ChecksumConfig::default())
    }

    /// Create a checksummer with custom config.
    pub fn with_config(config: ChecksumConfig) -> Self {
        Self {
            config,
            reporter: Arc::new(TracingReporter),
        }
    }

    /// Replace the reporter failures are sent to.
    pub fn reporter(mut self, reporter: impl Reporter + 'static) -> Self {
        self.reporter = Arc::new(reporter);
        self
    }

    /// The active configuration.
    pub fn config(&self) -> &ChecksumConfig {
        &self.config
    }

    /// Checksum of the file at `path`.
    pub fn checksum(&self, path: impl AsRef<Path>) -> Result<Checksum, FsError> {
        let path = path.as_ref();
        let result = self.compute(path);
        if let Err(err) = &result {
            self.reporter.error(&format!(
                "Could not calculate checksum for file '{}': {err}",
                path.display()
            ));
        }
        result
    }

    /// Checksum of the file at `path` as a lowercase hex string.
    pub fn checksum_hex(&self, path: impl AsRef<Path>) -> Result<String, FsError> {
        self.checksum(path).map(|checksum| checksum.to_hex())
    }

    pub(crate) fn report(&self, message: &str) {
        self.reporter.error(message);
    }

    /// Compute without reporting.
    pub(crate) fn compute(&self, path: &Path) -> Result<Checksum, FsError> {
        let metadata = fs::metadata(path).map_err(|e| FsError::io(path, e))?;
        if metadata.is_dir() {
            return Err(FsError::type_mismatch(
                path,
                EntryKind::File,
                EntryKind::Directory,
            ));
        }

        let mut file = File::open(path).map_err(|e| FsError::io(path, e))?;
        let mut hasher = Hasher::new();
        let mut buffer = vec![0u8; self.config.chunk_size.max(1)];

        loop {
            let bytes_read = match file.read(&mut buffer) {
                Ok(0) => break,
                Ok(n) => n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(FsError::io(path, e)),
            };
            hasher.update(&buffer[..bytes_read]);
        }

        Ok(Checksum::new(*hasher.finalize().as_bytes()))
    }
}

impl Default for Checksummer {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Checksummer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Checksummer")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
