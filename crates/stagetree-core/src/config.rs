//! Mirror, checksum and stage manifest configuration.

use std::fs;
use std::path::{Path, PathBuf};

use derive_builder::Builder;
use serde::{Deserialize, Serialize};

use crate::error::ManifestError;
use crate::path::file_form;

/// Default number of bytes read per checksum update.
pub const DEFAULT_CHUNK_SIZE: usize = 1024;

/// Options for a tree mirror run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Builder, Serialize, Deserialize)]
#[builder(setter(into), default)]
pub struct MirrorOptions {
    /// Substrings that cause a source path (and everything below it) to be
    /// skipped when contained anywhere in that path.
    #[serde(default)]
    pub ignore: Vec<String>,

    /// Delete the destination tree before copying.
    #[serde(default)]
    pub clean: bool,
}

impl MirrorOptions {
    /// Create a new mirror options builder.
    pub fn builder() -> MirrorOptionsBuilder {
        MirrorOptionsBuilder::default()
    }

    /// Options with the given ignore substrings and nothing else.
    pub fn with_ignore<I, S>(ignore: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            ignore: ignore.into_iter().map(Into::into).collect(),
            clean: false,
        }
    }

    /// Check if `path` contains any ignore substring.
    pub fn is_ignored(&self, path: &str) -> bool {
        is_ignored(path, &self.ignore)
    }
}

/// Check if `path` contains any of `ignore` as a plain substring.
///
/// This is not a path-segment match: ignoring `lib` also skips `library`.
pub fn is_ignored<S: AsRef<str>>(path: &str, ignore: &[S]) -> bool {
    ignore
        .iter()
        .map(AsRef::as_ref)
        .any(|needle| !needle.is_empty() && path.contains(needle))
}

/// Configuration for checksum computation.
#[derive(Debug, Clone, Builder, Serialize, Deserialize)]
#[builder(setter(into), build_fn(validate = "Self::validate"))]
pub struct ChecksumConfig {
    /// Bytes read from the file per digest update.
    #[builder(default = "DEFAULT_CHUNK_SIZE")]
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,
}

fn default_chunk_size() -> usize {
    DEFAULT_CHUNK_SIZE
}

impl ChecksumConfigBuilder {
    fn validate(&self) -> Result<(), String> {
        if self.chunk_size == Some(0) {
            return Err("Chunk size must be greater than zero".to_string());
        }
        Ok(())
    }
}

impl ChecksumConfig {
    /// Create a new checksum config builder.
    pub fn builder() -> ChecksumConfigBuilder {
        ChecksumConfigBuilder::default()
    }
}

impl Default for ChecksumConfig {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }
}

/// One mirror job in a stage manifest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MirrorJob {
    /// Source directory.
    pub source: PathBuf,
    /// Destination directory.
    pub destination: PathBuf,
    /// Ignore substrings for this job.
    #[serde(default)]
    pub ignore: Vec<String>,
    /// Delete the destination before copying.
    #[serde(default)]
    pub clean: bool,
}

impl MirrorJob {
    /// Mirror options for this job.
    pub fn options(&self) -> MirrorOptions {
        MirrorOptions {
            ignore: self.ignore.clone(),
            clean: self.clean,
        }
    }

    /// Resolve relative paths against `base`.
    fn resolve(&mut self, base: &Path) {
        if self.source.is_relative() {
            self.source = base.join(&self.source);
        }
        if self.destination.is_relative() {
            self.destination = base.join(&self.destination);
        }
    }
}

/// A list of mirror jobs, usually loaded from a TOML file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageManifest {
    /// Jobs in execution order.
    #[serde(default)]
    pub mirror: Vec<MirrorJob>,
}

impl StageManifest {
    /// Parse a manifest from TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self, ManifestError> {
        let manifest: Self = toml::from_str(text)?;
        manifest.validate()?;
        Ok(manifest)
    }

    /// Load a manifest file. Relative job paths resolve against the
    /// manifest's directory.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ManifestError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ManifestError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let mut manifest = Self::from_toml_str(&text)?;

        if let Some(base) = path.parent() {
            for job in &mut manifest.mirror {
                job.resolve(base);
            }
        }
        Ok(manifest)
    }

    fn validate(&self) -> Result<(), ManifestError> {
        for (index, job) in self.mirror.iter().enumerate() {
            if job.source.as_os_str().is_empty() || job.destination.as_os_str().is_empty() {
                return Err(ManifestError::Invalid {
                    message: format!("mirror job {index} needs both source and destination"),
                });
            }
            if file_form(&job.source) == file_form(&job.destination) {
                return Err(ManifestError::Invalid {
                    message: format!(
                        "mirror job {index} copies {} onto itself",
                        job.source.display()
                    ),
                });
            }
        }
        Ok(())
    }
}
