//! Entry classification and content checksum types.

use std::fmt;
use std::fs::{self, FileType};
use std::io;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::path::file_form;

/// Kind of a filesystem entry, classified without following symbolic links.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntryKind {
    /// Regular file.
    File,
    /// Directory.
    Directory,
    /// Symbolic link (target is never resolved during classification).
    Symlink,
    /// Other file types (sockets, fifos, devices).
    Other,
}

impl EntryKind {
    /// Classify a `FileType`. The symlink check runs first.
    pub fn from_file_type(file_type: FileType) -> Self {
        if file_type.is_symlink() {
            Self::Symlink
        } else if file_type.is_dir() {
            Self::Directory
        } else if file_type.is_file() {
            Self::File
        } else {
            Self::Other
        }
    }

    /// Classify the entry at `path`.
    ///
    /// Returns `Ok(None)` when nothing exists there. A dangling symlink
    /// still exists and is reported as [`EntryKind::Symlink`]. Trailing
    /// separators are stripped first, since `link/` resolves the link.
    pub fn of(path: impl AsRef<Path>) -> io::Result<Option<Self>> {
        match fs::symlink_metadata(file_form(path.as_ref())) {
            Ok(metadata) => Ok(Some(Self::from_file_type(metadata.file_type()))),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Check if this is a directory.
    pub fn is_dir(&self) -> bool {
        matches!(self, Self::Directory)
    }

    /// Check if this is a regular file.
    pub fn is_file(&self) -> bool {
        matches!(self, Self::File)
    }

    /// Check if this is a symlink.
    pub fn is_symlink(&self) -> bool {
        matches!(self, Self::Symlink)
    }
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::File => write!(f, "file"),
            Self::Directory => write!(f, "directory"),
            Self::Symlink => write!(f, "symbolic link"),
            Self::Other => write!(f, "special file"),
        }
    }
}

/// BLAKE3 digest of a file's content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Checksum(pub [u8; 32]);

impl Checksum {
    /// Length of the rendered hex form.
    pub const HEX_LEN: usize = 64;

    /// Create a new Checksum from raw bytes.
    pub fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Get the checksum as a lowercase, zero-padded hex string.
    pub fn to_hex(&self) -> String {
        self.0.iter().map(|b| format!("{b:02x}")).collect()
    }

    /// Raw digest bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Display for Checksum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// Error returned when parsing a [`Checksum`] from text.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid checksum '{input}': expected {} hex characters", Checksum::HEX_LEN)]
pub struct ParseChecksumError {
    input: String,
}

impl FromStr for Checksum {
    type Err = ParseChecksumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ParseChecksumError {
            input: s.to_string(),
        };
        if s.len() != Self::HEX_LEN || !s.is_ascii() {
            return Err(invalid());
        }

        let mut bytes = [0u8; 32];
        for (i, byte) in bytes.iter_mut().enumerate() {
            *byte = u8::from_str_radix(&s[i * 2..i * 2 + 2], 16).map_err(|_| invalid())?;
        }
        Ok(Self(bytes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_checksum_hex_is_zero_padded() {
        let mut bytes = [0u8; 32];
        bytes[0] = 0x0a;
        let hex = Checksum::new(bytes).to_hex();
        assert_eq!(hex.len(), Checksum::HEX_LEN);
        assert!(hex.starts_with("0a00"));
    }

    #[test]
    fn test_checksum_parse() {
        let checksum = Checksum::new([0xab; 32]);
        let parsed: Checksum = checksum.to_hex().parse().unwrap();
        assert_eq!(parsed, checksum);

        assert!("abc".parse::<Checksum>().is_err());
        assert!("zz".repeat(32).parse::<Checksum>().is_err());
    }

    #[test]
    fn test_entry_kind_of_missing_path() {
        let kind = EntryKind::of("/definitely/not/a/real/path/stagetree").unwrap();
        assert!(kind.is_none());
    }
}
