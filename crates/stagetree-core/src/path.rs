//! Canonical string forms for directory and file paths.
//!
//! A *directory path* always ends with exactly one separator and a *file
//! path* never ends with one. Both transformations are pure and idempotent.
//! The filesystem root keeps its separator in both forms.

use std::path::{self, Path, PathBuf};

/// Bring `path` into directory form: exactly one trailing separator.
///
/// An empty string stays empty so that it keeps meaning "the current
/// directory" instead of turning into the filesystem root.
pub fn normalize_directory(path: &str) -> String {
    if path.is_empty() {
        return String::new();
    }

    let mut normalized = normalize_file(path);
    if !normalized.ends_with(path::is_separator) {
        normalized.push(path::MAIN_SEPARATOR);
    }
    normalized
}

/// Bring `path` into file form: no trailing separator.
pub fn normalize_file(path: &str) -> String {
    let trimmed = path.trim_end_matches(path::is_separator);
    if trimmed.is_empty() && !path.is_empty() {
        // Only separators: this is the root.
        return path::MAIN_SEPARATOR.to_string();
    }
    trimmed.to_string()
}

/// [`normalize_file`] for `Path` values. Non UTF-8 paths are returned as-is.
pub fn file_form(path: &Path) -> PathBuf {
    match path.to_str() {
        Some(s) => PathBuf::from(normalize_file(s)),
        None => path.to_path_buf(),
    }
}

/// Directory-form string for matching against ignore substrings.
pub fn directory_string(path: &Path) -> String {
    normalize_directory(&path.to_string_lossy())
}
