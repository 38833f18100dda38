// src/save/target.rs
//! Dispatch targets: the user-given output location.
//!
//! The original user string is preserved alongside the parsed path because a
//! trailing path separator is meaningful: it requests one-file-per-sheet
//! fan-out even before the directory exists.

use std::fmt;
use std::path::{Path, PathBuf};

/// A requested output location: a file path, or a directory marker
/// (trailing separator) requesting one file per sheet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveTarget {
    given: String,
    path: PathBuf,
}

impl SaveTarget {
    pub fn new(given: impl Into<String>) -> Self {
        let given = given.into();
        let path = PathBuf::from(&given);
        Self { given, path }
    }

    /// The string exactly as the user supplied it.
    pub fn given(&self) -> &str {
        &self.given
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Lower-cased file extension, if the target has one.
    pub fn ext(&self) -> Option<String> {
        self.path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    pub fn is_dir(&self) -> bool {
        self.path.is_dir()
    }

    /// Whether the user's original string ends with a path separator,
    /// selecting fan-out mode.
    pub fn has_dir_marker(&self) -> bool {
        self.given.ends_with('/') || self.given.ends_with(std::path::MAIN_SEPARATOR)
    }

    /// Per-sheet file inside this (directory) target: `<dir>/<name>.<filetype>`.
    pub fn join_file(&self, name: &str, filetype: &str) -> SaveTarget {
        let file = self.path.join(format!("{}.{}", name, filetype));
        SaveTarget {
            given: file.to_string_lossy().into_owned(),
            path: file,
        }
    }
}

impl From<PathBuf> for SaveTarget {
    fn from(path: PathBuf) -> Self {
        Self {
            given: path.to_string_lossy().into_owned(),
            path,
        }
    }
}

impl fmt::Display for SaveTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.given)
    }
}
