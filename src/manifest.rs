//! Manifest parsing.
//!
//! The manifest is a newline-delimited UTF-8 file mapping note filenames to
//! archive categories:
//!
//! ```text
//! # comment
//! My Great Note.md | AI-and-Technology/AI-Limitations | Tech-Competition
//! Another Note.md  | Media-and-Communication/Social-Platforms
//! ```
//!
//! Fields are separated by `|` and trimmed. Blank lines and `#` comments are
//! skipped, as are header rows whose primary field is the literal sentinel
//! `CATEGORY` and any line with an empty primary field.

use std::fs;
use std::path::{Path, PathBuf};

/// The header-row sentinel: lines carrying it in a category field are
/// ignored (primary) or treated as absent (secondary).
const CATEGORY_SENTINEL: &str = "CATEGORY";

/// One parsed manifest line: a declared filename and its target categories.
///
/// The declared name may differ from the on-disk filename in case,
/// punctuation, or whitespace; resolution happens in the fuzzy matcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestRecord {
    /// The filename as written in the manifest.
    pub declared_name: String,
    /// Archive path segment (or nested path) the file is copied into.
    pub primary_category: String,
    /// Optional additional category that receives a link, never a copy.
    pub secondary_category: Option<String>,
}

/// Errors that can occur while reading a manifest.
#[derive(Debug)]
pub enum ManifestError {
    /// The manifest file does not exist.
    NotFound(PathBuf),
    /// The manifest file could not be read.
    ReadFailed {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl std::fmt::Display for ManifestError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ManifestError::NotFound(path) => {
                write!(f, "Manifest file not found: {}", path.display())
            }
            ManifestError::ReadFailed { path, source } => {
                write!(f, "Failed to read manifest {}: {}", path.display(), source)
            }
        }
    }
}

impl std::error::Error for ManifestError {}

/// Parses a manifest file into an ordered sequence of records.
///
/// Order follows the file and is preserved for deterministic progress
/// reporting.
pub fn parse_manifest(path: &Path) -> Result<Vec<ManifestRecord>, ManifestError> {
    if !path.exists() {
        return Err(ManifestError::NotFound(path.to_path_buf()));
    }

    let content = fs::read_to_string(path).map_err(|e| ManifestError::ReadFailed {
        path: path.to_path_buf(),
        source: e,
    })?;

    Ok(parse_manifest_str(&content))
}

/// Parses manifest text into records, dropping comments, blanks, header
/// rows, and lines without a usable primary category.
pub fn parse_manifest_str(content: &str) -> Vec<ManifestRecord> {
    let mut records = Vec::new();

    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let parts: Vec<&str> = line.split('|').map(str::trim).collect();
        if parts.len() < 2 {
            continue;
        }

        let declared_name = parts[0];
        let primary = parts[1];
        if primary.is_empty() || primary == CATEGORY_SENTINEL {
            continue;
        }

        let secondary = parts
            .get(2)
            .map(|s| s.to_string())
            .filter(|s| !s.is_empty() && s.as_str() != CATEGORY_SENTINEL);

        records.push(ManifestRecord {
            declared_name: declared_name.to_string(),
            primary_category: primary.to_string(),
            secondary_category: secondary,
        });
    }

    records
}
