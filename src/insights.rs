//! Insights index maintenance.
//!
//! Notes in the inbox are personal reflections with optional YAML-style
//! frontmatter. After a note is archived, its title, date, and body are
//! appended to a chronological `INSIGHTS.md` index at the archive root so
//! the thoughts stay discoverable without opening each file.

use std::fs;
use std::io;
use std::path::Path;

/// Name of the index file kept at the archive root.
pub const INSIGHTS_FILE: &str = "INSIGHTS.md";

/// Extracted insight content from a single note file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteInsight {
    /// Title from frontmatter, or the file stem when absent.
    pub title: String,
    /// Note body after the frontmatter fence (the whole file when there is
    /// no frontmatter).
    pub thoughts: String,
    /// `created:` date from frontmatter, falling back to `published:`.
    pub date: Option<String>,
}

/// Extracts title, thoughts, and date from a note file.
///
/// Total: a file that cannot be read, or has no usable frontmatter, still
/// yields an insight with the file stem as title and whatever body text was
/// recoverable.
pub fn extract_insight(path: &Path) -> NoteInsight {
    let fallback_title = path
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();

    let Ok(content) = fs::read_to_string(path) else {
        return NoteInsight {
            title: fallback_title,
            thoughts: String::new(),
            date: None,
        };
    };

    let (frontmatter, body) = split_frontmatter(&content);

    let mut title = None;
    let mut created = None;
    let mut published = None;
    if let Some(frontmatter) = frontmatter {
        for line in frontmatter.lines() {
            if let Some(value) = line.strip_prefix("title:") {
                title = Some(value.trim().trim_matches(['"', '\'']).to_string());
            } else if let Some(value) = line.strip_prefix("created:") {
                created = Some(value.trim().to_string());
            } else if let Some(value) = line.strip_prefix("published:") {
                published = Some(value.trim().to_string());
            }
        }
    }

    NoteInsight {
        title: title
            .filter(|t| !t.is_empty())
            .unwrap_or(fallback_title),
        thoughts: body.trim().to_string(),
        date: created.or(published),
    }
}

/// Splits content into (frontmatter, body) at `---` fences.
///
/// Returns no frontmatter when the file does not open with a fence or the
/// closing fence is missing.
fn split_frontmatter(content: &str) -> (Option<&str>, &str) {
    if let Some(rest) = content.strip_prefix("---")
        && let Some(end) = rest.find("---")
    {
        (Some(&rest[..end]), &rest[end + 3..])
    } else {
        (None, content)
    }
}

/// Appends an insight entry to the index, creating the index with a header
/// on first use.
///
/// Entries are keyed by title: if a `## {title}` heading already exists the
/// entry is not appended again. Returns whether an entry was written.
pub fn append_to_index(
    archive_root: &Path,
    insight: &NoteInsight,
    archive_rel_path: &str,
) -> io::Result<bool> {
    let index_path = archive_root.join(INSIGHTS_FILE);

    if index_path.exists() {
        let existing = fs::read_to_string(&index_path)?;
        if existing.contains(&format!("## {}\n", insight.title)) {
            return Ok(false);
        }
    } else {
        let header = "# Archives Insights Index\n\n\
            This file contains a chronological index of all your insights and \
            thoughts from consumed content.\n\n---\n\n";
        fs::write(&index_path, header)?;
    }

    let mut entry = format!("## {}\n\n", insight.title);
    if let Some(date) = &insight.date {
        entry.push_str(&format!("**Date:** {}\n\n", date));
    }
    if !insight.thoughts.is_empty() {
        entry.push_str(&format!("{}\n\n", insight.thoughts));
    }
    entry.push_str(&format!("📍 `{}`\n\n---\n\n", archive_rel_path));

    let mut content = fs::read_to_string(&index_path)?;
    content.push_str(&entry);
    fs::write(&index_path, content)?;

    Ok(true)
}
