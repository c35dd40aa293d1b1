//! The placement engine: safe relocation of matched inbox files into the
//! archive tree.
//!
//! Each manifest record is processed against a fresh snapshot of the inbox
//! (the engine deletes files as it runs, so listings are never cached). A
//! placement is copy, verify, then delete: the source file is only removed
//! after a verified duplicate exists at the primary path. Secondary
//! categories receive a relative symlink, never a second copy of the bytes.

use crate::config::InboxFilters;
use crate::manifest::ManifestRecord;
use crate::matcher::FuzzyMatcher;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Errors raised while placing a single record or during pre-flight.
#[derive(Debug)]
pub enum PlacementError {
    /// No confident fuzzy match for the declared name in the inbox.
    NotFound { declared: String },
    /// Post-copy verification failed; the source file was preserved.
    IntegrityFailure {
        destination: PathBuf,
        detail: String,
    },
    /// An I/O failure during placement, caught at the record boundary.
    Filesystem {
        context: String,
        source: std::io::Error,
    },
    /// Pre-flight found the inbox empty and manifest targets already
    /// archived; the whole run is aborted.
    GuardAbort { found: usize, total: usize },
}

impl std::fmt::Display for PlacementError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PlacementError::NotFound { declared } => {
                write!(f, "No matching file found in inbox for '{}'", declared)
            }
            PlacementError::IntegrityFailure {
                destination,
                detail,
            } => {
                write!(
                    f,
                    "Copy verification failed for {}: {}",
                    destination.display(),
                    detail
                )
            }
            PlacementError::Filesystem { context, source } => {
                write!(f, "{}: {}", context, source)
            }
            PlacementError::GuardAbort { found, total } => {
                write!(
                    f,
                    "Inbox is empty and {}/{} manifest targets already exist in the archive; \
                     aborting to prevent duplicate processing",
                    found, total
                )
            }
        }
    }
}

impl std::error::Error for PlacementError {}

/// Result type for placement operations.
pub type PlacementResult<T> = Result<T, PlacementError>;

/// The outcome of processing one manifest record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlacementOutcome {
    /// The file was copied, verified, and removed from the inbox.
    Moved {
        /// The on-disk filename the declared name resolved to.
        actual_name: String,
        /// Whether a secondary-category link was created.
        secondary_linked: bool,
    },
    /// Nothing was moved; the reason is reported and the run continues.
    Skipped { reason: String },
}

/// Counters for a single run, created fresh per invocation and threaded
/// through the engine rather than held in shared state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunStats {
    /// Files copied, verified, and removed from the inbox.
    pub moved: usize,
    /// Secondary links created.
    pub linked: usize,
    /// Records skipped (not found, verification failure, or I/O error).
    pub skipped: usize,
}

impl RunStats {
    /// Updates the counters for one record's outcome.
    pub fn record(&mut self, outcome: &PlacementOutcome) {
        match outcome {
            PlacementOutcome::Moved {
                secondary_linked, ..
            } => {
                self.moved += 1;
                if *secondary_linked {
                    self.linked += 1;
                }
            }
            PlacementOutcome::Skipped { .. } => {
                self.skipped += 1;
            }
        }
    }
}

/// Places manifest records from an inbox directory into an archive tree.
pub struct PlacementEngine {
    inbox: PathBuf,
    archive_root: PathBuf,
    matcher: FuzzyMatcher,
    filters: InboxFilters,
}

impl PlacementEngine {
    /// Creates an engine over the given inbox and archive root.
    pub fn new(
        inbox: PathBuf,
        archive_root: PathBuf,
        matcher: FuzzyMatcher,
        filters: InboxFilters,
    ) -> Self {
        Self {
            inbox,
            archive_root,
            matcher,
            filters,
        }
    }

    /// The matcher this engine resolves declared names with.
    pub fn matcher(&self) -> &FuzzyMatcher {
        &self.matcher
    }

    /// Takes a fresh snapshot of eligible inbox filenames.
    ///
    /// Called once per record on purpose: successful placements remove
    /// files, so a cached listing would offer the matcher already-moved
    /// candidates.
    pub fn snapshot_inbox(&self) -> PlacementResult<Vec<String>> {
        let entries = fs::read_dir(&self.inbox).map_err(|e| PlacementError::Filesystem {
            context: format!("Failed to read inbox {}", self.inbox.display()),
            source: e,
        })?;

        let mut names = Vec::new();
        for entry in entries.flatten() {
            if let Ok(file_type) = entry.file_type()
                && file_type.is_file()
                && self.filters.is_eligible(&entry.path())
            {
                names.push(entry.file_name().to_string_lossy().to_string());
            }
        }
        names.sort();
        Ok(names)
    }

    /// Pre-flight guard against re-processing an already-organized archive.
    ///
    /// An empty inbox would make every record report "not found", masking a
    /// completed run as a failed one. If the inbox has no eligible files and
    /// any manifest target already exists under its primary category, the
    /// run aborts. An empty inbox with no archived targets proceeds: the
    /// manifest may legitimately reference targets not yet archived.
    pub fn preflight_guard(&self, records: &[ManifestRecord]) -> PlacementResult<()> {
        if !self.snapshot_inbox()?.is_empty() {
            return Ok(());
        }

        let found = records
            .iter()
            .filter(|record| {
                self.archive_root
                    .join(&record.primary_category)
                    .join(&record.declared_name)
                    .exists()
            })
            .count();

        if found > 0 {
            Err(PlacementError::GuardAbort {
                found,
                total: records.len(),
            })
        } else {
            Ok(())
        }
    }

    /// Processes one record: match, copy, verify, delete, link.
    ///
    /// Every failure is caught here and becomes a `Skipped` outcome; a
    /// single bad record never aborts the run. A file present in the inbox
    /// before this call is either fully moved or left untouched.
    pub fn place_record(&self, record: &ManifestRecord) -> PlacementOutcome {
        match self.try_place(record) {
            Ok((actual_name, secondary_linked)) => PlacementOutcome::Moved {
                actual_name,
                secondary_linked,
            },
            Err(e) => PlacementOutcome::Skipped {
                reason: e.to_string(),
            },
        }
    }

    fn try_place(&self, record: &ManifestRecord) -> PlacementResult<(String, bool)> {
        let listing = self.snapshot_inbox()?;
        let actual_name = self
            .matcher
            .find_match(&record.declared_name, &listing)
            .ok_or_else(|| PlacementError::NotFound {
                declared: record.declared_name.clone(),
            })?;

        let source_path = self.inbox.join(&actual_name);
        let primary_dir = self.archive_root.join(&record.primary_category);
        fs::create_dir_all(&primary_dir).map_err(|e| PlacementError::Filesystem {
            context: format!("Failed to create category directory {}", primary_dir.display()),
            source: e,
        })?;
        let primary_path = primary_dir.join(&actual_name);

        fs::copy(&source_path, &primary_path).map_err(|e| PlacementError::Filesystem {
            context: format!(
                "Failed to copy {} to {}",
                source_path.display(),
                primary_path.display()
            ),
            source: e,
        })?;

        // The source must outlive any unverified copy.
        verify_copy(&source_path, &primary_path)?;

        fs::remove_file(&source_path).map_err(|e| PlacementError::Filesystem {
            context: format!("Failed to remove source {}", source_path.display()),
            source: e,
        })?;

        let secondary_linked = if let Some(secondary) = &record.secondary_category {
            self.link_secondary(secondary, &actual_name, &primary_path)?;
            true
        } else {
            false
        };

        Ok((actual_name, secondary_linked))
    }

    /// Creates a relative symlink in the secondary category pointing at the
    /// primary copy.
    ///
    /// Idempotent: an existing entry at the link path is removed first.
    /// The link is a reference, never a duplicate of the file bytes.
    fn link_secondary(
        &self,
        secondary_category: &str,
        actual_name: &str,
        primary_path: &Path,
    ) -> PlacementResult<()> {
        let secondary_dir = self.archive_root.join(secondary_category);
        fs::create_dir_all(&secondary_dir).map_err(|e| PlacementError::Filesystem {
            context: format!(
                "Failed to create secondary directory {}",
                secondary_dir.display()
            ),
            source: e,
        })?;

        let link_path = secondary_dir.join(actual_name);
        // symlink_metadata also sees broken links, which plain exists() misses.
        if fs::symlink_metadata(&link_path).is_ok() {
            fs::remove_file(&link_path).map_err(|e| PlacementError::Filesystem {
                context: format!("Failed to remove existing link {}", link_path.display()),
                source: e,
            })?;
        }

        let relative_target = relative_to(primary_path, &secondary_dir);
        make_symlink(&relative_target, &link_path).map_err(|e| PlacementError::Filesystem {
            context: format!(
                "Failed to link {} -> {}",
                link_path.display(),
                relative_target.display()
            ),
            source: e,
        })?;

        Ok(())
    }
}

/// Verifies that a copy produced a complete duplicate.
///
/// The destination must exist and its byte size must equal the source's.
/// On failure the caller must not delete the source; the destination may be
/// a partial copy.
pub fn verify_copy(source: &Path, destination: &Path) -> PlacementResult<()> {
    if !destination.exists() {
        return Err(PlacementError::IntegrityFailure {
            destination: destination.to_path_buf(),
            detail: "destination does not exist after copy".to_string(),
        });
    }

    let source_size = file_size(source)?;
    let dest_size = file_size(destination)?;
    if source_size != dest_size {
        return Err(PlacementError::IntegrityFailure {
            destination: destination.to_path_buf(),
            detail: format!(
                "size mismatch (source: {}, destination: {})",
                source_size, dest_size
            ),
        });
    }

    Ok(())
}

fn file_size(path: &Path) -> PlacementResult<u64> {
    fs::metadata(path)
        .map(|m| m.len())
        .map_err(|e| PlacementError::Filesystem {
            context: format!("Failed to stat {}", path.display()),
            source: e,
        })
}

/// Computes `target` relative to the directory `base`.
///
/// Both paths are engine-constructed and share the archive root, so
/// component-wise prefix stripping is sufficient.
fn relative_to(target: &Path, base: &Path) -> PathBuf {
    let target_parts: Vec<_> = target.components().collect();
    let base_parts: Vec<_> = base.components().collect();

    let common = target_parts
        .iter()
        .zip(base_parts.iter())
        .take_while(|(a, b)| a == b)
        .count();

    let mut relative = PathBuf::new();
    for _ in common..base_parts.len() {
        relative.push("..");
    }
    for part in &target_parts[common..] {
        relative.push(part);
    }
    if relative.as_os_str().is_empty() {
        relative.push(".");
    }
    relative
}

#[cfg(unix)]
fn make_symlink(target: &Path, link: &Path) -> std::io::Result<()> {
    std::os::unix::fs::symlink(target, link)
}

#[cfg(windows)]
fn make_symlink(target: &Path, link: &Path) -> std::io::Result<()> {
    std::os::windows::fs::symlink_file(target, link)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn record(declared: &str, primary: &str, secondary: Option<&str>) -> ManifestRecord {
        ManifestRecord {
            declared_name: declared.to_string(),
            primary_category: primary.to_string(),
            secondary_category: secondary.map(|s| s.to_string()),
        }
    }

    fn engine(temp: &TempDir) -> PlacementEngine {
        let inbox = temp.path().join("Clippings");
        let archive = temp.path().join("Archives");
        fs::create_dir_all(&inbox).unwrap();
        fs::create_dir_all(&archive).unwrap();
        PlacementEngine::new(
            inbox,
            archive,
            FuzzyMatcher::default(),
            InboxFilters::default(),
        )
    }

    #[test]
    fn test_place_moves_file_to_primary() {
        let temp = TempDir::new().unwrap();
        let engine = engine(&temp);
        fs::write(temp.path().join("Clippings/my_great_note.md"), "content").unwrap();

        let outcome = engine.place_record(&record("My Great Note.md", "Cat/Sub", None));

        assert_eq!(
            outcome,
            PlacementOutcome::Moved {
                actual_name: "my_great_note.md".to_string(),
                secondary_linked: false,
            }
        );
        assert!(!temp.path().join("Clippings/my_great_note.md").exists());
        let placed = temp.path().join("Archives/Cat/Sub/my_great_note.md");
        assert_eq!(fs::read_to_string(placed).unwrap(), "content");
    }

    #[test]
    fn test_place_creates_secondary_link() {
        let temp = TempDir::new().unwrap();
        let engine = engine(&temp);
        fs::write(temp.path().join("Clippings/note.md"), "linked content").unwrap();

        let outcome = engine.place_record(&record("note.md", "Cat/Sub", Some("Other")));

        assert_eq!(
            outcome,
            PlacementOutcome::Moved {
                actual_name: "note.md".to_string(),
                secondary_linked: true,
            }
        );

        let link = temp.path().join("Archives/Other/note.md");
        let meta = fs::symlink_metadata(&link).unwrap();
        assert!(meta.file_type().is_symlink());
        // The link target is relative and resolves to the primary content.
        assert_eq!(fs::read_to_string(&link).unwrap(), "linked content");
        let target = fs::read_link(&link).unwrap();
        assert!(target.is_relative());
    }

    #[test]
    fn test_place_relink_is_idempotent() {
        let temp = TempDir::new().unwrap();
        let engine = engine(&temp);
        let link_dir = temp.path().join("Archives/Other");
        fs::create_dir_all(&link_dir).unwrap();
        // Stale entry at the link location from an earlier run.
        fs::write(link_dir.join("note.md"), "stale").unwrap();
        fs::write(temp.path().join("Clippings/note.md"), "fresh").unwrap();

        let outcome = engine.place_record(&record("note.md", "Cat/Sub", Some("Other")));

        assert!(matches!(outcome, PlacementOutcome::Moved { .. }));
        assert_eq!(
            fs::read_to_string(link_dir.join("note.md")).unwrap(),
            "fresh"
        );
    }

    #[test]
    fn test_place_not_found_mutates_nothing() {
        let temp = TempDir::new().unwrap();
        let engine = engine(&temp);
        fs::write(temp.path().join("Clippings/unrelated.md"), "content").unwrap();

        let outcome = engine.place_record(&record("Missing Note.md", "Cat/Sub", None));

        match outcome {
            PlacementOutcome::Skipped { reason } => {
                assert!(reason.contains("No matching file"), "reason: {reason}");
            }
            other => panic!("expected skip, got {:?}", other),
        }
        assert!(temp.path().join("Clippings/unrelated.md").exists());
        assert!(!temp.path().join("Archives/Cat").exists());
    }

    #[test]
    fn test_place_missing_inbox_is_skip_not_panic() {
        let temp = TempDir::new().unwrap();
        let engine = PlacementEngine::new(
            temp.path().join("no-such-inbox"),
            temp.path().join("Archives"),
            FuzzyMatcher::default(),
            InboxFilters::default(),
        );

        let outcome = engine.place_record(&record("note.md", "Cat", None));
        assert!(matches!(outcome, PlacementOutcome::Skipped { .. }));
    }

    #[test]
    fn test_verify_copy_detects_size_mismatch() {
        let temp = TempDir::new().unwrap();
        let source = temp.path().join("source.md");
        let dest = temp.path().join("dest.md");
        fs::write(&source, "full content here").unwrap();
        fs::write(&dest, "truncated").unwrap();

        let result = verify_copy(&source, &dest);
        match result {
            Err(PlacementError::IntegrityFailure { detail, .. }) => {
                assert!(detail.contains("size mismatch"), "detail: {detail}");
            }
            other => panic!("expected integrity failure, got {:?}", other),
        }
        // The source is untouched by verification.
        assert_eq!(fs::read_to_string(&source).unwrap(), "full content here");
    }

    #[test]
    fn test_verify_copy_detects_missing_destination() {
        let temp = TempDir::new().unwrap();
        let source = temp.path().join("source.md");
        fs::write(&source, "content").unwrap();

        let result = verify_copy(&source, &temp.path().join("never_copied.md"));
        assert!(matches!(
            result,
            Err(PlacementError::IntegrityFailure { .. })
        ));
    }

    #[test]
    fn test_verify_copy_accepts_identical_sizes() {
        let temp = TempDir::new().unwrap();
        let source = temp.path().join("source.md");
        let dest = temp.path().join("dest.md");
        fs::write(&source, "same bytes").unwrap();
        fs::copy(&source, &dest).unwrap();

        assert!(verify_copy(&source, &dest).is_ok());
    }

    #[test]
    fn test_snapshot_excludes_hidden_files() {
        let temp = TempDir::new().unwrap();
        let engine = engine(&temp);
        fs::write(temp.path().join("Clippings/note.md"), "x").unwrap();
        fs::write(temp.path().join("Clippings/.hidden.md"), "x").unwrap();

        let listing = engine.snapshot_inbox().unwrap();
        assert_eq!(listing, vec!["note.md".to_string()]);
    }

    #[test]
    fn test_guard_passes_with_populated_inbox() {
        let temp = TempDir::new().unwrap();
        let engine = engine(&temp);
        fs::write(temp.path().join("Clippings/note.md"), "x").unwrap();

        let records = vec![record("note.md", "Cat", None)];
        assert!(engine.preflight_guard(&records).is_ok());
    }

    #[test]
    fn test_guard_aborts_when_targets_already_archived() {
        let temp = TempDir::new().unwrap();
        let engine = engine(&temp);
        let archived = temp.path().join("Archives/Cat");
        fs::create_dir_all(&archived).unwrap();
        fs::write(archived.join("note.md"), "already here").unwrap();

        let records = vec![record("note.md", "Cat", None)];
        match engine.preflight_guard(&records) {
            Err(PlacementError::GuardAbort { found, total }) => {
                assert_eq!(found, 1);
                assert_eq!(total, 1);
            }
            other => panic!("expected guard abort, got {:?}", other),
        }
    }

    #[test]
    fn test_guard_proceeds_on_empty_inbox_without_archived_targets() {
        let temp = TempDir::new().unwrap();
        let engine = engine(&temp);

        let records = vec![record("note.md", "Cat", None)];
        assert!(engine.preflight_guard(&records).is_ok());
    }

    #[test]
    fn test_run_stats_counts_outcomes() {
        let mut stats = RunStats::default();
        stats.record(&PlacementOutcome::Moved {
            actual_name: "a.md".to_string(),
            secondary_linked: true,
        });
        stats.record(&PlacementOutcome::Moved {
            actual_name: "b.md".to_string(),
            secondary_linked: false,
        });
        stats.record(&PlacementOutcome::Skipped {
            reason: "not found".to_string(),
        });

        assert_eq!(
            stats,
            RunStats {
                moved: 2,
                linked: 1,
                skipped: 1
            }
        );
    }

    #[test]
    fn test_relative_to_sibling_directories() {
        let rel = relative_to(
            Path::new("/a/Archives/Cat/Sub/note.md"),
            Path::new("/a/Archives/Other"),
        );
        assert_eq!(rel, PathBuf::from("../Cat/Sub/note.md"));
    }

    #[test]
    fn test_relative_to_nested_base() {
        let rel = relative_to(
            Path::new("/a/Archives/Cat/note.md"),
            Path::new("/a/Archives/Cat/Deep/Nested"),
        );
        assert_eq!(rel, PathBuf::from("../../note.md"));
    }

    #[test]
    fn test_relative_to_same_directory() {
        let rel = relative_to(
            Path::new("/a/Archives/Cat/note.md"),
            Path::new("/a/Archives/Cat"),
        );
        assert_eq!(rel, PathBuf::from("note.md"));
    }
}
