//! Run report persistence.
//!
//! After a completed run, a JSON report with the timestamp, final counters,
//! and per-record outcomes is written into the archive root. The report is
//! an observability artifact for inspecting what a past run did; it drives
//! no behavior.

use crate::engine::{PlacementOutcome, RunStats};
use crate::manifest::ManifestRecord;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Name of the report file kept at the archive root.
pub const REPORT_FILE: &str = ".clipsort_report.json";

/// Errors that can occur while persisting or loading a report.
#[derive(Debug)]
pub enum ReportError {
    /// Failed to serialize or write the report file.
    WriteFailed { reason: String },
    /// Failed to read the report file.
    ReadFailed { source: std::io::Error },
    /// Report file has invalid contents.
    InvalidFormat { reason: String },
}

impl std::fmt::Display for ReportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReportError::WriteFailed { reason } => {
                write!(f, "Failed to write run report: {}", reason)
            }
            ReportError::ReadFailed { source } => {
                write!(f, "Failed to read run report: {}", source)
            }
            ReportError::InvalidFormat { reason } => {
                write!(f, "Invalid run report format: {}", reason)
            }
        }
    }
}

impl std::error::Error for ReportError {}

/// The recorded outcome of one manifest record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportEntry {
    /// The filename as declared in the manifest.
    pub declared_name: String,
    /// "moved" or "skipped".
    pub status: String,
    /// The resolved on-disk filename, for moved entries.
    pub actual_name: Option<String>,
    /// Whether a secondary link was created.
    pub secondary_linked: bool,
    /// Skip reason, for skipped entries.
    pub reason: Option<String>,
}

/// A complete record of one run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunReport {
    /// ISO 8601 timestamp of when the run completed recording.
    pub timestamp: String,
    /// The manifest the run was driven by.
    pub manifest: String,
    /// Final counters.
    pub stats: RunStats,
    /// Per-record outcomes in manifest order.
    pub entries: Vec<ReportEntry>,
}

impl RunReport {
    /// Creates an empty report for a manifest.
    pub fn new(manifest: &Path) -> Self {
        Self {
            timestamp: Utc::now().to_rfc3339(),
            manifest: manifest.display().to_string(),
            stats: RunStats::default(),
            entries: Vec::new(),
        }
    }

    /// Records one record's outcome and updates the counters.
    pub fn add(&mut self, record: &ManifestRecord, outcome: &PlacementOutcome) {
        self.stats.record(outcome);
        let entry = match outcome {
            PlacementOutcome::Moved {
                actual_name,
                secondary_linked,
            } => ReportEntry {
                declared_name: record.declared_name.clone(),
                status: "moved".to_string(),
                actual_name: Some(actual_name.clone()),
                secondary_linked: *secondary_linked,
                reason: None,
            },
            PlacementOutcome::Skipped { reason } => ReportEntry {
                declared_name: record.declared_name.clone(),
                status: "skipped".to_string(),
                actual_name: None,
                secondary_linked: false,
                reason: Some(reason.clone()),
            },
        };
        self.entries.push(entry);
    }

    /// Saves this report into the archive root, replacing any previous one.
    pub fn save(&self, archive_root: &Path) -> Result<(), ReportError> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| ReportError::WriteFailed {
                reason: e.to_string(),
            })?;
        fs::write(archive_root.join(REPORT_FILE), json).map_err(|e| ReportError::WriteFailed {
            reason: e.to_string(),
        })
    }

    /// Loads the report from the archive root, if one exists.
    pub fn load(archive_root: &Path) -> Result<Option<Self>, ReportError> {
        let path = archive_root.join(REPORT_FILE);
        if !path.exists() {
            return Ok(None);
        }

        let json = fs::read_to_string(&path).map_err(|e| ReportError::ReadFailed { source: e })?;
        serde_json::from_str(&json)
            .map(Some)
            .map_err(|e| ReportError::InvalidFormat {
                reason: e.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn sample_record() -> ManifestRecord {
        ManifestRecord {
            declared_name: "note.md".to_string(),
            primary_category: "Cat/Sub".to_string(),
            secondary_category: Some("Other".to_string()),
        }
    }

    #[test]
    fn test_add_updates_stats_and_entries() {
        let mut report = RunReport::new(Path::new("manifest.txt"));
        report.add(
            &sample_record(),
            &PlacementOutcome::Moved {
                actual_name: "note.md".to_string(),
                secondary_linked: true,
            },
        );
        report.add(
            &sample_record(),
            &PlacementOutcome::Skipped {
                reason: "not found".to_string(),
            },
        );

        assert_eq!(report.stats.moved, 1);
        assert_eq!(report.stats.linked, 1);
        assert_eq!(report.stats.skipped, 1);
        assert_eq!(report.entries.len(), 2);
        assert_eq!(report.entries[0].status, "moved");
        assert_eq!(report.entries[1].reason, Some("not found".to_string()));
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let temp = TempDir::new().unwrap();
        let mut report = RunReport::new(Path::new("manifest.txt"));
        report.add(
            &sample_record(),
            &PlacementOutcome::Moved {
                actual_name: "note.md".to_string(),
                secondary_linked: false,
            },
        );

        report.save(temp.path()).expect("save failed");
        let loaded = RunReport::load(temp.path())
            .expect("load failed")
            .expect("report missing");
        assert_eq!(loaded, report);
    }

    #[test]
    fn test_load_missing_report() {
        let temp = TempDir::new().unwrap();
        assert!(RunReport::load(temp.path()).unwrap().is_none());
    }

    #[test]
    fn test_load_rejects_invalid_json() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join(REPORT_FILE), "not json").unwrap();
        assert!(matches!(
            RunReport::load(temp.path()),
            Err(ReportError::InvalidFormat { .. })
        ));
    }
}
