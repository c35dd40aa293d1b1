//! Command-line orchestration.
//!
//! Ties the pieces together for one run: configuration loading, archive
//! bootstrap, manifest parsing, the pre-flight guard, the per-record
//! placement loop with progress output, the final summary, and the run
//! report. Also provides a dry-run mode that resolves matches and prints
//! planned placements without touching the filesystem.

use crate::config::{InboxFilters, OrganizeConfig};
use crate::engine::{PlacementEngine, PlacementError, PlacementOutcome};
use crate::insights;
use crate::layout;
use crate::manifest::{self, ManifestRecord};
use crate::output::OutputFormatter;
use crate::report::RunReport;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Filesystem locations for one run.
#[derive(Debug, Clone)]
pub struct RunPaths {
    /// The manifest file mapping note filenames to categories.
    pub manifest: PathBuf,
    /// The flat inbox directory holding unorganized notes.
    pub inbox: PathBuf,
    /// The archive root the category tree lives under.
    pub archive_root: PathBuf,
}

/// Runs the organizer with default configuration lookup.
pub fn run_cli(paths: &RunPaths, dry_run: bool) -> Result<(), String> {
    run_cli_with_config(paths, dry_run, None)
}

/// Runs the organizer, optionally with an explicit configuration file.
///
/// Per-record failures are reported and counted but never abort the run;
/// only setup failures (unreadable config or manifest, missing inbox) and
/// the pre-flight guard end it early.
pub fn run_cli_with_config(
    paths: &RunPaths,
    dry_run: bool,
    config_path: Option<&Path>,
) -> Result<(), String> {
    let config = OrganizeConfig::load(config_path)
        .map_err(|e| format!("Error loading configuration: {}", e))?;
    let matcher = config
        .matcher
        .build()
        .map_err(|e| format!("Error in matcher configuration: {}", e))?;
    let filters = InboxFilters::compile(&config.filters)
        .map_err(|e| format!("Error compiling filters: {}", e))?;

    if !paths.inbox.is_dir() {
        return Err(format!(
            "Inbox directory not found: {}",
            paths.inbox.display()
        ));
    }

    let records = manifest::parse_manifest(&paths.manifest).map_err(|e| e.to_string())?;

    let engine = PlacementEngine::new(
        paths.inbox.clone(),
        paths.archive_root.clone(),
        matcher,
        filters,
    );

    if dry_run {
        return dry_run_records(&engine, &records, paths);
    }

    match engine.preflight_guard(&records) {
        Ok(()) => {}
        Err(e @ PlacementError::GuardAbort { .. }) => {
            OutputFormatter::warning(&e.to_string());
            return Ok(());
        }
        Err(e) => return Err(e.to_string()),
    }

    layout::bootstrap_archive(&paths.archive_root)
        .map_err(|e| format!("Error creating archive layout: {}", e))?;

    organize_records(&engine, &records, paths);
    Ok(())
}

/// The placement loop: process every record, print outcomes, tally stats,
/// and persist the run report.
fn organize_records(engine: &PlacementEngine, records: &[ManifestRecord], paths: &RunPaths) {
    OutputFormatter::info(&format!(
        "Organizing {} -> {}",
        paths.inbox.display(),
        paths.archive_root.display()
    ));

    let mut report = RunReport::new(&paths.manifest);
    let total = records.len();
    let progress = OutputFormatter::create_progress_bar(total as u64);

    for (index, record) in records.iter().enumerate() {
        progress.suspend(|| {
            OutputFormatter::record_progress(index + 1, total, &record.declared_name);
        });

        let outcome = engine.place_record(record);
        progress.suspend(|| match &outcome {
            PlacementOutcome::Moved {
                actual_name,
                secondary_linked,
            } => {
                OutputFormatter::success(&format!(
                    "  Moved to {}/",
                    record.primary_category
                ));
                if *secondary_linked
                    && let Some(secondary) = &record.secondary_category
                {
                    OutputFormatter::success(&format!("  Linked to {}/", secondary));
                }
                update_insights_index(record, actual_name, paths);
            }
            PlacementOutcome::Skipped { reason } => {
                OutputFormatter::error(&format!("  {}", reason));
            }
        });

        report.add(record, &outcome);
        progress.inc(1);
    }

    progress.finish_and_clear();
    OutputFormatter::summary(&report.stats);

    if let Err(e) = report.save(&paths.archive_root) {
        OutputFormatter::warning(&format!("Could not save run report: {}", e));
    }
}

/// Appends the placed note's insight to the archive index.
///
/// The move has already been verified at this point, so an index failure is
/// only a warning: reclassifying the record as skipped would misstate what
/// happened on disk.
fn update_insights_index(record: &ManifestRecord, actual_name: &str, paths: &RunPaths) {
    let primary_path = paths
        .archive_root
        .join(&record.primary_category)
        .join(actual_name);
    let insight = insights::extract_insight(&primary_path);

    let root_label = paths
        .archive_root
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| paths.archive_root.display().to_string());
    let pointer = format!("{}/{}/{}", root_label, record.primary_category, actual_name);

    match insights::append_to_index(&paths.archive_root, &insight, &pointer) {
        Ok(true) => OutputFormatter::success("  Added to insights index"),
        Ok(false) => {}
        Err(e) => OutputFormatter::warning(&format!("  Could not update insights index: {}", e)),
    }
}

/// Resolves matches and prints planned placements without mutating anything.
fn dry_run_records(
    engine: &PlacementEngine,
    records: &[ManifestRecord],
    paths: &RunPaths,
) -> Result<(), String> {
    OutputFormatter::dry_run_notice(&format!(
        "Analyzing {} against {}",
        paths.manifest.display(),
        paths.inbox.display()
    ));

    if records.is_empty() {
        OutputFormatter::plain("No manifest records to process.");
        return Ok(());
    }

    // No files move in a dry run, so one snapshot serves every record.
    let listing = engine.snapshot_inbox().map_err(|e| e.to_string())?;

    let mut planned_moves = 0usize;
    let mut planned_links = 0usize;
    let mut unmatched = 0usize;
    let mut category_counts: HashMap<&str, usize> = HashMap::new();

    for record in records {
        match engine.matcher().find_match(&record.declared_name, &listing) {
            Some(actual_name) => {
                OutputFormatter::plain(&format!(" - {}", record.declared_name));
                OutputFormatter::plain(&format!(
                    "   → Would move {} to {}/",
                    actual_name, record.primary_category
                ));
                planned_moves += 1;
                *category_counts
                    .entry(record.primary_category.as_str())
                    .or_insert(0) += 1;
                if let Some(secondary) = &record.secondary_category {
                    OutputFormatter::plain(&format!("   → Would link into {}/", secondary));
                    planned_links += 1;
                }
            }
            None => {
                OutputFormatter::plain(&format!(" - {}", record.declared_name));
                OutputFormatter::plain("   → No matching file in inbox");
                unmatched += 1;
            }
        }
    }

    OutputFormatter::header("DRY RUN SUMMARY");
    OutputFormatter::plain(&format!("Planned moves: {}", planned_moves));
    OutputFormatter::plain(&format!("Planned links: {}", planned_links));
    OutputFormatter::plain(&format!("Unmatched records: {}", unmatched));

    let mut categories: Vec<_> = category_counts.into_iter().collect();
    categories.sort_by_key(|&(name, _)| name);
    for (category, count) in categories {
        OutputFormatter::plain(&format!(
            "  {}: {} {}",
            category,
            count,
            if count == 1 { "file" } else { "files" }
        ));
    }

    OutputFormatter::success("Dry run complete. No files were modified.");
    Ok(())
}
