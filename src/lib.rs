//! clipsort - a manifest-driven note archiver
//!
//! This library relocates note files from a flat inbox directory into a
//! categorized archive tree. A declarative manifest maps each note to a
//! primary (and optionally secondary) category; declared filenames are
//! resolved against the inbox with fuzzy matching, and every relocation is
//! copy-verify-delete so a source file is never removed before a verified
//! duplicate exists.

pub mod cli;
pub mod config;
pub mod engine;
pub mod insights;
pub mod layout;
pub mod manifest;
pub mod matcher;
pub mod output;
pub mod report;

pub use config::{ConfigError, InboxFilters, OrganizeConfig};
pub use engine::{PlacementEngine, PlacementError, PlacementOutcome, RunStats};
pub use manifest::{ManifestError, ManifestRecord};
pub use matcher::{FuzzyMatcher, normalize};
pub use report::RunReport;

pub use cli::{RunPaths, run_cli};
