//! Configuration for matcher tuning and inbox file filtering.
//!
//! Configuration is stored in TOML:
//!
//! ```toml
//! [matcher]
//! similarity_threshold = 0.8
//! prefix_window = 50
//!
//! [filters]
//! enable_hidden_files = false
//!
//! [filters.exclude]
//! filenames = [".DS_Store", "Thumbs.db"]
//! patterns = ["*.tmp"]
//! extensions = ["bak"]
//! regex = []
//!
//! [filters.include]
//! patterns = []
//! ```
//!
//! The `[matcher]` section tunes fuzzy matching; the similarity threshold
//! and prefix window were fixed constants in earlier versions of this tool
//! but their fit for very short or near-duplicate titles is unverified, so
//! they are exposed here. The `[filters]` section controls which inbox files
//! are eligible for placement at all.

use crate::matcher::{DEFAULT_PREFIX_WINDOW, DEFAULT_SIMILARITY_THRESHOLD, FuzzyMatcher};
use glob::Pattern;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

/// Errors that can occur during configuration loading and validation.
#[derive(Debug, Clone)]
pub enum ConfigError {
    /// Configuration file not found at the specified path.
    ConfigNotFound(PathBuf),
    /// Invalid TOML syntax or structure.
    ConfigInvalid(String),
    /// Invalid glob pattern in a filter rule.
    InvalidGlobPattern(String),
    /// Invalid regex pattern with the compile error reason.
    InvalidRegexPattern { pattern: String, reason: String },
    /// Similarity threshold outside the valid (0, 1] range.
    InvalidThreshold(f64),
    /// Prefix window of zero would make every candidate eligible.
    InvalidPrefixWindow,
    /// IO error while reading configuration.
    IoError(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::ConfigNotFound(path) => {
                write!(f, "Configuration file not found: {}", path.display())
            }
            ConfigError::ConfigInvalid(msg) => write!(f, "Invalid configuration: {}", msg),
            ConfigError::InvalidGlobPattern(pattern) => {
                write!(f, "Invalid glob pattern '{}'", pattern)
            }
            ConfigError::InvalidRegexPattern { pattern, reason } => {
                write!(f, "Invalid regex pattern '{}': {}", pattern, reason)
            }
            ConfigError::InvalidThreshold(value) => {
                write!(
                    f,
                    "Similarity threshold {} is outside the valid range (0, 1]",
                    value
                )
            }
            ConfigError::InvalidPrefixWindow => {
                write!(f, "Prefix window must be greater than zero")
            }
            ConfigError::IoError(msg) => write!(f, "IO error reading configuration: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Top-level configuration, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OrganizeConfig {
    /// Fuzzy matcher tuning.
    #[serde(default)]
    pub matcher: MatcherConfig,
    /// Inbox file filtering rules.
    #[serde(default)]
    pub filters: FilterRules,
}

/// Fuzzy matcher tuning parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatcherConfig {
    /// Minimum similarity score (exclusive) for a match to be accepted.
    #[serde(default = "default_similarity_threshold")]
    pub similarity_threshold: f64,
    /// Leading characters considered in the eligibility prefix test.
    #[serde(default = "default_prefix_window")]
    pub prefix_window: usize,
}

fn default_similarity_threshold() -> f64 {
    DEFAULT_SIMILARITY_THRESHOLD
}

fn default_prefix_window() -> usize {
    DEFAULT_PREFIX_WINDOW
}

impl Default for MatcherConfig {
    fn default() -> Self {
        Self {
            similarity_threshold: DEFAULT_SIMILARITY_THRESHOLD,
            prefix_window: DEFAULT_PREFIX_WINDOW,
        }
    }
}

impl MatcherConfig {
    /// Validates the tuning parameters and builds a matcher from them.
    pub fn build(&self) -> Result<FuzzyMatcher, ConfigError> {
        if !(self.similarity_threshold > 0.0 && self.similarity_threshold <= 1.0) {
            return Err(ConfigError::InvalidThreshold(self.similarity_threshold));
        }
        if self.prefix_window == 0 {
            return Err(ConfigError::InvalidPrefixWindow);
        }
        Ok(FuzzyMatcher::new(
            self.similarity_threshold,
            self.prefix_window,
        ))
    }
}

/// Rules deciding which inbox files are eligible for placement.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilterRules {
    /// Whether to include hidden files (starting with "."). Defaults to false.
    #[serde(default)]
    pub enable_hidden_files: bool,

    /// Rules for excluding files.
    #[serde(default)]
    pub exclude: ExcludeRules,

    /// Whitelist rules that override exclude rules.
    #[serde(default)]
    pub include: IncludeRules,
}

impl Default for FilterRules {
    fn default() -> Self {
        Self {
            enable_hidden_files: false,
            exclude: ExcludeRules::default(),
            include: IncludeRules::default(),
        }
    }
}

/// Rules for excluding inbox files from placement.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExcludeRules {
    /// Exact filenames to exclude (e.g., ".DS_Store").
    #[serde(default)]
    pub filenames: Vec<String>,

    /// Glob patterns to exclude (e.g., "*.tmp").
    #[serde(default)]
    pub patterns: Vec<String>,

    /// File extensions to exclude (e.g., "bak").
    #[serde(default)]
    pub extensions: Vec<String>,

    /// Regex patterns to exclude.
    #[serde(default)]
    pub regex: Vec<String>,
}

/// Whitelist rules, overriding exclude rules.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IncludeRules {
    /// Glob patterns that override exclude rules.
    #[serde(default)]
    pub patterns: Vec<String>,
}

impl OrganizeConfig {
    /// Load configuration with fallback to defaults.
    ///
    /// Order: explicit `config_path`, then `.clipsortrc.toml` in the current
    /// directory, then `~/.config/clipsort/config.toml`, then defaults.
    ///
    /// # Errors
    ///
    /// Returns an error only when an explicitly provided file cannot be
    /// read or parsed.
    pub fn load(config_path: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = config_path {
            return Self::load_from_file(path);
        }

        let local_config = PathBuf::from(".clipsortrc.toml");
        if local_config.exists() {
            return Self::load_from_file(&local_config);
        }

        if let Ok(home) = std::env::var("HOME") {
            let home_config = PathBuf::from(home)
                .join(".config")
                .join("clipsort")
                .join("config.toml");
            if home_config.exists() {
                return Self::load_from_file(&home_config);
            }
        }

        Ok(Self::default())
    }

    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::ConfigNotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path).map_err(|e| ConfigError::IoError(e.to_string()))?;

        toml::from_str(&content).map_err(|e| ConfigError::ConfigInvalid(e.to_string()))
    }
}

/// Compiled filter structures for efficient per-file eligibility checks.
///
/// Glob and regex rules are compiled once at startup so that inbox
/// snapshots, which happen per manifest record, only pay for matching.
pub struct InboxFilters {
    enable_hidden_files: bool,
    exclude_filenames: HashSet<String>,
    exclude_extensions: HashSet<String>,
    exclude_patterns: Vec<Pattern>,
    exclude_regexes: Vec<Regex>,
    include_patterns: Vec<Pattern>,
}

impl InboxFilters {
    /// Compile filter rules, validating every pattern.
    pub fn compile(rules: &FilterRules) -> Result<Self, ConfigError> {
        let exclude_patterns = rules
            .exclude
            .patterns
            .iter()
            .map(|pattern| {
                Pattern::new(pattern).map_err(|_| ConfigError::InvalidGlobPattern(pattern.clone()))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let include_patterns = rules
            .include
            .patterns
            .iter()
            .map(|pattern| {
                Pattern::new(pattern).map_err(|_| ConfigError::InvalidGlobPattern(pattern.clone()))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let exclude_regexes = rules
            .exclude
            .regex
            .iter()
            .map(|pattern| {
                Regex::new(pattern).map_err(|e| ConfigError::InvalidRegexPattern {
                    pattern: pattern.clone(),
                    reason: e.to_string(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            enable_hidden_files: rules.enable_hidden_files,
            exclude_filenames: rules.exclude.filenames.iter().cloned().collect(),
            exclude_extensions: rules
                .exclude
                .extensions
                .iter()
                .map(|ext| ext.to_lowercase())
                .collect(),
            exclude_patterns,
            exclude_regexes,
            include_patterns,
        })
    }

    /// Check whether an inbox file is eligible for placement.
    ///
    /// Order, with early termination: include whitelist, hidden-file gate,
    /// exact filename, extension, glob, regex, then include by default.
    pub fn is_eligible(&self, file_path: &Path) -> bool {
        let file_name = file_path
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_default();

        if self.matches_any(&self.include_patterns, file_path) {
            return true;
        }

        if !self.enable_hidden_files && file_name.starts_with('.') {
            return false;
        }

        if self.exclude_filenames.contains(file_name.as_ref()) {
            return false;
        }

        if let Some(ext) = file_path.extension() {
            let ext_lower = ext.to_string_lossy().to_lowercase();
            if self.exclude_extensions.contains(&ext_lower) {
                return false;
            }
        }

        if self.matches_any(&self.exclude_patterns, file_path) {
            return false;
        }

        if self
            .exclude_regexes
            .iter()
            .any(|regex| regex.is_match(&file_name))
        {
            return false;
        }

        true
    }

    fn matches_any(&self, patterns: &[Pattern], file_path: &Path) -> bool {
        patterns
            .iter()
            .any(|pattern| pattern.matches_path(file_path))
    }
}

impl Default for InboxFilters {
    fn default() -> Self {
        Self {
            enable_hidden_files: false,
            exclude_filenames: HashSet::new(),
            exclude_extensions: HashSet::new(),
            exclude_patterns: Vec::new(),
            exclude_regexes: Vec::new(),
            include_patterns: Vec::new(),
        }
    }
}
