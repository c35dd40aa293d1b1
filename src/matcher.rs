/// Fuzzy filename matching for resolving manifest entries against disk files.
///
/// Manifest entries are written by hand and often differ from the actual
/// filenames in punctuation, case, or whitespace. This module canonicalizes
/// both sides into a comparison key and scores candidates by normalized
/// common-prefix similarity.

/// Canonicalizes a filename string into a comparison key.
///
/// Lower-cases the input, strips every character that is not alphanumeric,
/// a space, or a hyphen (stripped characters separate words, so `a_b` and
/// `a b` produce the same key), collapses whitespace runs to single spaces,
/// and trims the ends. Pure and idempotent. The result is only ever used as
/// a comparison key, never for filesystem access.
///
/// # Examples
///
/// ```
/// use clipsort::matcher::normalize;
///
/// assert_eq!(normalize("My_Great  Note.md"), "my great note md");
/// assert_eq!(normalize("AI & Ethics!"), "ai ethics");
/// ```
pub fn normalize(name: &str) -> String {
    let kept: String = name
        .to_lowercase()
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || c == '-' {
                c
            } else {
                ' '
            }
        })
        .collect();
    kept.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Default similarity threshold: a candidate must score strictly above this.
pub const DEFAULT_SIMILARITY_THRESHOLD: f64 = 0.8;

/// Default prefix window: eligibility compares at most this many leading
/// characters of the normalized forms.
pub const DEFAULT_PREFIX_WINDOW: usize = 50;

/// Scores directory candidates against a declared manifest filename.
///
/// The threshold and prefix window default to values tuned on real note
/// collections; both are configurable via the `[matcher]` config section.
#[derive(Debug, Clone)]
pub struct FuzzyMatcher {
    /// Minimum similarity score (exclusive) for a match to be accepted.
    pub similarity_threshold: f64,
    /// Number of leading characters considered in the eligibility prefix test.
    pub prefix_window: usize,
}

impl Default for FuzzyMatcher {
    fn default() -> Self {
        Self {
            similarity_threshold: DEFAULT_SIMILARITY_THRESHOLD,
            prefix_window: DEFAULT_PREFIX_WINDOW,
        }
    }
}

impl FuzzyMatcher {
    /// Creates a matcher with explicit tuning parameters.
    pub fn new(similarity_threshold: f64, prefix_window: usize) -> Self {
        Self {
            similarity_threshold,
            prefix_window,
        }
    }

    /// Finds the best-matching candidate filename for a declared name.
    ///
    /// Hidden files (leading `.`) are never considered. A candidate is
    /// eligible only if one normalized form, truncated to the prefix window,
    /// is a prefix of the other; eligible candidates are scored as the
    /// length of the common prefix of the full normalized forms divided by
    /// the length of the longer form. The first candidate reaching the
    /// maximum score wins (listing order is the tie-break), and only scores
    /// strictly above the threshold are returned. Ambiguity resolves to
    /// `None`: the matcher never guesses between weak candidates.
    ///
    /// An empty declared name returns `None` immediately, since an empty
    /// normalized target would be a prefix of everything.
    pub fn find_match(&self, declared_name: &str, candidates: &[String]) -> Option<String> {
        let target: Vec<char> = normalize(declared_name).chars().collect();
        if target.is_empty() {
            return None;
        }

        let mut best_match: Option<&String> = None;
        let mut best_score = 0.0_f64;

        for candidate in candidates {
            if candidate.starts_with('.') {
                continue;
            }

            let actual: Vec<char> = normalize(candidate).chars().collect();
            if !self.prefix_eligible(&target, &actual) {
                continue;
            }

            let common = common_prefix_len(&target, &actual);
            let longer = target.len().max(actual.len());
            let score = common as f64 / longer as f64;
            if score > best_score {
                best_score = score;
                best_match = Some(candidate);
            }
        }

        if best_score > self.similarity_threshold {
            best_match.cloned()
        } else {
            None
        }
    }

    /// Prefix eligibility test on the truncated normalized forms.
    ///
    /// Truncation bounds comparison cost and tolerates long titles that
    /// diverge only past the window.
    fn prefix_eligible(&self, target: &[char], actual: &[char]) -> bool {
        let target_window = &target[..target.len().min(self.prefix_window)];
        let actual_window = &actual[..actual.len().min(self.prefix_window)];
        actual.starts_with(target_window) || target.starts_with(actual_window)
    }
}

/// Length of the longest common prefix of two character sequences.
fn common_prefix_len(a: &[char], b: &[char]) -> usize {
    a.iter().zip(b.iter()).take_while(|(x, y)| x == y).count()
}
