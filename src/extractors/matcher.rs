// src/extractors/matcher.rs

// --- Imports ---
use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::taxonomy::Taxonomy;
use crate::utils::config::DEFAULT_FUZZY_THRESHOLD;
use crate::utils::error::MatcherError;

// --- Constants ---
static WHITESPACE_RUN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s+").expect("Failed to compile WHITESPACE_RUN_RE"));

/// A resolved taxonomy code, or `None` when the title is not a taxonomy section.
pub type MatchResult<'t> = Option<&'t str>;

/// Resolves a section title to a taxonomy code.
///
/// Implementations must be pure functions of `(title, taxonomy)`; the indexer
/// calls them once per section marker and never caches results.
pub trait SectionMatcher: fmt::Debug + Send + Sync {
    fn match_title<'t>(&self, title: &str, taxonomy: &'t Taxonomy) -> MatchResult<'t>;
}

/// Collapses every whitespace run (including NBSP and ideographic spaces) to a
/// single space and trims the ends.
pub fn normalize_title(title: &str) -> String {
    WHITESPACE_RUN_RE.replace_all(title, " ").trim().to_string()
}

/// Jaro-Winkler similarity in `[0, 1]`, computed over Unicode scalar values.
pub fn similarity(a: &str, b: &str) -> f64 {
    strsim::jaro_winkler(a, b)
}

/// Verbatim lookup, then lookup with whitespace normalized.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExactMatcher;

impl SectionMatcher for ExactMatcher {
    fn match_title<'t>(&self, title: &str, taxonomy: &'t Taxonomy) -> MatchResult<'t> {
        if let Some(code) = taxonomy.code_for(title) {
            return Some(code);
        }
        taxonomy.code_for(&normalize_title(title))
    }
}

/// Best-scoring taxonomy title, accepted only at or above `threshold`.
///
/// Ties go to the entry declared first in the taxonomy.
#[derive(Debug, Clone, Copy)]
pub struct FuzzyMatcher {
    threshold: f64,
}

impl FuzzyMatcher {
    pub fn new(threshold: f64) -> Result<Self, MatcherError> {
        if !(0.0..=1.0).contains(&threshold) {
            return Err(MatcherError::InvalidThreshold(threshold));
        }
        Ok(Self { threshold })
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// The best candidate and its score, regardless of threshold.
    pub fn best_candidate<'t>(&self, title: &str, taxonomy: &'t Taxonomy) -> Option<(&'t str, f64)> {
        let title_clean = normalize_title(title);
        let mut best: Option<(&'t str, f64)> = None;

        for entry in taxonomy.iter() {
            let score = similarity(&title_clean, &entry.title);
            tracing::trace!("Fuzzy score {:.4} for '{}' vs '{}'", score, title_clean, entry.title);
            // Strict comparison keeps the first of equally scored entries.
            if best.map_or(true, |(_, best_score)| score > best_score) {
                best = Some((entry.code.as_str(), score));
            }
        }
        best
    }
}

impl Default for FuzzyMatcher {
    fn default() -> Self {
        Self { threshold: DEFAULT_FUZZY_THRESHOLD }
    }
}

impl SectionMatcher for FuzzyMatcher {
    fn match_title<'t>(&self, title: &str, taxonomy: &'t Taxonomy) -> MatchResult<'t> {
        let (code, score) = self.best_candidate(title, taxonomy)?;
        if score >= self.threshold {
            tracing::debug!("Fuzzy matched '{}' to {} (score {:.4})", title, code, score);
            Some(code)
        } else {
            None
        }
    }
}

/// Tries each strategy in order and returns the first hit.
#[derive(Debug)]
pub struct CascadeMatcher {
    strategies: Vec<Box<dyn SectionMatcher>>,
}

impl CascadeMatcher {
    pub fn new(strategies: Vec<Box<dyn SectionMatcher>>) -> Result<Self, MatcherError> {
        if strategies.is_empty() {
            return Err(MatcherError::EmptyCascade);
        }
        Ok(Self { strategies })
    }

    pub fn len(&self) -> usize {
        self.strategies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strategies.is_empty()
    }
}

impl SectionMatcher for CascadeMatcher {
    fn match_title<'t>(&self, title: &str, taxonomy: &'t Taxonomy) -> MatchResult<'t> {
        self.strategies
            .iter()
            .find_map(|strategy| strategy.match_title(title, taxonomy))
    }
}

/// Production configuration: exact first, then fuzzy at `threshold`.
pub fn cascade_with_threshold(threshold: f64) -> Result<CascadeMatcher, MatcherError> {
    CascadeMatcher::new(vec![
        Box::new(ExactMatcher),
        Box::new(FuzzyMatcher::new(threshold)?),
    ])
}

/// `Cascade(Exact, Fuzzy(0.90))`.
pub fn default_matcher() -> CascadeMatcher {
    CascadeMatcher {
        strategies: vec![Box::new(ExactMatcher), Box::new(FuzzyMatcher::default())],
    }
}
