//! Similarity oracles — pluggable `(skill, skill) -> [0, 1]` scorers used by the matcher.
//!
//! `AppState` holds an `Arc<dyn SimilarityOracle>` chosen at startup via
//! `SIMILARITY_BACKEND`. Callers may layer a `PairwiseTable` of externally computed
//! scores (e.g. embedding cosine similarity) on top of it per request.

use std::collections::HashMap;
use std::str::FromStr;
use std::sync::Arc;

use thiserror::Error;

use crate::models::skill::normalize_skill;

#[derive(Debug, Clone, Error)]
#[error("similarity oracle unavailable: {0}")]
pub struct OracleUnavailable(pub String);

/// Scores how closely two normalized skill identifiers name the same skill.
pub trait SimilarityOracle: Send + Sync {
    fn similarity(&self, a: &str, b: &str) -> Result<f64, OracleUnavailable>;

    /// Backend label reported back to callers for transparency.
    fn backend(&self) -> &'static str;
}

/// Clamps raw oracle output into [0, 1]. NaN counts as no similarity.
pub fn clamp_similarity(raw: f64) -> f64 {
    if raw.is_nan() {
        0.0
    } else {
        raw.clamp(0.0, 1.0)
    }
}

/// No semantic backend: every non-exact skill is reported absent.
pub struct NoSimilarity;

impl SimilarityOracle for NoSimilarity {
    fn similarity(&self, _a: &str, _b: &str) -> Result<f64, OracleUnavailable> {
        Err(OracleUnavailable(
            "no similarity backend configured".to_string(),
        ))
    }

    fn backend(&self) -> &'static str {
        "none"
    }
}

/// Normalized Levenshtein similarity. Good at spelling variants ("postgres" ~ "postgresql")
/// without pairing short prefixes ("java" vs "javascript").
pub struct LevenshteinSimilarity;

impl SimilarityOracle for LevenshteinSimilarity {
    fn similarity(&self, a: &str, b: &str) -> Result<f64, OracleUnavailable> {
        Ok(strsim::normalized_levenshtein(a, b))
    }

    fn backend(&self) -> &'static str {
        "levenshtein"
    }
}

/// Jaro-Winkler similarity. Rewards shared prefixes more aggressively.
pub struct JaroWinklerSimilarity;

impl SimilarityOracle for JaroWinklerSimilarity {
    fn similarity(&self, a: &str, b: &str) -> Result<f64, OracleUnavailable> {
        Ok(strsim::jaro_winkler(a, b))
    }

    fn backend(&self) -> &'static str {
        "jaro_winkler"
    }
}

/// Caller-supplied pairwise scores. Lookups are symmetric.
///
/// Pairs missing from the table go to the fallback oracle when one is set,
/// otherwise they score 0.0.
pub struct PairwiseTable {
    scores: HashMap<(String, String), f64>,
    fallback: Option<Arc<dyn SimilarityOracle>>,
}

impl PairwiseTable {
    pub fn new<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (String, String, f64)>,
    {
        let scores = pairs
            .into_iter()
            .map(|(a, b, score)| {
                (
                    ordered_key(&normalize_skill(&a), &normalize_skill(&b)),
                    clamp_similarity(score),
                )
            })
            .collect();
        Self {
            scores,
            fallback: None,
        }
    }

    pub fn with_fallback(mut self, oracle: Arc<dyn SimilarityOracle>) -> Self {
        self.fallback = Some(oracle);
        self
    }

    pub fn len(&self) -> usize {
        self.scores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }
}

fn ordered_key(a: &str, b: &str) -> (String, String) {
    if a <= b {
        (a.to_string(), b.to_string())
    } else {
        (b.to_string(), a.to_string())
    }
}

impl SimilarityOracle for PairwiseTable {
    fn similarity(&self, a: &str, b: &str) -> Result<f64, OracleUnavailable> {
        if let Some(score) = self.scores.get(&ordered_key(a, b)) {
            return Ok(*score);
        }
        match &self.fallback {
            Some(oracle) => oracle.similarity(a, b),
            None => Ok(0.0),
        }
    }

    fn backend(&self) -> &'static str {
        "pairwise_table"
    }
}

/// Startup-selectable oracle backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimilarityBackend {
    Levenshtein,
    JaroWinkler,
    None,
}

impl SimilarityBackend {
    pub fn build(self) -> Arc<dyn SimilarityOracle> {
        match self {
            SimilarityBackend::Levenshtein => Arc::new(LevenshteinSimilarity),
            SimilarityBackend::JaroWinkler => Arc::new(JaroWinklerSimilarity),
            SimilarityBackend::None => Arc::new(NoSimilarity),
        }
    }
}

impl FromStr for SimilarityBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "levenshtein" => Ok(SimilarityBackend::Levenshtein),
            "jaro_winkler" | "jaro-winkler" => Ok(SimilarityBackend::JaroWinkler),
            "none" | "off" => Ok(SimilarityBackend::None),
            other => Err(format!(
                "unknown similarity backend '{other}' (expected levenshtein, jaro_winkler or none)"
            )),
        }
    }
}
