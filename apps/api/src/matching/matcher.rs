//! Skill Matcher — decides, per job skill, whether the resume covers it exactly,
//! by a close paraphrase, or not at all.
//!
//! Algorithm, for each normalized job skill:
//! 1. identifier present verbatim in the resume set → `PresentExact`
//! 2. else the best `similarity(job_skill, resume_skill)` over all resume skills;
//!    strictly above the threshold → `PresentSemantic(best)`
//! 3. else `Absent`
//!
//! An oracle error degrades that job skill to `Absent` and is counted in
//! `SkillMatches::oracle_failures`.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::errors::AnalysisError;
use crate::matching::similarity::{clamp_similarity, OracleUnavailable, SimilarityOracle};
use crate::models::skill::normalize_skill;

pub const DEFAULT_SIMILARITY_THRESHOLD: f64 = 0.75;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MatcherConfig {
    pub similarity_threshold: f64,
}

impl Default for MatcherConfig {
    fn default() -> Self {
        Self {
            similarity_threshold: DEFAULT_SIMILARITY_THRESHOLD,
        }
    }
}

impl MatcherConfig {
    pub fn validate(&self) -> Result<(), AnalysisError> {
        let t = self.similarity_threshold;
        if !t.is_finite() || !(0.0..=1.0).contains(&t) {
            return Err(AnalysisError::InvalidInput(format!(
                "similarity_threshold must be within [0, 1], got {t}"
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MatchVerdict {
    PresentExact,
    PresentSemantic { similarity: f64 },
    Absent,
}

impl MatchVerdict {
    /// Fraction of the requirement this verdict satisfies.
    pub fn credit(&self) -> f64 {
        match self {
            MatchVerdict::PresentExact => 1.0,
            MatchVerdict::PresentSemantic { similarity } => *similarity,
            MatchVerdict::Absent => 0.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkillMatches {
    /// Keyed by normalized job skill identifier.
    pub verdicts: BTreeMap<String, MatchVerdict>,
    pub oracle_failures: u32,
}

/// Matches job skills against resume skills. Both inputs are raw names;
/// they are normalized before comparison.
pub fn match_skills<R, J>(
    resume_skills: &[R],
    job_skills: &[J],
    oracle: &dyn SimilarityOracle,
    config: &MatcherConfig,
) -> Result<SkillMatches, AnalysisError>
where
    R: AsRef<str>,
    J: AsRef<str>,
{
    config.validate()?;
    let resume = normalize_set(resume_skills, "resume_skills")?;
    let job = normalize_set(job_skills, "job_skills")?;

    let mut verdicts = BTreeMap::new();
    let mut oracle_failures = 0u32;

    for job_skill in &job {
        if resume.contains(job_skill) {
            verdicts.insert(job_skill.clone(), MatchVerdict::PresentExact);
            continue;
        }

        let verdict = match best_similarity(job_skill, &resume, oracle) {
            Ok(Some(best)) if best > config.similarity_threshold => {
                MatchVerdict::PresentSemantic { similarity: best }
            }
            Ok(_) => MatchVerdict::Absent,
            Err(e) => {
                debug!(skill = %job_skill, "oracle failed, treating as absent: {e}");
                oracle_failures += 1;
                MatchVerdict::Absent
            }
        };
        verdicts.insert(job_skill.clone(), verdict);
    }

    if oracle_failures > 0 {
        warn!(
            failures = oracle_failures,
            backend = oracle.backend(),
            "Similarity oracle unavailable for some skills; semantic matching skipped"
        );
    }

    Ok(SkillMatches {
        verdicts,
        oracle_failures,
    })
}

fn best_similarity(
    job_skill: &str,
    resume: &BTreeSet<String>,
    oracle: &dyn SimilarityOracle,
) -> Result<Option<f64>, OracleUnavailable> {
    let mut best: Option<f64> = None;
    for resume_skill in resume {
        let score = clamp_similarity(oracle.similarity(job_skill, resume_skill)?);
        if best.map_or(true, |b| score > b) {
            best = Some(score);
        }
    }
    Ok(best)
}

fn normalize_set<S: AsRef<str>>(
    skills: &[S],
    field: &str,
) -> Result<BTreeSet<String>, AnalysisError> {
    if skills.is_empty() {
        return Err(AnalysisError::InvalidInput(format!("{field} cannot be empty")));
    }
    skills
        .iter()
        .map(|raw| {
            let id = normalize_skill(raw.as_ref());
            if id.is_empty() {
                Err(AnalysisError::InvalidInput(format!(
                    "{field} contains an empty skill identifier"
                )))
            } else {
                Ok(id)
            }
        })
        .collect()
}
