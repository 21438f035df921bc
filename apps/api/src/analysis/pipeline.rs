//! Request-level pipeline: builds the job profile and remediation catalog from a
//! request, then runs match → score (→ optimize → project).
//!
//! All functions here are CPU-bound and synchronous. The service config and the
//! default oracle arrive as explicit arguments, so the pipeline has no hidden state.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

use crate::analysis::AnalysisConfig;
use crate::errors::AnalysisError;
use crate::matching::matcher::{match_skills, MatchVerdict, MatcherConfig};
use crate::matching::similarity::{PairwiseTable, SimilarityOracle};
use crate::models::plan::{Constraints, GapEntry, PlanSolution};
use crate::models::skill::{JobProfile, Skill, SkillRequirement, Tier};
use crate::optimizer::{optimize, SolverConfig};
use crate::scoring::gap_scorer::{projected_score, score_profile, ScoreReport, TierBreakdown};
use crate::scoring::recommendations::{recommend_all, Recommendation};
use crate::scoring::remediation::{RemediationCatalog, RemediationInput};

// ────────────────────────────────────────────────────────────────────────────
// Request types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequirementInput {
    pub skill: String,
    pub tier: Tier,
    #[serde(default)]
    pub category: Option<String>,
}

/// Caller-supplied similarity for one skill pair (e.g. an embedding cosine).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimilarityOverride {
    pub skill_a: String,
    pub skill_b: String,
    pub similarity: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisRequest {
    pub resume_skills: Vec<String>,
    pub requirements: Vec<RequirementInput>,
    #[serde(default)]
    pub remediation: Vec<RemediationInput>,
    #[serde(default)]
    pub similarity_overrides: Vec<SimilarityOverride>,
    /// Overrides the service-wide threshold for this request only.
    #[serde(default)]
    pub similarity_threshold: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanRequest {
    #[serde(flatten)]
    pub analysis: AnalysisRequest,
    pub constraints: Constraints,
    /// Reject the request when any gap exceeds a budget on its own.
    #[serde(default)]
    pub strict: bool,
    /// Skip the exact search and return the greedy plan.
    #[serde(default)]
    pub approximate_only: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptimizeRequest {
    pub gaps: Vec<GapEntry>,
    pub constraints: Constraints,
    #[serde(default)]
    pub strict: bool,
    #[serde(default)]
    pub approximate_only: bool,
}

// ────────────────────────────────────────────────────────────────────────────
// Reports
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub analysis_id: Uuid,
    pub generated_at: DateTime<Utc>,
    pub score: f64,
    pub tiers: Vec<TierBreakdown>,
    pub verdicts: BTreeMap<String, MatchVerdict>,
    pub gaps: Vec<GapEntry>,
    /// Study advice per gap, in gap order.
    pub recommendations: Vec<Recommendation>,
    pub oracle_backend: String,
    pub oracle_failures: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanReport {
    pub analysis: AnalysisReport,
    pub plan: PlanSolution,
    /// Score expected once every selected skill is learned to full credit.
    pub projected_score: f64,
    pub score_improvement: f64,
}

/// Intermediate result kept around so the plan step can re-score the profile.
#[derive(Debug, Clone)]
pub struct Analysis {
    pub profile: JobProfile,
    pub verdicts: BTreeMap<String, MatchVerdict>,
    pub oracle_backend: &'static str,
    pub oracle_failures: u32,
    pub scored: ScoreReport,
}

impl Analysis {
    pub fn into_report(self) -> AnalysisReport {
        AnalysisReport {
            analysis_id: Uuid::new_v4(),
            generated_at: Utc::now(),
            score: self.scored.score,
            tiers: self.scored.tiers,
            verdicts: self.verdicts,
            recommendations: recommend_all(&self.scored.gaps),
            gaps: self.scored.gaps,
            oracle_backend: self.oracle_backend.to_string(),
            oracle_failures: self.oracle_failures,
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Pipeline
// ────────────────────────────────────────────────────────────────────────────

/// Match + score.
pub fn analyze(
    request: &AnalysisRequest,
    config: &AnalysisConfig,
    default_oracle: &Arc<dyn SimilarityOracle>,
) -> Result<Analysis, AnalysisError> {
    let profile = build_profile(&request.requirements)?;
    let catalog = RemediationCatalog::from_inputs(&request.remediation, config.remediation_fallback)?;
    let oracle = request_oracle(&request.similarity_overrides, default_oracle)?;
    let matcher = MatcherConfig {
        similarity_threshold: request
            .similarity_threshold
            .unwrap_or(config.matcher.similarity_threshold),
    };

    let job_skills: Vec<&str> = profile
        .requirements()
        .iter()
        .map(|r| r.skill.id.as_str())
        .collect();
    let matches = match_skills(&request.resume_skills, &job_skills, oracle.as_ref(), &matcher)?;
    let scored = score_profile(&profile, &matches.verdicts, &config.tier_weights, &catalog)?;

    let open_weight: f64 = scored.gaps.iter().map(|g| g.weight * g.deficit()).sum();
    info!(
        requirements = profile.requirements().len(),
        gaps = scored.gaps.len(),
        score = scored.score,
        open_weight,
        backend = oracle.backend(),
        "skill analysis complete"
    );

    Ok(Analysis {
        profile,
        verdicts: matches.verdicts,
        oracle_backend: oracle.backend(),
        oracle_failures: matches.oracle_failures,
        scored,
    })
}

/// Match + score + optimize + projected score.
pub fn plan(
    request: &PlanRequest,
    config: &AnalysisConfig,
    default_oracle: &Arc<dyn SimilarityOracle>,
) -> Result<PlanReport, AnalysisError> {
    let analysis = analyze(&request.analysis, config, default_oracle)?;

    let solver = solver_config(&config.solver, request.approximate_only);
    let mut plan = optimize(&analysis.scored.gaps, &request.constraints, &solver)?;
    if request.strict {
        plan = plan.ensure_reachable()?;
    }

    let projected = projected_score(
        &analysis.profile,
        &analysis.verdicts,
        &config.tier_weights,
        &plan.selected,
    )?;
    let report = analysis.into_report();
    let score_improvement = (projected - report.score).max(0.0);

    Ok(PlanReport {
        analysis: report,
        plan,
        projected_score: projected,
        score_improvement,
    })
}

/// Optimize an explicit gap list.
pub fn optimize_gaps(
    request: &OptimizeRequest,
    config: &AnalysisConfig,
) -> Result<PlanSolution, AnalysisError> {
    let solver = solver_config(&config.solver, request.approximate_only);
    let plan = optimize(&request.gaps, &request.constraints, &solver)?;
    if request.strict {
        plan.ensure_reachable()
    } else {
        Ok(plan)
    }
}

fn solver_config(base: &SolverConfig, approximate_only: bool) -> SolverConfig {
    SolverConfig {
        exact_enabled: base.exact_enabled && !approximate_only,
        ..base.clone()
    }
}

fn build_profile(requirements: &[RequirementInput]) -> Result<JobProfile, AnalysisError> {
    let requirements = requirements
        .iter()
        .map(|r| {
            Ok(SkillRequirement {
                skill: Skill::new(&r.skill, r.category.as_deref())?,
                tier: r.tier,
            })
        })
        .collect::<Result<Vec<_>, AnalysisError>>()?;
    JobProfile::new(requirements)
}

/// Layers per-request similarity overrides over the service oracle.
fn request_oracle(
    overrides: &[SimilarityOverride],
    default_oracle: &Arc<dyn SimilarityOracle>,
) -> Result<Arc<dyn SimilarityOracle>, AnalysisError> {
    if let Some(bad) = overrides.iter().find(|o| !o.similarity.is_finite()) {
        return Err(AnalysisError::InvalidInput(format!(
            "similarity override for '{}' / '{}' is not a finite number",
            bad.skill_a, bad.skill_b
        )));
    }
    let table = PairwiseTable::new(
        overrides
            .iter()
            .map(|o| (o.skill_a.clone(), o.skill_b.clone(), o.similarity)),
    )
    .with_fallback(Arc::clone(default_oracle));
    if table.is_empty() {
        return Ok(Arc::clone(default_oracle));
    }
    debug!(pairs = table.len(), "similarity overrides layered over {}", default_oracle.backend());
    Ok(Arc::new(table))
}
