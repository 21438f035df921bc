//! Gap Scorer — weighted match score and the ranked list of skills still to learn.
//!
//! Algorithm:
//! 1. credit per requirement from its verdict (exact 1.0, semantic = similarity, absent 0.0)
//! 2. score = Σ(weight × credit) / Σ(weight), weights from `TierWeights`
//! 3. every requirement with credit < 1.0 becomes a `GapEntry` with remediation metadata
//! 4. gaps ranked: tier, weight desc, absent before partial, time asc, skill id

use std::cmp::Ordering;
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::errors::AnalysisError;
use crate::matching::matcher::MatchVerdict;
use crate::models::plan::GapEntry;
use crate::models::skill::{JobProfile, Tier, TierWeights};
use crate::scoring::remediation::RemediationCatalog;

/// Per-tier match counts, mirroring the required/preferred/bonus breakdown shown to users.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TierBreakdown {
    pub tier: Tier,
    pub total: u32,
    pub exact: u32,
    pub semantic: u32,
    /// Summed credit of this tier's requirements.
    pub credit: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreReport {
    /// Weighted match score in [0, 1].
    pub score: f64,
    pub gaps: Vec<GapEntry>,
    pub tiers: Vec<TierBreakdown>,
}

/// Scores verdicts against a job profile and builds the ranked gap list.
pub fn score_profile(
    profile: &JobProfile,
    verdicts: &BTreeMap<String, MatchVerdict>,
    weights: &TierWeights,
    remediation: &RemediationCatalog,
) -> Result<ScoreReport, AnalysisError> {
    ensure_coverage(profile, verdicts)?;

    let mut weighted_credit = 0.0_f64;
    let mut total_weight = 0.0_f64;
    let mut gaps = Vec::new();
    let mut tiers: Vec<TierBreakdown> = Tier::ALL
        .iter()
        .map(|&tier| TierBreakdown {
            tier,
            total: 0,
            exact: 0,
            semantic: 0,
            credit: 0.0,
        })
        .collect();

    for req in profile.requirements() {
        let verdict = verdicts[&req.skill.id];
        let credit = verdict.credit();
        let weight = weights.weight(req.tier);

        weighted_credit += weight * credit;
        total_weight += weight;

        let breakdown = &mut tiers[req.tier as usize];
        breakdown.total += 1;
        breakdown.credit += credit;
        match verdict {
            MatchVerdict::PresentExact => breakdown.exact += 1,
            MatchVerdict::PresentSemantic { .. } => breakdown.semantic += 1,
            MatchVerdict::Absent => {}
        }

        if credit < 1.0 {
            let estimate = remediation.estimate(&req.skill.id, req.tier);
            gaps.push(GapEntry {
                skill: req.skill.id.clone(),
                category: req.skill.category.clone(),
                tier: req.tier,
                weight,
                credit,
                estimated_time_months: estimate.time_months,
                estimated_cost_dollars: estimate.cost_dollars,
                remediation_source: estimate.source,
            });
        }
    }

    gaps.sort_by(rank_gaps);

    let score = bounded_score(weighted_credit, total_weight, !gaps.is_empty());

    Ok(ScoreReport {
        score,
        gaps,
        tiers,
    })
}

/// Expected score once `learned` skills reach full credit.
pub fn projected_score(
    profile: &JobProfile,
    verdicts: &BTreeMap<String, MatchVerdict>,
    weights: &TierWeights,
    learned: &[String],
) -> Result<f64, AnalysisError> {
    ensure_coverage(profile, verdicts)?;

    let (weighted_credit, total_weight, open) = profile.requirements().iter().fold(
        (0.0_f64, 0.0_f64, false),
        |(acc, total, open), req| {
            let weight = weights.weight(req.tier);
            let credit = if learned.iter().any(|s| s == &req.skill.id) {
                1.0
            } else {
                verdicts[&req.skill.id].credit()
            };
            (acc + weight * credit, total + weight, open || credit < 1.0)
        },
    );

    Ok(bounded_score(weighted_credit, total_weight, open))
}

/// Largest f64 strictly below 1.0.
const BELOW_ONE: f64 = 1.0 - f64::EPSILON / 2.0;

/// `Σ(w·c) / Σw` clamped to [0, 1]. A credit just under 1.0 can round the
/// quotient up to exactly 1.0, so any open gap caps the score below it.
fn bounded_score(weighted_credit: f64, total_weight: f64, has_gap: bool) -> f64 {
    // total_weight > 0: profiles are non-empty and tier weights are positive.
    let score = (weighted_credit / total_weight).clamp(0.0, 1.0);
    if has_gap {
        score.min(BELOW_ONE)
    } else {
        score
    }
}

fn ensure_coverage(
    profile: &JobProfile,
    verdicts: &BTreeMap<String, MatchVerdict>,
) -> Result<(), AnalysisError> {
    let missing: Vec<String> = profile
        .requirements()
        .iter()
        .filter(|r| !verdicts.contains_key(&r.skill.id))
        .map(|r| r.skill.id.clone())
        .collect();
    if missing.is_empty() {
        Ok(())
    } else {
        Err(AnalysisError::ProfileMismatch { missing })
    }
}

fn rank_gaps(a: &GapEntry, b: &GapEntry) -> Ordering {
    a.tier
        .cmp(&b.tier)
        .then_with(|| b.weight.total_cmp(&a.weight))
        .then_with(|| a.is_partial().cmp(&b.is_partial()))
        .then_with(|| a.estimated_time_months.total_cmp(&b.estimated_time_months))
        .then_with(|| a.skill.cmp(&b.skill))
}
