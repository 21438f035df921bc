// Analysis pipeline: match → score → optimize, plus the HTTP handlers on top.
// The pipeline is synchronous; handlers run it inside spawn_blocking.

pub mod handlers;
pub mod pipeline;

use crate::matching::matcher::MatcherConfig;
use crate::models::skill::TierWeights;
use crate::optimizer::SolverConfig;
use crate::scoring::remediation::FallbackPolicy;

/// Immutable per-process analysis settings, built once from `Config`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnalysisConfig {
    pub matcher: MatcherConfig,
    pub tier_weights: TierWeights,
    pub solver: SolverConfig,
    pub remediation_fallback: FallbackPolicy,
}
