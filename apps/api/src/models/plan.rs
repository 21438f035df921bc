//! Gap entries, budget constraints and the learning plan produced by the optimizer.

use serde::{Deserialize, Serialize};

use crate::errors::AnalysisError;
use crate::models::skill::{Tier, DEFAULT_CATEGORY};

/// Where a gap's time/cost estimate came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RemediationSource {
    /// Supplied by the caller's remediation catalog.
    #[default]
    Provided,
    /// Derived from the built-in complexity/tier table.
    Heuristic,
    /// No estimate was available — treated as free (0 months, $0).
    Defaulted,
}

fn default_category() -> String {
    DEFAULT_CATEGORY.to_string()
}

/// A requirement the resume does not fully satisfy, with remediation metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GapEntry {
    pub skill: String,
    #[serde(default = "default_category")]
    pub category: String,
    pub tier: Tier,
    /// Tier-derived objective weight.
    pub weight: f64,
    /// Credit already earned (0.0 for absent, similarity for semantic matches).
    #[serde(default)]
    pub credit: f64,
    pub estimated_time_months: f64,
    pub estimated_cost_dollars: f64,
    #[serde(default)]
    pub remediation_source: RemediationSource,
}

impl GapEntry {
    /// Confidence deficit still to close: `1 - credit`.
    pub fn deficit(&self) -> f64 {
        (1.0 - self.credit).clamp(0.0, 1.0)
    }

    pub fn is_partial(&self) -> bool {
        self.credit > 0.0
    }

    /// Zero time and zero cost — always selected.
    pub fn is_free(&self) -> bool {
        self.estimated_time_months == 0.0 && self.estimated_cost_dollars == 0.0
    }
}

/// Time and money budgets for a single optimization request.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Constraints {
    pub time_budget_months: f64,
    pub cost_budget_dollars: f64,
}

impl Constraints {
    pub fn validate(&self) -> Result<(), AnalysisError> {
        for (name, value) in [
            ("time_budget_months", self.time_budget_months),
            ("cost_budget_dollars", self.cost_budget_dollars),
        ] {
            if !value.is_finite() {
                return Err(AnalysisError::InvalidConstraints(format!(
                    "{name} must be a finite number, got {value}"
                )));
            }
            if value < 0.0 {
                return Err(AnalysisError::InvalidConstraints(format!(
                    "{name} must be non-negative, got {value}"
                )));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SolveMethod {
    Exact,
    Approximate,
}

/// Which budget a single gap exceeds on its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BudgetDimension {
    Time,
    Cost,
    Both,
}

/// A gap that cannot be learned under the current budget, whatever else is chosen.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnreachableSkill {
    pub skill: String,
    pub exceeds: BudgetDimension,
    pub estimated_time_months: f64,
    pub estimated_cost_dollars: f64,
}

/// The learning plan chosen by the optimizer. Always within both budgets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanSolution {
    /// Selected skills: free entries first, then in learning-priority order.
    pub selected: Vec<String>,
    pub achieved_weight_sum: f64,
    pub used_time: f64,
    pub used_cost: f64,
    pub method: SolveMethod,
    pub unreachable: Vec<UnreachableSkill>,
    /// LP relaxation optimum (upper bound on any plan), when the relaxation solved.
    pub relaxation_bound: Option<f64>,
    /// Why the exact path was not used. Set only for `Approximate`.
    pub fallback_reason: Option<String>,
    /// Branch-and-bound nodes visited. Set only for `Exact`.
    pub nodes_explored: Option<u64>,
}

impl PlanSolution {
    /// Turns reported unreachable skills into an `InfeasibleSingleton` error.
    pub fn ensure_reachable(self) -> Result<Self, AnalysisError> {
        if self.unreachable.is_empty() {
            Ok(self)
        } else {
            Err(AnalysisError::InfeasibleSingleton {
                skills: self.unreachable.iter().map(|u| u.skill.clone()).collect(),
            })
        }
    }
}
