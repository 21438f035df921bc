//! Learning-plan optimizer — picks the subset of gaps worth the most tier weight
//! that fits both a time budget and a cost budget.
//!
//! Algorithm:
//! 1. validate budgets and gap metadata
//! 2. free gaps (0 months, $0) are always selected
//! 3. gaps that exceed a budget on their own are reported as unreachable and skipped
//! 4. the rest are ranked by efficiency and solved as a two-budget 0/1 knapsack:
//!    - LP relaxation gives an upper bound
//!    - ratio-greedy gives a feasible incumbent
//!    - branch-and-bound improves it to optimal, within the node/time caps
//! 5. if the exact search is disabled, too large, or aborted, the greedy plan is
//!    returned as `Approximate` with the reason attached
//!
//! Everything here is synchronous and CPU-bound. Async callers run it via
//! `tokio::task::spawn_blocking`.

mod exact;
mod greedy;
mod relaxation;

use std::collections::BTreeSet;
use std::time::Duration;

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::errors::AnalysisError;
use crate::models::plan::{
    BudgetDimension, Constraints, GapEntry, PlanSolution, SolveMethod, UnreachableSkill,
};

pub const DEFAULT_SOLVER_TIMEOUT: Duration = Duration::from_millis(2_000);
pub const DEFAULT_MAX_NODES: u64 = 2_000_000;
pub const DEFAULT_MAX_EXACT_ITEMS: usize = 64;

/// A candidate gap as seen by the solvers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Item<'a> {
    /// Index into the caller's gap slice.
    pub gap_index: usize,
    pub skill: &'a str,
    pub weight: f64,
    pub time: f64,
    pub cost: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SolverConfig {
    pub exact_enabled: bool,
    pub timeout: Duration,
    pub max_nodes: u64,
    /// Candidate count above which the exact search is not attempted.
    pub max_exact_items: usize,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            exact_enabled: true,
            timeout: DEFAULT_SOLVER_TIMEOUT,
            max_nodes: DEFAULT_MAX_NODES,
            max_exact_items: DEFAULT_MAX_EXACT_ITEMS,
        }
    }
}

/// Reasons the exact path gave up (the "solver unavailable" condition).
///
/// Never surfaced as an API error: the optimizer falls back to the greedy plan and
/// records the message in `fallback_reason`.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SolverError {
    #[error("exact solver disabled")]
    Disabled,

    #[error("{items} candidates exceed the exact solver limit of {limit}")]
    TooLarge { items: usize, limit: usize },

    #[error("exact solver timed out after {elapsed_ms}ms")]
    Timeout { elapsed_ms: u64 },

    #[error("exact solver hit the node limit ({nodes})")]
    NodeLimit { nodes: u64 },

    #[error("numerical failure: {0}")]
    Numerical(String),
}

/// Selects the learning plan for `gaps` under `constraints`.
pub fn optimize(
    gaps: &[GapEntry],
    constraints: &Constraints,
    config: &SolverConfig,
) -> Result<PlanSolution, AnalysisError> {
    constraints.validate()?;
    validate_gaps(gaps)?;

    let time_budget = constraints.time_budget_months;
    let cost_budget = constraints.cost_budget_dollars;

    // ── Partition ───────────────────────────────────────────────────────────────
    let mut free: Vec<&GapEntry> = Vec::new();
    let mut unreachable: Vec<UnreachableSkill> = Vec::new();
    let mut items: Vec<Item<'_>> = Vec::new();

    for (gap_index, gap) in gaps.iter().enumerate() {
        if gap.is_free() {
            free.push(gap);
            continue;
        }
        let over_time = gap.estimated_time_months > time_budget;
        let over_cost = gap.estimated_cost_dollars > cost_budget;
        let exceeds = match (over_time, over_cost) {
            (false, false) => {
                items.push(Item {
                    gap_index,
                    skill: &gap.skill,
                    weight: gap.weight,
                    time: gap.estimated_time_months,
                    cost: gap.estimated_cost_dollars,
                });
                continue;
            }
            (true, false) => BudgetDimension::Time,
            (false, true) => BudgetDimension::Cost,
            (true, true) => BudgetDimension::Both,
        };
        unreachable.push(UnreachableSkill {
            skill: gap.skill.clone(),
            exceeds,
            estimated_time_months: gap.estimated_time_months,
            estimated_cost_dollars: gap.estimated_cost_dollars,
        });
    }

    free.sort_by(|a, b| a.skill.cmp(&b.skill));
    unreachable.sort_by(|a, b| a.skill.cmp(&b.skill));
    if !unreachable.is_empty() {
        info!(
            count = unreachable.len(),
            "gaps exceed the budget on their own and were left out"
        );
    }

    // ── Solve ───────────────────────────────────────────────────────────────────
    greedy::rank(&mut items, time_budget, cost_budget);

    let relaxation = match relaxation::solve(&items, time_budget, cost_budget) {
        Ok(r) => {
            let fractional = r
                .values
                .iter()
                .filter(|&&x| x > 1e-9 && x < 1.0 - 1e-9)
                .count();
            debug!(bound = r.objective, fractional, "LP relaxation solved");
            Some(r)
        }
        Err(e) => {
            warn!(error = %e, "LP relaxation failed; continuing without a bound");
            None
        }
    };

    let seed = greedy::admit(&items, time_budget, cost_budget);

    let (method, chosen, fallback_reason, nodes_explored) = match exact::solve(
        &items,
        time_budget,
        cost_budget,
        &seed,
        relaxation.as_ref().map(|r| r.objective),
        config,
    ) {
        Ok(outcome) => (SolveMethod::Exact, outcome.chosen, None, Some(outcome.nodes)),
        Err(e) => {
            if e == SolverError::Disabled {
                debug!("exact solver disabled; using greedy plan");
            } else {
                warn!(
                    error = %e,
                    candidates = items.len(),
                    "exact solver fell back to greedy plan"
                );
            }
            (SolveMethod::Approximate, seed.chosen, Some(e.to_string()), None)
        }
    };

    // ── Assemble ────────────────────────────────────────────────────────────────
    // Sums accumulate in output order, matching how feasibility was checked.
    let mut selected = Vec::with_capacity(free.len() + chosen.len());
    let mut achieved_weight_sum = 0.0;
    let mut used_time = 0.0;
    let mut used_cost = 0.0;

    for gap in &free {
        selected.push(gap.skill.clone());
        achieved_weight_sum += gap.weight;
    }
    let free_weight = achieved_weight_sum;

    for &pos in &chosen {
        let item = &items[pos];
        selected.push(gaps[item.gap_index].skill.clone());
        achieved_weight_sum += item.weight;
        used_time += item.time;
        used_cost += item.cost;
    }

    debug!(
        selected = selected.len(),
        weight = achieved_weight_sum,
        used_time,
        used_cost,
        method = ?method,
        "learning plan selected"
    );

    Ok(PlanSolution {
        selected,
        achieved_weight_sum,
        used_time,
        used_cost,
        method,
        unreachable,
        relaxation_bound: relaxation.map(|r| r.objective + free_weight),
        fallback_reason,
        nodes_explored,
    })
}

fn validate_gaps(gaps: &[GapEntry]) -> Result<(), AnalysisError> {
    let mut seen = BTreeSet::new();
    for gap in gaps {
        if gap.skill.trim().is_empty() {
            return Err(AnalysisError::InvalidInput(
                "gap skill must not be empty".to_string(),
            ));
        }
        if !seen.insert(gap.skill.as_str()) {
            return Err(AnalysisError::InvalidInput(format!(
                "duplicate gap for skill '{}'",
                gap.skill
            )));
        }
        for (name, value) in [
            ("weight", gap.weight),
            ("estimated_time_months", gap.estimated_time_months),
            ("estimated_cost_dollars", gap.estimated_cost_dollars),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(AnalysisError::InvalidInput(format!(
                    "gap '{}': {name} must be a finite non-negative number, got {value}",
                    gap.skill
                )));
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::plan::RemediationSource;
    use crate::models::skill::Tier;

    fn gap(skill: &str, weight: f64, time: f64, cost: f64) -> GapEntry {
        GapEntry {
            skill: skill.to_string(),
            category: "General".to_string(),
            tier: Tier::Required,
            weight,
            credit: 0.0,
            estimated_time_months: time,
            estimated_cost_dollars: cost,
            remediation_source: RemediationSource::Provided,
        }
    }

    fn budget(time: f64, cost: f64) -> Constraints {
        Constraints {
            time_budget_months: time,
            cost_budget_dollars: cost,
        }
    }

    fn approximate_only() -> SolverConfig {
        SolverConfig {
            exact_enabled: false,
            ..SolverConfig::default()
        }
    }

    fn assert_feasible(plan: &PlanSolution, c: &Constraints) {
        assert!(plan.used_time <= c.time_budget_months, "time {}", plan.used_time);
        assert!(plan.used_cost <= c.cost_budget_dollars, "cost {}", plan.used_cost);
    }

    /// Exhaustive optimum over all subsets, accumulating in slice order.
    fn brute_force(gaps: &[GapEntry], c: &Constraints) -> f64 {
        let n = gaps.len();
        let mut best = 0.0_f64;
        for mask in 0u32..(1 << n) {
            let (mut w, mut t, mut k) = (0.0, 0.0, 0.0);
            for (i, g) in gaps.iter().enumerate() {
                if mask & (1 << i) != 0 {
                    w += g.weight;
                    t += g.estimated_time_months;
                    k += g.estimated_cost_dollars;
                }
            }
            if t <= c.time_budget_months && k <= c.cost_budget_dollars {
                best = best.max(w);
            }
        }
        best
    }

    #[test]
    fn test_sql_docker_scenario_picks_sql() {
        let gaps = vec![gap("sql", 0.6, 2.0, 100.0), gap("docker", 0.3, 1.0, 50.0)];
        let c = budget(2.0, 120.0);
        let plan = optimize(&gaps, &c, &SolverConfig::default()).unwrap();
        assert_eq!(plan.selected, vec!["sql".to_string()]);
        assert!((plan.achieved_weight_sum - 0.6).abs() < 1e-12);
        assert_eq!(plan.method, SolveMethod::Exact);
        assert_eq!(plan.used_time, 2.0);
        assert_eq!(plan.used_cost, 100.0);
        assert!(plan.fallback_reason.is_none());
        assert_feasible(&plan, &c);
    }

    #[test]
    fn test_zero_budget_selects_only_free_gaps() {
        let gaps = vec![
            gap("kubernetes", 1.0, 2.0, 0.0),
            gap("git", 0.3, 0.0, 0.0),
            gap("bash", 0.6, 0.0, 0.0),
        ];
        let c = budget(0.0, 0.0);
        let plan = optimize(&gaps, &c, &SolverConfig::default()).unwrap();
        assert_eq!(plan.selected, vec!["bash".to_string(), "git".to_string()]);
        assert!((plan.achieved_weight_sum - 0.9).abs() < 1e-12);
        assert_eq!(plan.used_time, 0.0);
        assert_eq!(plan.used_cost, 0.0);
        assert_eq!(plan.unreachable.len(), 1);
        assert_eq!(plan.unreachable[0].exceeds, BudgetDimension::Time);
    }

    #[test]
    fn test_empty_gaps_give_empty_plan() {
        let plan = optimize(&[], &budget(3.0, 100.0), &SolverConfig::default()).unwrap();
        assert!(plan.selected.is_empty());
        assert_eq!(plan.achieved_weight_sum, 0.0);
        assert_eq!(plan.relaxation_bound, Some(0.0));
    }

    #[test]
    fn test_exact_matches_brute_force() {
        let gaps = vec![
            gap("a", 1.0, 3.0, 200.0),
            gap("b", 1.0, 2.0, 150.0),
            gap("c", 0.6, 1.0, 30.0),
            gap("d", 0.6, 2.5, 40.0),
            gap("e", 0.3, 0.5, 20.0),
            gap("f", 0.3, 1.5, 10.0),
            gap("g", 1.0, 4.0, 90.0),
            gap("h", 0.6, 0.75, 120.0),
            gap("i", 0.3, 2.0, 5.0),
            gap("j", 1.0, 1.25, 300.0),
        ];
        for (t, k) in [(3.0, 200.0), (5.0, 350.0), (6.5, 400.0), (2.0, 1000.0), (20.0, 60.0)] {
            let c = budget(t, k);
            let plan = optimize(&gaps, &c, &SolverConfig::default()).unwrap();
            assert_eq!(plan.method, SolveMethod::Exact);
            assert_feasible(&plan, &c);
            let best = brute_force(&gaps, &c);
            assert!(
                (plan.achieved_weight_sum - best).abs() < 1e-9,
                "budget ({t}, {k}): got {} want {best}",
                plan.achieved_weight_sum
            );
            if let Some(bound) = plan.relaxation_bound {
                assert!(bound >= best - 1e-9);
            }
        }
    }

    #[test]
    fn test_optimize_is_idempotent() {
        let gaps = vec![
            gap("a", 1.0, 3.0, 10.0),
            gap("b", 0.6, 2.0, 10.0),
            gap("c", 0.6, 2.0, 10.0),
            gap("d", 0.3, 0.0, 0.0),
        ];
        let c = budget(4.0, 100.0);
        let first = optimize(&gaps, &c, &SolverConfig::default()).unwrap();
        let second = optimize(&gaps, &c, &SolverConfig::default()).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.selected, vec!["d", "b", "c"]);
    }

    #[test]
    fn test_approximate_plan_is_feasible_and_labelled() {
        // Greedy takes "a" first and then cannot fit "b" or "c"; the optimum is {b, c}.
        let gaps = vec![
            gap("a", 1.0, 3.0, 10.0),
            gap("b", 0.6, 2.0, 10.0),
            gap("c", 0.6, 2.0, 10.0),
        ];
        let c = budget(4.0, 100.0);
        let plan = optimize(&gaps, &c, &approximate_only()).unwrap();
        assert_eq!(plan.method, SolveMethod::Approximate);
        assert_eq!(plan.fallback_reason.as_deref(), Some("exact solver disabled"));
        assert_eq!(plan.selected, vec!["a".to_string()]);
        assert_feasible(&plan, &c);
        let bound = plan.relaxation_bound.unwrap();
        assert!(bound >= brute_force(&gaps, &c) - 1e-9);

        let exact = optimize(&gaps, &c, &SolverConfig::default()).unwrap();
        assert!((exact.achieved_weight_sum - 1.2).abs() < 1e-12);
    }

    #[test]
    fn test_too_many_candidates_falls_back() {
        let config = SolverConfig {
            max_exact_items: 1,
            ..SolverConfig::default()
        };
        let gaps = vec![gap("a", 1.0, 1.0, 1.0), gap("b", 0.6, 1.0, 1.0)];
        let plan = optimize(&gaps, &budget(1.0, 1.0), &config).unwrap();
        assert_eq!(plan.method, SolveMethod::Approximate);
        assert!(plan.fallback_reason.unwrap().contains("exceed"));
        assert_eq!(plan.selected, vec!["a".to_string()]);
    }

    #[test]
    fn test_timeout_falls_back_to_greedy_plan() {
        // Equal ratios and an odd time budget: the fractional bound stays at 20.5
        // while no subset beats 20, so the search cannot prune its way out.
        let gaps: Vec<_> = (0..40)
            .map(|i| gap(&format!("skill-{i:02}"), 1.0, 2.0, 1.0))
            .collect();
        let c = budget(41.0, 1_000.0);
        let config = SolverConfig {
            timeout: Duration::ZERO,
            max_nodes: u64::MAX,
            ..SolverConfig::default()
        };
        let plan = optimize(&gaps, &c, &config).unwrap();
        assert_eq!(plan.method, SolveMethod::Approximate);
        let reason = plan.fallback_reason.clone().unwrap();
        assert!(reason.contains("timed out"), "{reason}");
        assert_eq!(plan.selected.len(), 20);
        assert!((plan.achieved_weight_sum - 20.0).abs() < 1e-9);
        assert!(plan.nodes_explored.is_none());
        assert!((plan.relaxation_bound.unwrap() - 20.5).abs() < 1e-9);
        assert_feasible(&plan, &c);
    }

    #[test]
    fn test_unreachable_singletons_reported() {
        let gaps = vec![
            gap("rust", 1.0, 12.0, 10.0),
            gap("aws", 0.6, 1.0, 5_000.0),
            gap("ml", 0.6, 24.0, 9_000.0),
            gap("git", 0.3, 0.5, 0.0),
        ];
        let plan = optimize(&gaps, &budget(6.0, 1_000.0), &SolverConfig::default()).unwrap();
        assert_eq!(plan.selected, vec!["git".to_string()]);
        let exceeded: Vec<_> = plan
            .unreachable
            .iter()
            .map(|u| (u.skill.as_str(), u.exceeds))
            .collect();
        assert_eq!(
            exceeded,
            vec![
                ("aws", BudgetDimension::Cost),
                ("ml", BudgetDimension::Both),
                ("rust", BudgetDimension::Time),
            ]
        );

        let err = plan.ensure_reachable().unwrap_err();
        assert_eq!(
            err,
            AnalysisError::InfeasibleSingleton {
                skills: vec!["aws".to_string(), "ml".to_string(), "rust".to_string()]
            }
        );
    }

    #[test]
    fn test_invalid_constraints_rejected() {
        let gaps = vec![gap("sql", 0.6, 1.0, 1.0)];
        let err = optimize(&gaps, &budget(-1.0, 10.0), &SolverConfig::default()).unwrap_err();
        assert!(matches!(err, AnalysisError::InvalidConstraints(_)));
    }

    #[test]
    fn test_invalid_gap_metadata_rejected() {
        let c = budget(1.0, 1.0);
        let negative = vec![gap("sql", 0.6, -1.0, 1.0)];
        assert!(matches!(
            optimize(&negative, &c, &SolverConfig::default()),
            Err(AnalysisError::InvalidInput(_))
        ));
        let duplicate = vec![gap("sql", 0.6, 1.0, 1.0), gap("sql", 0.3, 1.0, 1.0)];
        assert!(matches!(
            optimize(&duplicate, &c, &SolverConfig::default()),
            Err(AnalysisError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_budget_boundary_is_inclusive() {
        let gaps = vec![gap("a", 0.5, 0.1, 0.0), gap("b", 0.5, 0.2, 0.0)];
        let c = budget(0.1 + 0.2, 1.0);
        for config in [SolverConfig::default(), approximate_only()] {
            let plan = optimize(&gaps, &c, &config).unwrap();
            assert_eq!(plan.selected.len(), 2);
            assert_feasible(&plan, &c);
        }
    }
}
