//! Exact path — depth-first branch-and-bound over the ranked items.
//!
//! Branching follows the greedy order, include-branch first, seeded with the greedy
//! plan as incumbent. A node is pruned when its bound cannot beat the incumbent; the
//! bound is the smaller of the two single-budget fractional knapsack bounds.
//!
//! The search is capped by a wall-clock deadline and a node budget. Hitting either
//! aborts with a `SolverError` and the caller falls back to the greedy plan.

use std::time::Instant;

use tracing::debug;

use crate::optimizer::greedy::Selection;
use crate::optimizer::{Item, SolverConfig, SolverError};

const BOUND_EPS: f64 = 1e-9;
/// Deadline is checked once per this many nodes.
const DEADLINE_STRIDE: u64 = 1024;

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ExactOutcome {
    pub chosen: Vec<usize>,
    pub weight: f64,
    pub nodes: u64,
}

pub(crate) fn solve(
    items: &[Item<'_>],
    time_budget: f64,
    cost_budget: f64,
    incumbent: &Selection,
    upper_bound: Option<f64>,
    config: &SolverConfig,
) -> Result<ExactOutcome, SolverError> {
    if !config.exact_enabled {
        return Err(SolverError::Disabled);
    }
    if items.len() > config.max_exact_items {
        return Err(SolverError::TooLarge {
            items: items.len(),
            limit: config.max_exact_items,
        });
    }

    if let Some(bound) = upper_bound {
        if incumbent.weight >= bound - BOUND_EPS {
            debug!("greedy plan meets the relaxation bound; optimal without search");
            return Ok(ExactOutcome {
                chosen: incumbent.chosen.clone(),
                weight: incumbent.weight,
                nodes: 0,
            });
        }
    }

    let started = Instant::now();
    let mut search = Search {
        items,
        time_order: density_order(items, |it| it.time),
        cost_order: density_order(items, |it| it.cost),
        time_budget,
        cost_budget,
        current: Vec::with_capacity(items.len()),
        best: incumbent.chosen.clone(),
        best_weight: incumbent.weight,
        nodes: 0,
        max_nodes: config.max_nodes,
        started,
        deadline: started + config.timeout,
    };

    search.branch(0, 0.0, 0.0, 0.0)?;

    debug!(
        nodes = search.nodes,
        elapsed_ms = started.elapsed().as_millis() as u64,
        "branch-and-bound finished"
    );

    Ok(ExactOutcome {
        chosen: search.best,
        weight: search.best_weight,
        nodes: search.nodes,
    })
}

/// Item indices by weight per unit of one dimension, descending. Zero-size items first.
fn density_order(items: &[Item<'_>], size: impl Fn(&Item<'_>) -> f64) -> Vec<usize> {
    let density = |it: &Item<'_>| {
        let s = size(it);
        if s <= 0.0 {
            f64::INFINITY
        } else {
            it.weight / s
        }
    };
    let mut order: Vec<usize> = (0..items.len()).collect();
    order.sort_by(|&a, &b| {
        density(&items[b])
            .total_cmp(&density(&items[a]))
            .then(a.cmp(&b))
    });
    order
}

struct Search<'a, 'b> {
    items: &'a [Item<'b>],
    time_order: Vec<usize>,
    cost_order: Vec<usize>,
    time_budget: f64,
    cost_budget: f64,
    current: Vec<usize>,
    best: Vec<usize>,
    best_weight: f64,
    nodes: u64,
    max_nodes: u64,
    started: Instant,
    deadline: Instant,
}

impl Search<'_, '_> {
    fn branch(
        &mut self,
        depth: usize,
        weight: f64,
        time: f64,
        cost: f64,
    ) -> Result<(), SolverError> {
        self.nodes += 1;
        if self.nodes > self.max_nodes {
            return Err(SolverError::NodeLimit { nodes: self.max_nodes });
        }
        if self.nodes % DEADLINE_STRIDE == 0 && Instant::now() >= self.deadline {
            return Err(SolverError::Timeout {
                elapsed_ms: self.started.elapsed().as_millis() as u64,
            });
        }

        if weight > self.best_weight + BOUND_EPS {
            self.best_weight = weight;
            self.best = self.current.clone();
        }

        if depth == self.items.len() {
            return Ok(());
        }

        let remaining_time = self.time_budget - time;
        let remaining_cost = self.cost_budget - cost;
        let bound = weight
            + fractional_bound(self.items, &self.time_order, depth, remaining_time, |it| it.time)
                .min(fractional_bound(
                    self.items,
                    &self.cost_order,
                    depth,
                    remaining_cost,
                    |it| it.cost,
                ));
        if bound <= self.best_weight + BOUND_EPS {
            return Ok(());
        }

        let item = self.items[depth];
        let next_time = time + item.time;
        let next_cost = cost + item.cost;
        if next_time <= self.time_budget && next_cost <= self.cost_budget {
            self.current.push(depth);
            self.branch(depth + 1, weight + item.weight, next_time, next_cost)?;
            self.current.pop();
        }

        self.branch(depth + 1, weight, time, cost)
    }
}

/// Fractional knapsack bound on items `depth..` for a single budget dimension.
fn fractional_bound(
    items: &[Item<'_>],
    order: &[usize],
    depth: usize,
    capacity: f64,
    size: impl Fn(&Item<'_>) -> f64,
) -> f64 {
    let mut remaining = capacity;
    let mut total = 0.0;
    for &idx in order {
        if idx < depth {
            continue;
        }
        let item = &items[idx];
        let s = size(item);
        if s <= 0.0 {
            total += item.weight;
        } else if s <= remaining {
            remaining -= s;
            total += item.weight;
        } else {
            total += item.weight * (remaining.max(0.0) / s);
            break;
        }
    }
    total
}
