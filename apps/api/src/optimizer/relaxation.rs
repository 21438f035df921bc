//! LP relaxation of the two-budget selection problem.
//!
//! maximize Σ wᵢxᵢ  s.t.  Σ tᵢxᵢ ≤ T,  Σ cᵢxᵢ ≤ C,  0 ≤ xᵢ ≤ 1
//!
//! Dense tableau simplex with Bland's rule. All right-hand sides are non-negative, so
//! the slack basis is feasible and no phase one is needed. The optimum is an upper bound
//! on every integral plan: the exact search uses it to stop early, and approximate plans
//! report it so callers can see the optimality gap.

use crate::optimizer::{Item, SolverError};

const PIVOT_EPS: f64 = 1e-12;

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Relaxation {
    pub objective: f64,
    pub values: Vec<f64>,
}

pub(crate) fn solve(
    items: &[Item<'_>],
    time_budget: f64,
    cost_budget: f64,
) -> Result<Relaxation, SolverError> {
    let n = items.len();
    if n == 0 {
        return Ok(Relaxation {
            objective: 0.0,
            values: Vec::new(),
        });
    }

    // Rows: time, cost, then one xᵢ ≤ 1 row per item. Columns: n structural, m slack, rhs.
    let m = n + 2;
    let rhs = n + m;
    let mut tableau = vec![vec![0.0_f64; n + m + 1]; m + 1];

    for (j, item) in items.iter().enumerate() {
        tableau[0][j] = item.time;
        tableau[1][j] = item.cost;
        tableau[2 + j][j] = 1.0;
        tableau[2 + j][rhs] = 1.0;
        tableau[m][j] = -item.weight;
    }
    for (i, row) in tableau.iter_mut().take(m).enumerate() {
        row[n + i] = 1.0;
    }
    tableau[0][rhs] = time_budget;
    tableau[1][rhs] = cost_budget;

    let mut basis: Vec<usize> = (n..n + m).collect();
    let max_pivots = 50 * (n + m);

    for _ in 0..max_pivots {
        // Bland: lowest-index column with a negative reduced cost enters.
        let Some(enter) = (0..n + m).find(|&j| tableau[m][j] < -PIVOT_EPS) else {
            return extract(items, &tableau, &basis, rhs);
        };

        // Minimum ratio; ties go to the lowest basic variable index.
        let mut leave: Option<(usize, f64)> = None;
        for (i, row) in tableau.iter().take(m).enumerate() {
            let a = row[enter];
            if a <= PIVOT_EPS {
                continue;
            }
            let ratio = row[rhs] / a;
            let better = match leave {
                None => true,
                Some((li, lr)) => {
                    ratio < lr - PIVOT_EPS
                        || ((ratio - lr).abs() <= PIVOT_EPS && basis[i] < basis[li])
                }
            };
            if better {
                leave = Some((i, ratio));
            }
        }

        let Some((pivot_row, _)) = leave else {
            return Err(SolverError::Numerical(
                "relaxation reported unbounded despite box constraints".to_string(),
            ));
        };

        pivot(&mut tableau, pivot_row, enter);
        basis[pivot_row] = enter;
    }

    Err(SolverError::Numerical(format!(
        "simplex did not converge within {max_pivots} pivots"
    )))
}

fn pivot(tableau: &mut [Vec<f64>], pivot_row: usize, enter: usize) {
    let divisor = tableau[pivot_row][enter];
    for v in tableau[pivot_row].iter_mut() {
        *v /= divisor;
    }
    let pivot_values = tableau[pivot_row].clone();

    for (i, row) in tableau.iter_mut().enumerate() {
        if i == pivot_row {
            continue;
        }
        let factor = row[enter];
        if factor == 0.0 {
            continue;
        }
        for (v, p) in row.iter_mut().zip(&pivot_values) {
            *v -= factor * p;
        }
    }
}

fn extract(
    items: &[Item<'_>],
    tableau: &[Vec<f64>],
    basis: &[usize],
    rhs: usize,
) -> Result<Relaxation, SolverError> {
    let mut values = vec![0.0; items.len()];
    for (row, &var) in basis.iter().enumerate() {
        if var < items.len() {
            values[var] = tableau[row][rhs].clamp(0.0, 1.0);
        }
    }

    let objective: f64 = items.iter().zip(&values).map(|(it, x)| it.weight * x).sum();
    if !objective.is_finite() {
        return Err(SolverError::Numerical(format!(
            "relaxation objective is not finite ({objective})"
        )));
    }

    Ok(Relaxation { objective, values })
}
