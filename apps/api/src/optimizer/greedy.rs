//! Ratio-greedy repair — the approximate path, also the exact search's first incumbent.
//!
//! Items are ranked by `weight / max(time/T, cost/C)`: efficiency against whichever
//! budget the item presses hardest. Admission walks that order and skips (never stops at)
//! items that would break either budget, so the result is always feasible.

use crate::optimizer::Item;

/// A feasible subset of ranked items (positions into the ranked slice).
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Selection {
    pub chosen: Vec<usize>,
    pub weight: f64,
}

/// Share of a budget consumed by `amount`. Zero-size items consume nothing.
fn share(amount: f64, budget: f64) -> f64 {
    if amount <= 0.0 {
        0.0
    } else {
        amount / budget
    }
}

pub(crate) fn efficiency(item: &Item<'_>, time_budget: f64, cost_budget: f64) -> f64 {
    let binding = share(item.time, time_budget).max(share(item.cost, cost_budget));
    if binding <= 0.0 {
        f64::INFINITY
    } else {
        item.weight / binding
    }
}

/// Sorts items by efficiency desc, then weight desc, then skill id.
pub(crate) fn rank(items: &mut [Item<'_>], time_budget: f64, cost_budget: f64) {
    items.sort_by(|a, b| {
        let ea = efficiency(a, time_budget, cost_budget);
        let eb = efficiency(b, time_budget, cost_budget);
        eb.total_cmp(&ea)
            .then_with(|| b.weight.total_cmp(&a.weight))
            .then_with(|| a.skill.cmp(b.skill))
    });
}

/// Admits ranked items in order while both running sums stay within budget.
pub(crate) fn admit(items: &[Item<'_>], time_budget: f64, cost_budget: f64) -> Selection {
    let mut chosen = Vec::new();
    let mut weight = 0.0;
    let mut time = 0.0;
    let mut cost = 0.0;

    for (pos, item) in items.iter().enumerate() {
        let next_time = time + item.time;
        let next_cost = cost + item.cost;
        if next_time <= time_budget && next_cost <= cost_budget {
            chosen.push(pos);
            weight += item.weight;
            time = next_time;
            cost = next_cost;
        }
    }

    Selection { chosen, weight }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(skill: &str, weight: f64, time: f64, cost: f64) -> Item<'_> {
        Item {
            gap_index: 0,
            skill,
            weight,
            time,
            cost,
        }
    }

    #[test]
    fn test_efficiency_uses_tighter_budget() {
        // time share 0.5, cost share 0.25 → binding 0.5
        let it = item("sql", 0.6, 1.0, 25.0);
        assert!((efficiency(&it, 2.0, 100.0) - 1.2).abs() < 1e-12);
    }

    #[test]
    fn test_efficiency_zero_size_is_infinite() {
        let it = item("git", 0.3, 0.0, 0.0);
        assert!(efficiency(&it, 0.0, 0.0).is_infinite());
    }

    #[test]
    fn test_rank_breaks_ties_by_weight_then_skill() {
        let mut items = vec![
            item("b", 0.3, 1.0, 0.0),
            item("a", 0.3, 1.0, 0.0),
            item("c", 0.6, 2.0, 0.0),
        ];
        rank(&mut items, 4.0, 10.0);
        let order: Vec<_> = items.iter().map(|i| i.skill).collect();
        assert_eq!(order, vec!["c", "a", "b"]);
    }

    #[test]
    fn test_admit_skips_violators_and_continues() {
        let items = vec![
            item("big", 1.0, 3.0, 10.0),
            item("huge", 0.9, 2.0, 10.0),
            item("small", 0.3, 1.0, 10.0),
        ];
        let sel = admit(&items, 4.0, 100.0);
        assert_eq!(sel.chosen, vec![0, 2]);
        assert!((sel.weight - 1.3).abs() < 1e-12);
    }
}
