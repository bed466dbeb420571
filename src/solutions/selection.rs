//! Best-Solution Selector
//!
//! Reduces evaluated solutions to the ones worth offering: the best ordering for each
//! set of coupons, and the fewest coupons for each discount amount. Single-coupon
//! solutions are always offered so every usable coupon has a fallback.

use std::cmp::Ordering;

use rustc_hash::{FxHashMap, FxHashSet};

use crate::solutions::DiscountSolution;

/// Select the dominant solutions, sorted by descending discount.
///
/// Solutions that save nothing are dropped. The input is put into a canonical order
/// (fewest coupons first, then by coupon id sequence) before reduction, so the
/// result does not depend on the order solutions arrive in.
pub fn select_best(solutions: Vec<DiscountSolution>) -> Vec<DiscountSolution> {
    let mut solutions: Vec<DiscountSolution> = solutions
        .into_iter()
        .filter(|solution| solution.discount_amount() > 0)
        .collect();

    solutions.sort_by(canonical_order);

    let mut best_by_coupon_set: FxHashMap<String, usize> = FxHashMap::default();
    let mut best_by_discount_amount: FxHashMap<i64, usize> = FxHashMap::default();
    let mut singletons: FxHashSet<usize> = FxHashSet::default();

    for (idx, solution) in solutions.iter().enumerate() {
        let key = solution.coupon_set_key();

        let improves = best_by_coupon_set
            .get(&key)
            .and_then(|&best| solutions.get(best))
            .is_none_or(|best| best.discount_amount() < solution.discount_amount());

        if !improves {
            continue;
        }

        best_by_coupon_set.insert(key, idx);

        // Earlier solutions never use more coupons, so an existing entry for this
        // amount is at least as coupon-efficient.
        best_by_discount_amount
            .entry(solution.discount_amount())
            .or_insert(idx);

        if solution.coupon_ids().len() == 1 {
            singletons.insert(idx);
        }
    }

    let best_sets: FxHashSet<usize> = best_by_coupon_set.into_values().collect();
    let mut efficient: FxHashSet<usize> = best_by_discount_amount.into_values().collect();
    efficient.extend(singletons);

    let mut selected: Vec<DiscountSolution> = solutions
        .into_iter()
        .enumerate()
        .filter(|(idx, _)| best_sets.contains(idx) && efficient.contains(idx))
        .map(|(_, solution)| solution)
        .collect();

    selected.sort_by(ranking_order);

    selected
}

fn canonical_order(a: &DiscountSolution, b: &DiscountSolution) -> Ordering {
    a.coupon_ids()
        .len()
        .cmp(&b.coupon_ids().len())
        .then_with(|| a.coupon_ids().cmp(b.coupon_ids()))
}

fn ranking_order(a: &DiscountSolution, b: &DiscountSolution) -> Ordering {
    b.discount_amount()
        .cmp(&a.discount_amount())
        .then_with(|| canonical_order(a, b))
}

#[cfg(test)]
mod tests {
    use crate::{
        coupons::CouponId,
        orders::LineItemId,
        solutions::{DiscountDetail, DiscountSolution},
    };

    use super::*;

    fn solution(steps: &[(u64, i64)]) -> DiscountSolution {
        let mut solution = DiscountSolution::new(DiscountDetail::zeroed([LineItemId(1)]));

        for &(id, discount) in steps {
            solution.detail_mut().add(0, discount);
            solution.push(CouponId(id), format!("coupon {id}"), discount);
        }

        solution
    }

    fn ids(solutions: &[DiscountSolution]) -> Vec<Vec<u64>> {
        solutions
            .iter()
            .map(|solution| solution.coupon_ids().iter().map(|id| id.0).collect())
            .collect()
    }

    #[test]
    fn empty_input_selects_nothing() {
        assert!(select_best(Vec::new()).is_empty());
    }

    #[test]
    fn zero_discount_solutions_are_dropped() {
        let selected = select_best(vec![DiscountSolution::new(DiscountDetail::zeroed([]))]);

        assert!(selected.is_empty());
    }

    #[test]
    fn best_ordering_wins_for_coupon_set() {
        let selected = select_best(vec![
            solution(&[(1, 20), (2, 30)]),
            solution(&[(2, 50), (1, 20)]),
        ]);

        assert_eq!(ids(&selected), vec![vec![2, 1]]);
        assert_eq!(selected.first().map(DiscountSolution::discount_amount), Some(70));
    }

    #[test]
    fn exact_tie_keeps_smallest_sequence() {
        let selected = select_best(vec![
            solution(&[(2, 10), (1, 20)]),
            solution(&[(1, 20), (2, 10)]),
        ]);

        assert_eq!(ids(&selected), vec![vec![1, 2]]);
    }

    #[test]
    fn fewer_coupons_win_for_equal_savings() {
        let selected = select_best(vec![
            solution(&[(1, 10), (2, 10), (3, 10)]),
            solution(&[(4, 15), (5, 15)]),
        ]);

        assert_eq!(ids(&selected), vec![vec![4, 5]]);
    }

    #[test]
    fn singletons_always_survive() {
        let selected = select_best(vec![
            solution(&[(1, 30)]),
            solution(&[(2, 30)]),
            solution(&[(3, 10), (4, 20)]),
        ]);

        assert_eq!(ids(&selected), vec![vec![1], vec![2]]);
    }

    #[test]
    fn results_sorted_by_descending_discount() {
        let selected = select_best(vec![
            solution(&[(2, 10)]),
            solution(&[(1, 20)]),
            solution(&[(1, 20), (2, 10)]),
        ]);

        let amounts: Vec<i64> = selected
            .iter()
            .map(DiscountSolution::discount_amount)
            .collect();

        assert_eq!(amounts, vec![30, 20, 10]);
    }

    #[test]
    fn selection_ignores_arrival_order() {
        let input = vec![
            solution(&[(1, 20)]),
            solution(&[(2, 10)]),
            solution(&[(1, 20), (2, 10)]),
            solution(&[(2, 10), (1, 20)]),
            solution(&[(3, 30)]),
            solution(&[(1, 15), (3, 15)]),
            solution(&[(3, 30), (1, 5)]),
        ];

        let mut reversed = input.clone();
        reversed.reverse();

        let mut rotated = input.clone();
        rotated.rotate_left(3);

        let expected = select_best(input);

        assert_eq!(select_best(reversed), expected);
        assert_eq!(select_best(rotated), expected);
    }
}
