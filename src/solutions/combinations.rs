//! Combination Generator

use smallvec::SmallVec;

use crate::solutions::CandidateSolution;

/// Number of candidates [`generate_candidates`] produces for `n` coupons.
///
/// Every ordering of every subset of size two or more, plus one singleton per coupon.
/// Returns `None` if the count does not fit in `usize`.
pub fn candidate_count(n: usize) -> Option<usize> {
    let mut total = n;
    let mut orderings = n;

    for k in 2..=n {
        orderings = orderings.checked_mul(n - k + 1)?;
        total = total.checked_add(orderings)?;
    }

    Some(total)
}

/// Generate every candidate solution for `n` applicable coupons.
///
/// Multi-coupon candidates come first, as every ordering of every subset with at
/// least two coupons. One singleton per coupon is appended afterwards so each usable
/// coupon is always evaluated on its own.
pub fn generate_candidates(n: usize) -> Vec<CandidateSolution> {
    let combinable: SmallVec<[usize; 8]> = (0..n).collect();

    generate_candidates_within(n, &combinable)
}

/// Generate candidates for `n` coupons, combining only the indexes in `combinable`.
///
/// Orderings of two or more coupons are drawn from `combinable` alone. Every one of
/// the `n` coupons still gets its singleton.
pub fn generate_candidates_within(n: usize, combinable: &[usize]) -> Vec<CandidateSolution> {
    let capacity = candidate_count(combinable.len())
        .and_then(|count| count.checked_add(n.saturating_sub(combinable.len())))
        .unwrap_or(n);

    let mut candidates = Vec::with_capacity(capacity);
    let mut prefix: SmallVec<[usize; 8]> = SmallVec::with_capacity(combinable.len());
    let mut used: SmallVec<[bool; 8]> = SmallVec::from_elem(false, combinable.len());

    extend(combinable, &mut prefix, &mut used, &mut candidates);

    candidates.extend((0..n).map(|idx| CandidateSolution::new([idx])));

    candidates
}

fn extend(
    combinable: &[usize],
    prefix: &mut SmallVec<[usize; 8]>,
    used: &mut SmallVec<[bool; 8]>,
    candidates: &mut Vec<CandidateSolution>,
) {
    for (pos, &idx) in combinable.iter().enumerate() {
        if used.get(pos).copied().unwrap_or(true) {
            continue;
        }

        prefix.push(idx);

        if let Some(flag) = used.get_mut(pos) {
            *flag = true;
        }

        if prefix.len() >= 2 {
            candidates.push(CandidateSolution::new(prefix.iter().copied()));
        }

        extend(combinable, prefix, used, candidates);

        if let Some(flag) = used.get_mut(pos) {
            *flag = false;
        }

        prefix.pop();
    }
}
