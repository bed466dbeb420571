//! Discount Solutions
//!
//! A solution is an ordered sequence of coupons applied one after another. The order
//! matters: each coupon is evaluated against what is left to pay after the coupons
//! before it.

use serde::Serialize;
use smallvec::SmallVec;

use crate::{coupons::CouponId, orders::LineItemId};

pub mod combinations;
pub mod evaluation;
pub mod selection;

pub use combinations::{generate_candidates, generate_candidates_within};
pub use evaluation::evaluate;
pub use selection::select_best;

/// An ordered sequence of indexes into the applicable coupon list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateSolution {
    coupons: SmallVec<[usize; 8]>,
}

impl CandidateSolution {
    /// Create a candidate from coupon indexes, in application order.
    pub fn new(coupons: impl IntoIterator<Item = usize>) -> Self {
        Self {
            coupons: coupons.into_iter().collect(),
        }
    }

    /// Coupon indexes in application order.
    pub fn coupons(&self) -> &[usize] {
        &self.coupons
    }

    /// Number of coupons in the candidate.
    pub fn len(&self) -> usize {
        self.coupons.len()
    }

    /// Check if the candidate has no coupons.
    pub fn is_empty(&self) -> bool {
        self.coupons.is_empty()
    }
}

/// Accumulated discount per line item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiscountDetail {
    entries: SmallVec<[(LineItemId, i64); 10]>,
}

impl DiscountDetail {
    /// Start every line item at zero discount.
    pub fn zeroed(items: impl IntoIterator<Item = LineItemId>) -> Self {
        Self {
            entries: items.into_iter().map(|id| (id, 0)).collect(),
        }
    }

    /// Discount accumulated so far for the line item at `index`.
    pub fn at(&self, index: usize) -> Option<i64> {
        self.entries.get(index).map(|(_, discount)| *discount)
    }

    /// Discount accumulated so far for a line item.
    pub fn get(&self, id: LineItemId) -> Option<i64> {
        self.entries
            .iter()
            .find(|(item, _)| *item == id)
            .map(|(_, discount)| *discount)
    }

    /// Add to the discount for the line item at `index`.
    pub(crate) fn add(&mut self, index: usize, delta: i64) -> Option<()> {
        let (_, discount) = self.entries.get_mut(index)?;
        *discount = discount.checked_add(delta)?;

        Some(())
    }

    /// Iterate over `(line item, discount)` pairs in order position.
    pub fn iter(&self) -> impl Iterator<Item = (LineItemId, i64)> + '_ {
        self.entries.iter().copied()
    }

    /// Sum of all per-item discounts.
    pub fn total(&self) -> i64 {
        self.entries.iter().map(|(_, discount)| discount).sum()
    }
}

/// An evaluated coupon combination.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiscountSolution {
    coupon_ids: Vec<CouponId>,
    rules: Vec<String>,
    discount_amount: i64,
    detail: DiscountDetail,
}

impl DiscountSolution {
    pub(crate) fn new(detail: DiscountDetail) -> Self {
        Self {
            coupon_ids: Vec::new(),
            rules: Vec::new(),
            discount_amount: 0,
            detail,
        }
    }

    pub(crate) fn push(&mut self, coupon: CouponId, rule: String, discount: i64) -> Option<()> {
        self.discount_amount = self.discount_amount.checked_add(discount)?;
        self.coupon_ids.push(coupon);
        self.rules.push(rule);

        Some(())
    }

    pub(crate) fn detail_mut(&mut self) -> &mut DiscountDetail {
        &mut self.detail
    }

    /// Coupons that contributed, in application order.
    pub fn coupon_ids(&self) -> &[CouponId] {
        &self.coupon_ids
    }

    /// Rule descriptions, one per contributing coupon.
    pub fn rules(&self) -> &[String] {
        &self.rules
    }

    /// Total discount in minor units.
    pub fn discount_amount(&self) -> i64 {
        self.discount_amount
    }

    /// Per line item discount breakdown.
    pub fn detail(&self) -> &DiscountDetail {
        &self.detail
    }

    /// Canonical key for the set of coupons used: sorted ids joined with commas.
    pub fn coupon_set_key(&self) -> String {
        let mut ids = self.coupon_ids.clone();
        ids.sort_unstable();

        ids.iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(",")
    }
}
