//! Solution Evaluator

use smallvec::SmallVec;
use thiserror::Error;

use crate::{
    discounts::DiscountError,
    filter::ApplicableCoupon,
    orders::{Order, OrderLineItem},
    solutions::{CandidateSolution, DiscountDetail, DiscountSolution},
};

/// Errors raised while evaluating a candidate solution.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EvaluationError {
    /// The candidate refers to a coupon index that does not exist.
    #[error("Candidate refers to unknown coupon index {0}")]
    UnknownCoupon(usize),

    /// A coupon scope refers to a line item index that does not exist.
    #[error("Coupon scope refers to unknown line item index {0}")]
    UnknownItem(usize),

    /// A discount is larger than what remains to pay on its line items.
    #[error("Discount of {discount} exceeds remaining amount of {remaining}")]
    ExceedsRemaining {
        /// Discount being spread.
        discount: i64,
        /// Remaining amount across the coupon's line items.
        remaining: i64,
    },

    /// Minor unit arithmetic overflowed.
    #[error("Discount arithmetic overflowed minor units")]
    Overflow,

    /// Wrapped discount calculation error.
    #[error(transparent)]
    Discount(#[from] DiscountError),
}

/// Apply the coupons of `candidate` to `order` in sequence.
///
/// Each coupon is checked against what remains to be paid on the line items in its
/// scope. Coupons that cannot be used at that point are skipped rather than failing
/// the whole candidate, so the result may carry fewer coupons than the candidate, or
/// none at all.
///
/// # Errors
///
/// Returns an [`EvaluationError`] if the candidate or a coupon scope refers to a
/// missing index, or if discount arithmetic fails.
pub fn evaluate(
    order: &Order,
    coupons: &[ApplicableCoupon],
    candidate: &CandidateSolution,
) -> Result<DiscountSolution, EvaluationError> {
    let detail = DiscountDetail::zeroed(order.iter().map(OrderLineItem::id));
    let mut solution = DiscountSolution::new(detail);

    for &coupon_idx in candidate.coupons() {
        let applicable = coupons
            .get(coupon_idx)
            .ok_or(EvaluationError::UnknownCoupon(coupon_idx))?;

        let remaining = remaining_amounts(order, solution.detail(), applicable.items())?;
        let remaining_total = remaining
            .iter()
            .try_fold(0i64, |acc, &(_, amount)| acc.checked_add(amount))
            .ok_or(EvaluationError::Overflow)?;

        let coupon = applicable.coupon();
        let rule = coupon.rule();

        if !rule.can_use(remaining_total) {
            continue;
        }

        let discount = rule.calculate_discount(remaining_total)?;

        prorate(solution.detail_mut(), &remaining, remaining_total, discount)?;

        solution
            .push(coupon.id(), rule.describe(order.currency()), discount)
            .ok_or(EvaluationError::Overflow)?;
    }

    Ok(solution)
}

/// What is left to pay on each in-scope line item, as `(index, amount)` pairs.
fn remaining_amounts(
    order: &Order,
    detail: &DiscountDetail,
    items: &[usize],
) -> Result<SmallVec<[(usize, i64); 10]>, EvaluationError> {
    items
        .iter()
        .map(|&idx| {
            let item = order.get(idx).ok_or(EvaluationError::UnknownItem(idx))?;
            let discounted = detail.at(idx).ok_or(EvaluationError::UnknownItem(idx))?;

            item.price()
                .checked_sub(discounted)
                .map(|amount| (idx, amount))
                .ok_or(EvaluationError::Overflow)
        })
        .collect()
}

/// Spread `discount` across the line items in proportion to what remains on each.
///
/// Items with nothing left to pay take no share. Every other item but the last
/// takes its floored share, and the last takes whatever is left so the shares add
/// up to `discount`. Any part of that remainder above the last item's remaining
/// amount moves to earlier items with room, latest first.
fn prorate(
    detail: &mut DiscountDetail,
    remaining: &[(usize, i64)],
    remaining_total: i64,
    discount: i64,
) -> Result<(), EvaluationError> {
    let payable: SmallVec<[(usize, i64); 10]> = remaining
        .iter()
        .copied()
        .filter(|&(_, amount)| amount > 0)
        .collect();

    let Some((&(last_idx, last_amount), rest)) = payable.split_last() else {
        return Ok(());
    };

    // (index, remaining, share)
    let mut shares: SmallVec<[(usize, i64, i64); 10]> = SmallVec::with_capacity(payable.len());
    let mut distributed = 0i64;

    for &(idx, amount) in rest {
        let share = i128::from(discount)
            .checked_mul(i128::from(amount))
            .and_then(|scaled| scaled.checked_div(i128::from(remaining_total)))
            .and_then(|share| i64::try_from(share).ok())
            .ok_or(EvaluationError::Overflow)?;

        shares.push((idx, amount, share));
        distributed = distributed
            .checked_add(share)
            .ok_or(EvaluationError::Overflow)?;
    }

    let remainder = discount
        .checked_sub(distributed)
        .ok_or(EvaluationError::Overflow)?;
    let last_share = remainder.min(last_amount);

    shares.push((last_idx, last_amount, last_share));

    let mut excess = remainder
        .checked_sub(last_share)
        .ok_or(EvaluationError::Overflow)?;

    for (_, amount, share) in shares.iter_mut().rev() {
        if excess <= 0 {
            break;
        }

        let extra = amount
            .checked_sub(*share)
            .ok_or(EvaluationError::Overflow)?
            .clamp(0, excess);

        *share = share.checked_add(extra).ok_or(EvaluationError::Overflow)?;
        excess = excess.checked_sub(extra).ok_or(EvaluationError::Overflow)?;
    }

    if excess > 0 {
        return Err(EvaluationError::ExceedsRemaining {
            discount,
            remaining: remaining_total,
        });
    }

    for (idx, _, share) in shares {
        detail.add(idx, share).ok_or(EvaluationError::UnknownItem(idx))?;
    }

    Ok(())
}
