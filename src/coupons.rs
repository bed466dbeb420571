//! Coupons

use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::discounts::DiscountRule;

/// Coupon identifier (the user's issued coupon, not the coupon template).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CouponId(pub u64);

impl fmt::Display for CouponId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Errors raised when a coupon's discount configuration is unusable.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CouponError {
    /// The discount value must be strictly positive.
    #[error("Coupon {0} has non-positive discount value {1}")]
    NonPositiveValue(CouponId, i64),

    /// Thresholds cannot be negative.
    #[error("Coupon {0} has negative threshold {1}")]
    NegativeThreshold(CouponId, i64),

    /// Per-threshold reductions need a step larger than the reduction itself.
    #[error("Coupon {0} takes {1} off every {2}, which can exceed the amount spent")]
    StepTooSmall(CouponId, i64, i64),

    /// Percentages must lie strictly between zero and one.
    #[error("Coupon {0} has a percentage outside (0, 1)")]
    PercentageOutOfRange(CouponId),

    /// Caps must be strictly positive when present.
    #[error("Coupon {0} has non-positive cap {1}")]
    NonPositiveCap(CouponId, i64),
}

/// A coupon the user can currently spend.
#[derive(Debug, Clone)]
pub struct Coupon {
    id: CouponId,
    rule: DiscountRule,
    specific: bool,
}

impl Coupon {
    /// Create a coupon, validating its discount rule.
    ///
    /// `specific` coupons only apply to the categories returned by a
    /// [`ScopeResolver`](crate::scopes::ScopeResolver).
    ///
    /// # Errors
    ///
    /// Returns a [`CouponError`] if the rule could produce a negative discount or a
    /// discount larger than the amount it is applied to.
    pub fn new(id: CouponId, rule: DiscountRule, specific: bool) -> Result<Self, CouponError> {
        validate(id, &rule)?;

        Ok(Self { id, rule, specific })
    }

    /// Returns the coupon id
    pub fn id(&self) -> CouponId {
        self.id
    }

    /// Returns the discount rule
    pub fn rule(&self) -> &DiscountRule {
        &self.rule
    }

    /// Whether the coupon is restricted to specific categories.
    pub fn is_specific(&self) -> bool {
        self.specific
    }
}

fn validate(id: CouponId, rule: &DiscountRule) -> Result<(), CouponError> {
    let positive = |value: i64| {
        if value > 0 {
            Ok(())
        } else {
            Err(CouponError::NonPositiveValue(id, value))
        }
    };

    let threshold = |value: i64| {
        if value < 0 {
            Err(CouponError::NegativeThreshold(id, value))
        } else {
            Ok(())
        }
    };

    let cap = |value: Option<i64>| match value {
        Some(value) if value <= 0 => Err(CouponError::NonPositiveCap(id, value)),
        _ => Ok(()),
    };

    match *rule {
        DiscountRule::NoThreshold { amount } => positive(amount),
        DiscountRule::Threshold {
            threshold: minimum,
            amount,
        } => {
            positive(amount)?;
            threshold(minimum)
        }
        DiscountRule::PerThreshold {
            step,
            amount,
            cap: limit,
        } => {
            positive(amount)?;
            positive(step)?;

            if amount >= step {
                return Err(CouponError::StepTooSmall(id, amount, step));
            }

            cap(limit)
        }
        DiscountRule::PercentageOff {
            threshold: minimum,
            percentage,
            cap: limit,
        } => {
            threshold(minimum)?;

            let fraction = percentage * Decimal::ONE;

            if fraction <= Decimal::ZERO || fraction >= Decimal::ONE {
                return Err(CouponError::PercentageOutOfRange(id));
            }

            cap(limit)
        }
    }
}
