//! Discounts
//!
//! The discount kinds a coupon can carry. Each kind decides its own eligibility
//! against an amount, the size of the discount for that amount, and how the rule
//! reads to a customer.

use decimal_percentage::Percentage;
use rust_decimal::{Decimal, RoundingStrategy, prelude::ToPrimitive};
use rusty_money::{Money, iso::Currency};
use thiserror::Error;

/// Errors specific to discount calculations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DiscountError {
    /// Percentage calculation could not be safely converted.
    #[error("percentage conversion overflowed or was not finite")]
    PercentConversion,

    /// Minor unit arithmetic overflowed.
    #[error("discount arithmetic overflowed minor units")]
    Overflow,

    /// A discount was calculated for an amount the rule cannot be used with.
    #[error("discount of {discount} exceeds eligible amount {amount}")]
    ExceedsAmount {
        /// Calculated discount in minor units
        discount: i64,
        /// Amount the discount was calculated against
        amount: i64,
    },
}

/// Discount configuration for a coupon.
///
/// All amounts are in minor units of the order currency.
#[derive(Debug, Copy, Clone)]
pub enum DiscountRule {
    /// Flat reduction with no minimum spend (e.g., "£2 off").
    ///
    /// Still requires the amount to exceed the reduction, so the payable amount never
    /// drops to zero or below.
    NoThreshold {
        /// Reduction amount
        amount: i64,
    },

    /// Flat reduction once a minimum spend is reached (e.g., "£5 off £50").
    Threshold {
        /// Minimum spend
        threshold: i64,
        /// Reduction amount
        amount: i64,
    },

    /// Reduction for every full step of spend (e.g., "£5 off every £50, up to £20").
    PerThreshold {
        /// Spend per step
        step: i64,
        /// Reduction per step
        amount: i64,
        /// Optional upper limit on the total reduction
        cap: Option<i64>,
    },

    /// Percentage off once a minimum spend is reached (e.g., "25% off £50, up to £10").
    PercentageOff {
        /// Minimum spend, zero for none
        threshold: i64,
        /// Fraction of the amount taken off
        percentage: Percentage,
        /// Optional upper limit on the reduction
        cap: Option<i64>,
    },
}

impl DiscountRule {
    /// Whether the rule can be applied to the given amount.
    pub fn can_use(&self, amount: i64) -> bool {
        match *self {
            DiscountRule::NoThreshold { amount: off } => amount > off,
            DiscountRule::Threshold {
                threshold,
                amount: off,
            } => amount >= threshold && amount > off,
            DiscountRule::PerThreshold { step, .. } => step > 0 && amount >= step,
            DiscountRule::PercentageOff { threshold, .. } => amount >= threshold && amount > 0,
        }
    }

    /// Calculate the discount for the given amount.
    ///
    /// The result is never negative and never exceeds `amount`.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - a percentage cannot be safely represented in minor units
    ///   (`DiscountError::PercentConversion`).
    /// - step arithmetic overflows (`DiscountError::Overflow`).
    /// - the rule would take off more than `amount` (`DiscountError::ExceedsAmount`).
    pub fn calculate_discount(&self, amount: i64) -> Result<i64, DiscountError> {
        let discount = match *self {
            DiscountRule::NoThreshold { amount: off } | DiscountRule::Threshold { amount: off, .. } => {
                off
            }
            DiscountRule::PerThreshold {
                step,
                amount: off,
                cap,
            } => {
                let steps = amount.checked_div(step).ok_or(DiscountError::Overflow)?;
                let discount = steps.checked_mul(off).ok_or(DiscountError::Overflow)?;

                apply_cap(discount, cap)
            }
            DiscountRule::PercentageOff {
                percentage, cap, ..
            } => apply_cap(percent_of_minor(&percentage, amount)?, cap),
        };

        if discount > amount {
            return Err(DiscountError::ExceedsAmount { discount, amount });
        }

        Ok(discount.max(0))
    }

    /// Human readable description of the rule, with amounts in `currency`.
    pub fn describe(&self, currency: &'static Currency) -> String {
        let money = |minor: i64| Money::from_minor(minor, currency);

        match *self {
            DiscountRule::NoThreshold { amount } => {
                format!("{} off, no minimum spend", money(amount))
            }
            DiscountRule::Threshold { threshold, amount } => {
                format!("{} off when you spend {}", money(amount), money(threshold))
            }
            DiscountRule::PerThreshold { step, amount, cap } => {
                let rule = format!("{} off every {} spent", money(amount), money(step));

                with_cap(rule, cap.map(money))
            }
            DiscountRule::PercentageOff {
                threshold,
                percentage,
                cap,
            } => {
                let points = (percentage * Decimal::ONE_HUNDRED).normalize();

                let rule = if threshold > 0 {
                    format!("{points}% off when you spend {}", money(threshold))
                } else {
                    format!("{points}% off")
                };

                with_cap(rule, cap.map(money))
            }
        }
    }
}

fn apply_cap(discount: i64, cap: Option<i64>) -> i64 {
    cap.map_or(discount, |cap| discount.min(cap))
}

fn with_cap(rule: String, cap: Option<Money<'static, Currency>>) -> String {
    match cap {
        Some(cap) => format!("{rule}, up to {cap}"),
        None => rule,
    }
}

/// Calculate a percentage of a minor unit amount, truncated toward zero.
///
/// # Errors
///
/// Returns `DiscountError::PercentConversion` if the result cannot be represented.
pub fn percent_of_minor(percent: &Percentage, minor: i64) -> Result<i64, DiscountError> {
    ((*percent) * Decimal::ONE)
        .checked_mul(Decimal::from(minor))
        .ok_or(DiscountError::PercentConversion)?
        .round_dp_with_strategy(0, RoundingStrategy::ToZero)
        .to_i64()
        .ok_or(DiscountError::PercentConversion)
}
