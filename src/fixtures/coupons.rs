//! Coupon Fixtures

use decimal_percentage::Percentage;
use rustc_hash::FxHashMap;
use rusty_money::iso::Currency;
use serde::Deserialize;

use crate::{
    coupons::{Coupon, CouponId},
    discounts::DiscountRule,
    fixtures::{
        FixtureError,
        orders::{ensure_currency, parse_price},
    },
    orders::CategoryId,
    wallets::UserId,
};

/// Coupons, scopes and wallets in YAML
#[derive(Debug, Deserialize)]
pub struct CouponsFixture {
    /// Coupons in pool order
    pub coupons: Vec<CouponFixture>,

    /// Coupon id -> categories it is restricted to
    #[serde(default)]
    pub scopes: FxHashMap<CouponId, Vec<CategoryId>>,

    /// User id -> ids of the coupons in their wallet
    #[serde(default)]
    pub wallets: FxHashMap<UserId, Vec<CouponId>>,
}

/// Coupon in YAML
#[derive(Debug, Deserialize)]
pub struct CouponFixture {
    /// Coupon id
    pub id: CouponId,

    /// Whether the coupon only applies to its scoped categories
    #[serde(default)]
    pub specific: bool,

    /// Discount configuration
    pub discount: DiscountFixture,
}

/// Discount configuration in YAML
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DiscountFixture {
    /// Flat reduction, no minimum spend
    NoThreshold {
        /// Reduction (e.g., "0.20 GBP")
        amount: String,
    },

    /// Flat reduction above a minimum spend
    Threshold {
        /// Minimum spend
        threshold: String,
        /// Reduction
        amount: String,
    },

    /// Reduction for every full step of spend
    PerThreshold {
        /// Spend per step
        step: String,
        /// Reduction per step
        amount: String,
        /// Optional limit on the total reduction
        #[serde(default)]
        cap: Option<String>,
    },

    /// Percentage off above an optional minimum spend
    PercentageOff {
        /// Minimum spend
        #[serde(default)]
        threshold: Option<String>,
        /// Percentage (e.g., "25%" or "0.25")
        percentage: String,
        /// Optional limit on the reduction
        #[serde(default)]
        cap: Option<String>,
    },
}

impl CouponFixture {
    /// Convert to a validated [`Coupon`] priced in `currency`.
    ///
    /// # Errors
    ///
    /// Returns an error if an amount is malformed, in another currency, or the
    /// resulting coupon fails validation.
    pub fn try_into_coupon(self, currency: &'static Currency) -> Result<Coupon, FixtureError> {
        let rule = match &self.discount {
            DiscountFixture::NoThreshold { amount } => DiscountRule::NoThreshold {
                amount: minor_units(amount, currency)?,
            },
            DiscountFixture::Threshold { threshold, amount } => DiscountRule::Threshold {
                threshold: minor_units(threshold, currency)?,
                amount: minor_units(amount, currency)?,
            },
            DiscountFixture::PerThreshold { step, amount, cap } => DiscountRule::PerThreshold {
                step: minor_units(step, currency)?,
                amount: minor_units(amount, currency)?,
                cap: optional_minor_units(cap.as_deref(), currency)?,
            },
            DiscountFixture::PercentageOff {
                threshold,
                percentage,
                cap,
            } => DiscountRule::PercentageOff {
                threshold: optional_minor_units(threshold.as_deref(), currency)?.unwrap_or(0),
                percentage: parse_percentage(percentage)?,
                cap: optional_minor_units(cap.as_deref(), currency)?,
            },
        };

        Ok(Coupon::new(self.id, rule, self.specific)?)
    }
}

fn minor_units(value: &str, currency: &'static Currency) -> Result<i64, FixtureError> {
    let (minor_units, found) = parse_price(value)?;
    ensure_currency(currency, found)?;

    Ok(minor_units)
}

fn optional_minor_units(
    value: Option<&str>,
    currency: &'static Currency,
) -> Result<Option<i64>, FixtureError> {
    value.map(|value| minor_units(value, currency)).transpose()
}

/// Parse percentage string (e.g., "15%" or "0.15") into a `Percentage`
///
/// # Errors
///
/// Returns an error if the string is not a number in either format.
pub fn parse_percentage(s: &str) -> Result<Percentage, FixtureError> {
    let trimmed = s.trim();

    let (number, scale) = match trimmed.strip_suffix('%') {
        Some(points) => (points.trim(), 100.0),
        None => (trimmed, 1.0),
    };

    let value = number
        .parse::<f64>()
        .map_err(|_err| FixtureError::InvalidPercentage(s.to_string()))?;

    Ok(Percentage::from(value / scale))
}

#[cfg(test)]
mod tests {
    use rusty_money::iso::{EUR, GBP};
    use testresult::TestResult;

    use crate::coupons::CouponError;

    use super::*;

    #[test]
    fn parse_percentage_accepts_both_formats() -> TestResult {
        assert_eq!(parse_percentage("15%")?, Percentage::from(0.15));
        assert_eq!(parse_percentage("0.15")?, Percentage::from(0.15));
        assert_eq!(parse_percentage("  25% ")?, Percentage::from(0.25));

        Ok(())
    }

    #[test]
    fn parse_percentage_rejects_invalid_format() {
        let result = parse_percentage("a quarter");

        assert!(matches!(result, Err(FixtureError::InvalidPercentage(_))));
    }

    #[test]
    fn coupons_fixture_parses_every_kind() -> TestResult {
        let yaml = r#"
coupons:
  - id: 1
    discount:
      type: no_threshold
      amount: "0.20 GBP"
  - id: 2
    discount:
      type: threshold
      threshold: "50.00 GBP"
      amount: "5.00 GBP"
  - id: 3
    discount:
      type: per_threshold
      step: "50.00 GBP"
      amount: "5.00 GBP"
      cap: "20.00 GBP"
  - id: 4
    specific: true
    discount:
      type: percentage_off
      percentage: "25%"
scopes:
  4: [2, 3]
wallets:
  7: [1, 4]
"#;

        let fixture: CouponsFixture = serde_norway::from_str(yaml)?;

        assert_eq!(fixture.scopes.get(&CouponId(4)), Some(&vec![CategoryId(2), CategoryId(3)]));
        assert_eq!(fixture.wallets.get(&UserId(7)), Some(&vec![CouponId(1), CouponId(4)]));

        let coupons = fixture
            .coupons
            .into_iter()
            .map(|coupon| coupon.try_into_coupon(GBP))
            .collect::<Result<Vec<_>, _>>()?;

        assert_eq!(coupons.len(), 4);
        assert!(matches!(
            coupons.get(2).map(Coupon::rule),
            Some(DiscountRule::PerThreshold {
                step: 5000,
                amount: 500,
                cap: Some(2000)
            })
        ));
        assert!(coupons.get(3).is_some_and(Coupon::is_specific));

        Ok(())
    }

    #[test]
    fn coupon_in_another_currency_is_rejected() -> TestResult {
        let yaml = r#"
id: 1
discount:
  type: no_threshold
  amount: "0.20 EUR"
"#;

        let fixture: CouponFixture = serde_norway::from_str(yaml)?;
        let result = fixture.try_into_coupon(GBP);

        assert!(matches!(
            result,
            Err(FixtureError::CurrencyMismatch(expected, found)) if expected == "GBP" && found == "EUR"
        ));

        Ok(())
    }

    #[test]
    fn invalid_coupon_is_rejected() -> TestResult {
        let yaml = r#"
id: 9
discount:
  type: percentage_off
  percentage: "150%"
"#;

        let fixture: CouponFixture = serde_norway::from_str(yaml)?;
        let result = fixture.try_into_coupon(EUR);

        assert!(matches!(
            result,
            Err(FixtureError::Coupon(CouponError::PercentageOutOfRange(CouponId(9))))
        ));

        Ok(())
    }
}
