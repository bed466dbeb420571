//! Coupon Filter
//!
//! Narrows a coupon pool down to coupons that can be used with an order, pairing
//! each with the line items it may discount.

use smallvec::SmallVec;
use tracing::trace;

use crate::{
    coupons::Coupon,
    orders::Order,
    scopes::{ScopeError, ScopeResolver},
};

/// Indexes of order line items a coupon applies to.
pub type ItemIndexes = SmallVec<[usize; 10]>;

/// A usable coupon and the order line items in its scope.
#[derive(Debug, Clone)]
pub struct ApplicableCoupon {
    coupon: Coupon,
    items: ItemIndexes,
    amount: i64,
}

impl ApplicableCoupon {
    /// The coupon
    pub fn coupon(&self) -> &Coupon {
        &self.coupon
    }

    /// Indexes of the order line items in scope, in order position.
    pub fn items(&self) -> &[usize] {
        &self.items
    }

    /// Full-price total of the line items in scope.
    pub fn amount(&self) -> i64 {
        self.amount
    }
}

/// Filter `coupons` down to those usable with `order`.
///
/// The order total is checked first as a cheap rejection. Coupons restricted to
/// specific categories are then checked again against only the line items in their
/// scope; a coupon whose scope matches no line item is dropped.
///
/// # Errors
///
/// Returns a [`ScopeError`] if a scope lookup fails.
pub fn filter_coupons<R: ScopeResolver + ?Sized>(
    order: &Order,
    coupons: &[Coupon],
    scopes: &R,
) -> Result<Vec<ApplicableCoupon>, ScopeError> {
    let subtotal = order.subtotal();
    let mut applicable = Vec::with_capacity(coupons.len());

    for coupon in coupons {
        if !coupon.rule().can_use(subtotal) {
            trace!(coupon = %coupon.id(), subtotal, "coupon rejected against order total");
            continue;
        }

        let items: ItemIndexes = if coupon.is_specific() {
            let categories = scopes.categories(coupon.id())?;

            order
                .iter()
                .enumerate()
                .filter(|(_, item)| categories.contains(&item.category()))
                .map(|(idx, _)| idx)
                .collect()
        } else {
            (0..order.len()).collect()
        };

        if items.is_empty() {
            trace!(coupon = %coupon.id(), "coupon scope matches no line items");
            continue;
        }

        let amount: i64 = items
            .iter()
            .filter_map(|&idx| order.get(idx))
            .map(|item| item.price())
            .sum();

        if !coupon.rule().can_use(amount) {
            trace!(coupon = %coupon.id(), amount, "coupon rejected against scoped total");
            continue;
        }

        applicable.push(ApplicableCoupon {
            coupon: coupon.clone(),
            items,
            amount,
        });
    }

    Ok(applicable)
}

#[cfg(test)]
mod tests {
    use rusty_money::iso::GBP;
    use testresult::TestResult;

    use crate::{
        coupons::CouponId,
        discounts::DiscountRule,
        orders::{CategoryId, LineItemId, OrderLineItem},
        scopes::StaticScopes,
    };

    use super::*;

    fn order() -> Result<Order, crate::orders::OrderError> {
        Order::with_items(
            [
                OrderLineItem::new(LineItemId(1), 70, CategoryId(1)),
                OrderLineItem::new(LineItemId(2), 30, CategoryId(2)),
            ],
            GBP,
        )
    }

    #[test]
    fn unrestricted_coupon_covers_every_item() -> TestResult {
        let coupon = Coupon::new(CouponId(1), DiscountRule::NoThreshold { amount: 20 }, false)?;

        let applicable = filter_coupons(&order()?, &[coupon], &StaticScopes::new())?;

        assert_eq!(applicable.len(), 1);
        assert_eq!(applicable.first().map(ApplicableCoupon::items), Some(&[0, 1][..]));
        assert_eq!(applicable.first().map(ApplicableCoupon::amount), Some(100));

        Ok(())
    }

    #[test]
    fn order_total_prefilter_rejects_coupon() -> TestResult {
        let coupon = Coupon::new(CouponId(1), DiscountRule::NoThreshold { amount: 100 }, false)?;

        let applicable = filter_coupons(&order()?, &[coupon], &StaticScopes::new())?;

        assert!(applicable.is_empty());

        Ok(())
    }

    #[test]
    fn specific_coupon_limited_to_scope() -> TestResult {
        let coupon = Coupon::new(CouponId(1), DiscountRule::NoThreshold { amount: 10 }, true)?;
        let mut scopes = StaticScopes::new();
        scopes.insert(CouponId(1), [CategoryId(2)]);

        let applicable = filter_coupons(&order()?, &[coupon], &scopes)?;

        assert_eq!(applicable.first().map(ApplicableCoupon::items), Some(&[1][..]));
        assert_eq!(applicable.first().map(ApplicableCoupon::amount), Some(30));

        Ok(())
    }

    #[test]
    fn specific_coupon_fails_scoped_check() -> TestResult {
        // Usable against the full 100, but only 30 is in scope.
        let coupon = Coupon::new(CouponId(1), DiscountRule::NoThreshold { amount: 40 }, true)?;
        let mut scopes = StaticScopes::new();
        scopes.insert(CouponId(1), [CategoryId(2)]);

        let applicable = filter_coupons(&order()?, &[coupon], &scopes)?;

        assert!(applicable.is_empty());

        Ok(())
    }

    #[test]
    fn specific_coupon_without_matching_category_is_dropped() -> TestResult {
        let coupon = Coupon::new(CouponId(1), DiscountRule::NoThreshold { amount: 10 }, true)?;
        let mut scopes = StaticScopes::new();
        scopes.insert(CouponId(1), [CategoryId(99)]);

        let applicable = filter_coupons(&order()?, &[coupon], &scopes)?;

        assert!(applicable.is_empty());

        Ok(())
    }

    #[test]
    fn scope_lookup_errors_propagate() -> TestResult {
        struct FailingScopes;

        impl ScopeResolver for FailingScopes {
            fn categories(
                &self,
                coupon: CouponId,
            ) -> Result<crate::scopes::CategorySet, ScopeError> {
                Err(ScopeError::Lookup {
                    coupon,
                    reason: "unavailable".to_string(),
                })
            }
        }

        let coupon = Coupon::new(CouponId(5), DiscountRule::NoThreshold { amount: 10 }, true)?;

        let result = filter_coupons(&order()?, &[coupon], &FailingScopes);

        assert!(matches!(
            result,
            Err(ScopeError::Lookup { coupon, .. }) if coupon == CouponId(5)
        ));

        Ok(())
    }
}
