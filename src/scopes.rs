//! Coupon Scopes
//!
//! Scope-restricted coupons only discount line items in particular categories. The
//! category membership lives outside the solver, so it is looked up through a
//! [`ScopeResolver`].

use rustc_hash::{FxHashMap, FxHashSet};
use thiserror::Error;

use crate::{coupons::CouponId, orders::CategoryId};

/// Set of categories a coupon applies to.
pub type CategorySet = FxHashSet<CategoryId>;

/// Errors raised by scope lookups.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ScopeError {
    /// The backing store could not answer the lookup.
    #[error("Scope lookup failed for coupon {coupon}: {reason}")]
    Lookup {
        /// Coupon being resolved
        coupon: CouponId,
        /// Why the lookup failed
        reason: String,
    },
}

/// Resolves the categories a scope-restricted coupon applies to.
pub trait ScopeResolver {
    /// Return the categories `coupon` may discount.
    ///
    /// An empty set means the coupon applies to nothing.
    ///
    /// # Errors
    ///
    /// Returns a [`ScopeError`] if the lookup itself fails.
    fn categories(&self, coupon: CouponId) -> Result<CategorySet, ScopeError>;
}

/// In-memory scope membership.
#[derive(Debug, Default, Clone)]
pub struct StaticScopes {
    scopes: FxHashMap<CouponId, CategorySet>,
}

impl StaticScopes {
    /// Create an empty scope table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add categories to a coupon's scope.
    pub fn insert(
        &mut self,
        coupon: CouponId,
        categories: impl IntoIterator<Item = CategoryId>,
    ) -> &mut Self {
        self.scopes.entry(coupon).or_default().extend(categories);

        self
    }
}

impl ScopeResolver for StaticScopes {
    fn categories(&self, coupon: CouponId) -> Result<CategorySet, ScopeError> {
        Ok(self.scopes.get(&coupon).cloned().unwrap_or_default())
    }
}

impl<I> FromIterator<(CouponId, I)> for StaticScopes
where
    I: IntoIterator<Item = CategoryId>,
{
    fn from_iter<T: IntoIterator<Item = (CouponId, I)>>(iter: T) -> Self {
        let mut scopes = Self::new();

        for (coupon, categories) in iter {
            scopes.insert(coupon, categories);
        }

        scopes
    }
}
