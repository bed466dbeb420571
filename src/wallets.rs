//! Coupon Wallets
//!
//! Where a user's currently usable coupons come from.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::coupons::Coupon;

/// User identifier.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub u64);

/// Errors raised by coupon pool lookups.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PoolError {
    /// The backing store could not answer the lookup.
    #[error("Coupon lookup failed for user {user:?}: {reason}")]
    Lookup {
        /// User being looked up
        user: UserId,
        /// Why the lookup failed
        reason: String,
    },
}

/// Supplies the coupons a user can spend right now.
///
/// Implementations are expected to have already removed coupons outside their
/// issue or usage window.
pub trait CouponPool {
    /// Return the user's usable coupons.
    ///
    /// # Errors
    ///
    /// Returns a [`PoolError`] if the lookup itself fails.
    fn coupons_for(&self, user: UserId) -> Result<Vec<Coupon>, PoolError>;
}

/// In-memory wallets keyed by user.
#[derive(Debug, Default, Clone)]
pub struct StaticWallets {
    wallets: FxHashMap<UserId, Vec<Coupon>>,
}

impl StaticWallets {
    /// Create an empty set of wallets.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a coupon to a user's wallet.
    pub fn issue(&mut self, user: UserId, coupon: Coupon) -> &mut Self {
        self.wallets.entry(user).or_default().push(coupon);

        self
    }
}

impl CouponPool for StaticWallets {
    fn coupons_for(&self, user: UserId) -> Result<Vec<Coupon>, PoolError> {
        Ok(self.wallets.get(&user).cloned().unwrap_or_default())
    }
}
