//! Discount Service
//!
//! Looks up a user's coupons and finds the best way to spend them on an order.

use tracing::debug;

use crate::{
    orders::Order,
    scopes::ScopeResolver,
    solutions::DiscountSolution,
    solvers::{DiscountSolver, SolverError},
    wallets::{CouponPool, UserId},
};

/// Ties a coupon pool and scope lookups to a solver.
#[derive(Debug, Clone)]
pub struct DiscountService<P, S> {
    pool: P,
    scopes: S,
    solver: DiscountSolver,
}

impl<P: CouponPool, S: ScopeResolver> DiscountService<P, S> {
    /// Create a service from its collaborators.
    pub fn new(pool: P, scopes: S, solver: DiscountSolver) -> Self {
        Self {
            pool,
            scopes,
            solver,
        }
    }

    /// Find the best coupon combinations `user` can apply to `order`, best first.
    ///
    /// # Errors
    ///
    /// Returns a [`SolverError`] if the coupon or scope lookups fail.
    pub fn find_discount_solutions(
        &self,
        user: UserId,
        order: &Order,
    ) -> Result<Vec<DiscountSolution>, SolverError> {
        let coupons = self.pool.coupons_for(user)?;

        debug!(user = user.0, coupons = coupons.len(), "coupons loaded for user");

        self.solver.solve(order, &coupons, &self.scopes)
    }

    /// The solver in use.
    pub fn solver(&self) -> &DiscountSolver {
        &self.solver
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use rusty_money::iso::GBP;
    use testresult::TestResult;

    use crate::{
        coupons::{Coupon, CouponId},
        discounts::DiscountRule,
        orders::{CategoryId, LineItemId, OrderLineItem},
        scopes::StaticScopes,
        solvers::SolverConfig,
        wallets::{PoolError, StaticWallets},
    };

    use super::*;

    fn solver() -> Result<DiscountSolver, SolverError> {
        DiscountSolver::with_config(&SolverConfig {
            workers: 1,
            deadline: Duration::from_secs(5),
            ..SolverConfig::default()
        })
    }

    fn order() -> Result<Order, crate::orders::OrderError> {
        Order::with_items(
            [
                OrderLineItem::new(LineItemId(1), 70, CategoryId(1)),
                OrderLineItem::new(LineItemId(2), 30, CategoryId(1)),
            ],
            GBP,
        )
    }

    #[test]
    fn only_the_users_coupons_are_considered() -> TestResult {
        let mut wallets = StaticWallets::new();

        wallets
            .issue(
                UserId(1),
                Coupon::new(CouponId(10), DiscountRule::NoThreshold { amount: 20 }, false)?,
            )
            .issue(
                UserId(2),
                Coupon::new(CouponId(20), DiscountRule::NoThreshold { amount: 10 }, false)?,
            );

        let service = DiscountService::new(wallets, StaticScopes::new(), solver()?);
        let solutions = service.find_discount_solutions(UserId(1), &order()?)?;

        assert_eq!(solutions.len(), 1);
        assert_eq!(
            solutions.first().map(DiscountSolution::coupon_ids),
            Some([CouponId(10)].as_slice())
        );

        Ok(())
    }

    #[test]
    fn user_without_coupons_gets_nothing() -> TestResult {
        let service = DiscountService::new(StaticWallets::new(), StaticScopes::new(), solver()?);

        assert!(service.find_discount_solutions(UserId(3), &order()?)?.is_empty());

        Ok(())
    }

    #[test]
    fn pool_failure_is_an_error() -> TestResult {
        struct Offline;

        impl CouponPool for Offline {
            fn coupons_for(&self, user: UserId) -> Result<Vec<Coupon>, PoolError> {
                Err(PoolError::Lookup {
                    user,
                    reason: "offline".to_string(),
                })
            }
        }

        let service = DiscountService::new(Offline, StaticScopes::new(), solver()?);
        let result = service.find_discount_solutions(UserId(1), &order()?);

        assert!(matches!(result, Err(SolverError::Pool(_))));

        Ok(())
    }
}
