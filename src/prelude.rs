//! Coupon Stack prelude.
//!
//! Convenience exports for common library consumers.

pub use crate::{
    coupons::{Coupon, CouponError, CouponId},
    discounts::{DiscountError, DiscountRule},
    filter::{ApplicableCoupon, filter_coupons},
    orders::{CategoryId, LineItemId, Order, OrderError, OrderLineItem},
    scheduler::{EvaluationScheduler, Evaluations},
    scopes::{CategorySet, ScopeError, ScopeResolver, StaticScopes},
    service::DiscountService,
    solutions::{
        CandidateSolution, DiscountDetail, DiscountSolution, evaluate, generate_candidates,
        generate_candidates_within, select_best,
    },
    solvers::{DiscountSolver, SolverConfig, SolverError},
    wallets::{CouponPool, PoolError, StaticWallets, UserId},
};
