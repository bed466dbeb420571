//! Discount Solver
//!
//! Entry point for finding the best coupon combinations for an order.

use std::{cmp::Reverse, sync::Arc, time::Duration};

use rayon::{ThreadPool, ThreadPoolBuildError, ThreadPoolBuilder};
use thiserror::Error;
use tracing::{debug, info, info_span, warn};

use crate::{
    coupons::Coupon,
    discounts::DiscountError,
    filter::{ApplicableCoupon, filter_coupons},
    orders::Order,
    scheduler::EvaluationScheduler,
    scopes::{ScopeError, ScopeResolver},
    solutions::{DiscountSolution, generate_candidates_within, select_best},
    wallets::PoolError,
};

/// Default fan-in deadline.
pub const DEFAULT_DEADLINE: Duration = Duration::from_secs(1);

/// Default limit on coupons combined in the permutation search.
pub const DEFAULT_MAX_COUPONS: usize = 6;

/// Solver Errors
#[derive(Debug, Error)]
pub enum SolverError {
    /// Wrapped scope lookup error
    #[error(transparent)]
    Scope(#[from] ScopeError),

    /// Wrapped coupon pool lookup error
    #[error(transparent)]
    Pool(#[from] PoolError),

    /// Wrapped discount calculation error.
    #[error(transparent)]
    Discount(#[from] DiscountError),

    /// The worker pool could not be started.
    #[error(transparent)]
    ThreadPool(#[from] ThreadPoolBuildError),
}

/// Solver tuning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SolverConfig {
    /// Worker threads; zero lets rayon pick from available parallelism.
    pub workers: usize,

    /// How long to wait for evaluations before using partial results.
    pub deadline: Duration,

    /// Most coupons combined in the permutation search after filtering.
    ///
    /// Every usable coupon is still offered on its own. Values below 2 leave
    /// single-coupon solutions only.
    pub max_coupons: usize,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            workers: 0,
            deadline: DEFAULT_DEADLINE,
            max_coupons: DEFAULT_MAX_COUPONS,
        }
    }
}

/// Finds the best coupon combinations for an order.
#[derive(Debug, Clone)]
pub struct DiscountSolver {
    scheduler: EvaluationScheduler,
    max_coupons: usize,
}

impl DiscountSolver {
    /// Create a solver that evaluates on an existing pool.
    ///
    /// `config.workers` is ignored; the pool's own size applies.
    pub fn new(pool: Arc<ThreadPool>, config: &SolverConfig) -> Self {
        Self {
            scheduler: EvaluationScheduler::new(pool, config.deadline),
            max_coupons: config.max_coupons,
        }
    }

    /// Create a solver with its own worker pool.
    ///
    /// # Errors
    ///
    /// Returns a [`SolverError`] if the worker pool cannot be built.
    pub fn with_config(config: &SolverConfig) -> Result<Self, SolverError> {
        let pool = ThreadPoolBuilder::new()
            .num_threads(config.workers)
            .thread_name(|idx| format!("coupon-stack-{idx}"))
            .build()?;

        Ok(Self::new(Arc::new(pool), config))
    }

    /// Find the best coupon combinations for `order`, best first.
    ///
    /// An empty result is a normal outcome: no coupons, none usable, or none
    /// evaluated before the deadline.
    ///
    /// # Errors
    ///
    /// Returns a [`SolverError`] if a scope lookup fails or a standalone discount
    /// cannot be computed while limiting the permutation search.
    pub fn solve<R: ScopeResolver + ?Sized>(
        &self,
        order: &Order,
        coupons: &[Coupon],
        scopes: &R,
    ) -> Result<Vec<DiscountSolution>, SolverError> {
        let span = info_span!("solve", items = order.len(), coupons = coupons.len());
        let _guard = span.enter();

        if order.is_empty() || coupons.is_empty() {
            debug!("nothing to solve");

            return Ok(Vec::new());
        }

        let applicable = filter_coupons(order, coupons, scopes)?;

        debug!(applicable = applicable.len(), "coupons filtered");

        if applicable.is_empty() {
            return Ok(Vec::new());
        }

        let combinable = self.combinable(&applicable)?;
        let candidates = generate_candidates_within(applicable.len(), &combinable);

        debug!(candidates = candidates.len(), "candidates generated");

        let order = Arc::new(order.clone());
        let applicable: Arc<[ApplicableCoupon]> = applicable.into();
        let evaluations = self.scheduler.run(&order, &applicable, candidates);
        let selected = select_best(evaluations.solutions);

        info!(
            event = "solve_end",
            evaluated = evaluations.dispatched,
            failed = evaluations.failed,
            timed_out = evaluations.timed_out,
            solutions = selected.len()
        );

        Ok(selected)
    }

    /// Indexes of the coupons to combine: all of them, or the `max_coupons` with
    /// the largest standalone discount, in pool order.
    fn combinable(&self, applicable: &[ApplicableCoupon]) -> Result<Vec<usize>, SolverError> {
        if applicable.len() <= self.max_coupons {
            return Ok((0..applicable.len()).collect());
        }

        let mut ranked = applicable
            .iter()
            .enumerate()
            .map(|(position, coupon)| {
                let discount = coupon.coupon().rule().calculate_discount(coupon.amount())?;

                Ok((Reverse(discount), coupon.coupon().id(), position))
            })
            .collect::<Result<Vec<_>, DiscountError>>()?;

        ranked.sort_unstable();

        warn!(
            applicable = ranked.len(),
            max_coupons = self.max_coupons,
            "too many usable coupons, combining those with the largest standalone discount"
        );

        let mut kept: Vec<usize> = ranked
            .into_iter()
            .take(self.max_coupons)
            .map(|(_, _, position)| position)
            .collect();

        kept.sort_unstable();

        Ok(kept)
    }
}
