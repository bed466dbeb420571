//! Solver Config

use std::time::Duration;

use clap::Args;

use crate::solvers::SolverConfig;

/// Solver settings.
#[derive(Debug, Args)]
pub struct SolverArgs {
    /// Worker threads for evaluation (0 uses available parallelism)
    #[arg(long, env = "COUPON_STACK_WORKERS", default_value_t = 0)]
    pub workers: usize,

    /// How long to wait for evaluations before using partial results
    #[arg(long, env = "COUPON_STACK_DEADLINE_MS", default_value_t = 1_000_u64)]
    pub deadline_ms: u64,

    /// Most coupons combined with each other; every usable coupon is still
    /// offered alone, and values below 2 disable combinations
    #[arg(long, env = "COUPON_STACK_MAX_COUPONS", default_value_t = 6)]
    pub max_coupons: usize,
}

impl From<&SolverArgs> for SolverConfig {
    fn from(args: &SolverArgs) -> Self {
        Self {
            workers: args.workers,
            deadline: Duration::from_millis(args.deadline_ms),
            max_coupons: args.max_coupons,
        }
    }
}
