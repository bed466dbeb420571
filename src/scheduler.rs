//! Concurrent Evaluation Scheduler
//!
//! Fans candidate solutions out onto a rayon pool and collects whatever has finished
//! by the deadline. Each task sends exactly one outcome over a channel; the caller
//! drains the channel until every outcome has arrived or time runs out. Tasks that
//! are still running at the deadline are abandoned; their late sends are dropped.

use std::{
    panic::{self, AssertUnwindSafe},
    sync::Arc,
    time::{Duration, Instant},
};

use crossbeam::channel::{self, RecvTimeoutError};
use rayon::ThreadPool;
use thiserror::Error;
use tracing::{debug, trace, warn};

use crate::{
    filter::ApplicableCoupon,
    orders::Order,
    solutions::{CandidateSolution, DiscountSolution, evaluation::EvaluationError, evaluate},
};

/// Why an evaluation task produced no solution.
#[derive(Debug, Error)]
pub enum TaskFailure {
    /// The evaluation returned an error.
    #[error(transparent)]
    Evaluation(#[from] EvaluationError),

    /// The evaluation panicked.
    #[error("evaluation task panicked")]
    Panicked,
}

/// Snapshot of the evaluations collected before fan-in finished.
#[derive(Debug, Default)]
pub struct Evaluations {
    /// Completed solutions, in arrival order.
    pub solutions: Vec<DiscountSolution>,

    /// Number of tasks dispatched.
    pub dispatched: usize,

    /// Number of tasks that failed.
    pub failed: usize,

    /// Whether the deadline passed before every task reported back.
    pub timed_out: bool,
}

impl Evaluations {
    /// Number of tasks that reported back, successfully or not.
    pub fn completed(&self) -> usize {
        self.solutions.len() + self.failed
    }
}

/// Dispatches evaluations onto a bounded worker pool with a fan-in deadline.
#[derive(Debug, Clone)]
pub struct EvaluationScheduler {
    pool: Arc<ThreadPool>,
    deadline: Duration,
}

impl EvaluationScheduler {
    /// Create a scheduler on `pool` that waits at most `deadline` for results.
    pub fn new(pool: Arc<ThreadPool>, deadline: Duration) -> Self {
        Self { pool, deadline }
    }

    /// The fan-in deadline.
    pub fn deadline(&self) -> Duration {
        self.deadline
    }

    /// Evaluate every candidate, returning what completed within the deadline.
    ///
    /// Failed or panicking tasks are counted and logged but never abort their
    /// siblings. An expired deadline is not an error.
    pub fn run(
        &self,
        order: &Arc<Order>,
        coupons: &Arc<[ApplicableCoupon]>,
        candidates: Vec<CandidateSolution>,
    ) -> Evaluations {
        let (sender, receiver) = channel::unbounded();
        let dispatched = candidates.len();

        for candidate in candidates {
            let sender = sender.clone();
            let order = Arc::clone(order);
            let coupons = Arc::clone(coupons);

            self.pool.spawn(move || {
                let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
                    evaluate(&order, &coupons, &candidate)
                }))
                .map_or(Err(TaskFailure::Panicked), |result| {
                    result.map_err(TaskFailure::from)
                });

                if sender.send(outcome).is_err() {
                    trace!("evaluation finished after fan-in closed");
                }
            });
        }

        drop(sender);

        let mut evaluations = Evaluations {
            solutions: Vec::with_capacity(dispatched),
            dispatched,
            ..Evaluations::default()
        };

        let deadline = Instant::now().checked_add(self.deadline);

        while evaluations.completed() < dispatched {
            let received = match deadline {
                Some(deadline) => receiver.recv_deadline(deadline),
                None => receiver.recv().map_err(|_disconnected| RecvTimeoutError::Disconnected),
            };

            match received {
                Ok(Ok(solution)) => evaluations.solutions.push(solution),
                Ok(Err(failure)) => {
                    warn!(error = %failure, "discount evaluation failed");
                    evaluations.failed += 1;
                }
                Err(RecvTimeoutError::Timeout) => {
                    evaluations.timed_out = true;
                    warn!(
                        dispatched,
                        completed = evaluations.completed(),
                        deadline_ms = self.deadline.as_millis(),
                        "discount evaluation deadline expired, using partial results"
                    );
                    break;
                }
                Err(RecvTimeoutError::Disconnected) => break,
            }
        }

        debug!(
            dispatched,
            completed = evaluations.completed(),
            failed = evaluations.failed,
            "discount evaluations collected"
        );

        evaluations
    }
}
