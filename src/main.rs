//! Coupon Stack CLI
//!
//! Loads a fixture set and prints the best coupon combinations for its order.
//!
//! Use `-f` to load a fixture set by name
//! Use `-u` to solve with one user's wallet instead of the whole coupon pool
//! Use `-o yaml` for machine-readable output

use std::{io, io::Write, time::Instant};

use anyhow::Result;
use humanize_duration::{Truncate, prelude::DurationExt};
use tracing::info;

use coupon_stack::{
    config::{CliConfig, OutputFormat},
    fixtures::Fixture,
    observability::init_subscriber,
    report,
    service::DiscountService,
    solvers::{DiscountSolver, SolverConfig},
};

fn main() -> Result<()> {
    let config = CliConfig::load()?;

    init_subscriber(&config.logging)?;

    let mut fixture = Fixture::with_base_path(&config.fixtures_dir);
    fixture.load_order(&config.fixture)?.load_coupons(&config.fixture)?;

    let order = fixture.order()?;
    let solver = DiscountSolver::with_config(&SolverConfig::from(&config.solver))?;

    info!(fixture = %config.fixture, user = ?config.user, "solving");

    let start = Instant::now();

    let solutions = match config.user_id() {
        Some(user) => DiscountService::new(
            fixture.wallets().clone(),
            fixture.scopes().clone(),
            solver,
        )
        .find_discount_solutions(user, order)?,
        None => solver.solve(order, fixture.coupons(), fixture.scopes())?,
    };

    let elapsed = start.elapsed();

    let stdout = io::stdout();
    let mut handle = stdout.lock();

    match config.output {
        OutputFormat::Table => {
            report::write_to(&mut handle, order, &solutions)?;

            writeln!(
                handle,
                " {} ({}s)",
                elapsed.human(Truncate::Nano),
                elapsed.as_secs_f32()
            )?;
        }
        OutputFormat::Yaml => serde_norway::to_writer(&mut handle, &solutions)?,
    }

    Ok(())
}
