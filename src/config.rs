//! CLI configuration module

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use crate::{
    config::{observability::LoggingConfig, solver::SolverArgs},
    wallets::UserId,
};

pub mod observability;
pub mod solver;

/// How solutions are written to stdout.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Ranked table with a per item breakdown.
    Table,

    /// YAML document of every solution.
    Yaml,
}

/// Coupon Stack configuration
#[derive(Debug, Parser)]
#[command(
    name = "coupon-stack",
    about = "Find the best stackable coupon combinations for an order",
    long_about = None
)]
pub struct CliConfig {
    /// Fixture set to load the order and coupons from
    #[arg(short, long, env = "COUPON_STACK_FIXTURE", default_value = "scenario_a")]
    pub fixture: String,

    /// Directory holding the `orders/` and `coupons/` fixture files
    #[arg(long, env = "COUPON_STACK_FIXTURES_DIR", default_value = "./fixtures")]
    pub fixtures_dir: PathBuf,

    /// Only use coupons in this user's wallet instead of the whole pool
    #[arg(short, long, env = "COUPON_STACK_USER")]
    pub user: Option<u64>,

    /// Output format (table, yaml)
    #[arg(short, long, env = "COUPON_STACK_OUTPUT", value_enum, default_value_t = OutputFormat::Table)]
    pub output: OutputFormat,

    /// Solver tuning.
    #[command(flatten)]
    pub solver: SolverArgs,

    /// Logging output settings.
    #[command(flatten)]
    pub logging: LoggingConfig,
}

impl CliConfig {
    /// Load configuration from environment and CLI arguments
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be parsed
    pub fn load() -> Result<Self, clap::Error> {
        Self::try_parse()
    }

    /// The user whose wallet should be used, if any.
    pub fn user_id(&self) -> Option<UserId> {
        self.user.map(UserId)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use testresult::TestResult;

    use crate::solvers::SolverConfig;

    use super::*;

    #[test]
    fn parses_fixture_user_and_output() -> TestResult {
        let config = CliConfig::try_parse_from([
            "coupon-stack",
            "-f",
            "mixed",
            "--user",
            "7",
            "--output",
            "yaml",
        ])?;

        assert_eq!(config.fixture, "mixed");
        assert_eq!(config.user_id(), Some(UserId(7)));
        assert_eq!(config.output, OutputFormat::Yaml);

        Ok(())
    }

    #[test]
    fn solver_args_convert_to_config() -> TestResult {
        let config = CliConfig::try_parse_from([
            "coupon-stack",
            "--workers",
            "3",
            "--deadline-ms",
            "250",
            "--max-coupons",
            "4",
        ])?;

        assert_eq!(
            SolverConfig::from(&config.solver),
            SolverConfig {
                workers: 3,
                deadline: Duration::from_millis(250),
                max_coupons: 4,
            }
        );

        Ok(())
    }

    #[test]
    fn rejects_unknown_output_format() {
        let result = CliConfig::try_parse_from(["coupon-stack", "--output", "xml"]);

        assert!(result.is_err());
    }
}
