//! Report
//!
//! Renders ranked discount solutions as terminal tables.

use std::io;

use rusty_money::Money;
use tabled::{
    builder::Builder,
    settings::{
        Alignment, Color, Style,
        object::{Columns, Rows},
    },
};
use thiserror::Error;

use crate::{orders::Order, solutions::DiscountSolution};

/// Errors that can occur when writing a report.
#[derive(Debug, Error)]
pub enum ReportError {
    /// A solution's discount exceeds the order subtotal.
    #[error("Solution saves {discount} on a subtotal of {subtotal}")]
    DiscountExceedsSubtotal {
        /// Solution discount in minor units
        discount: i64,
        /// Order subtotal in minor units
        subtotal: i64,
    },

    /// IO error
    #[error("IO error")]
    IO,
}

/// Write the ranked solutions, then a per item breakdown of the best one.
///
/// # Errors
///
/// Returns a [`ReportError`] if writing fails or a solution is inconsistent with
/// the order.
pub fn write_to(
    mut out: impl io::Write,
    order: &Order,
    solutions: &[DiscountSolution],
) -> Result<(), ReportError> {
    let Some(best) = solutions.first() else {
        return writeln!(out, "\nNo coupons can be applied to this order.\n")
            .map_err(|_err| ReportError::IO);
    };

    write_solutions_table(&mut out, order, solutions)?;
    write_breakdown_table(&mut out, order, best)?;

    writeln!(out, " Subtotal: {}\n", order.subtotal_money()).map_err(|_err| ReportError::IO)
}

fn write_solutions_table(
    out: &mut impl io::Write,
    order: &Order,
    solutions: &[DiscountSolution],
) -> Result<(), ReportError> {
    let currency = order.currency();
    let mut builder = Builder::default();

    builder.push_record(["#", "Coupons", "Rules", "Savings", "Total"]);

    for (rank, solution) in solutions.iter().enumerate() {
        let payable = payable(order.subtotal(), solution.discount_amount())?;

        let coupons = solution
            .coupon_ids()
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(" → ");

        builder.push_record([
            (rank + 1).to_string(),
            coupons,
            solution.rules().join("\n"),
            Money::from_minor(solution.discount_amount(), currency).to_string(),
            Money::from_minor(payable, currency).to_string(),
        ]);
    }

    let mut table = builder.build();

    table.with(Style::modern_rounded());
    table.modify(Rows::first(), Color::BOLD);
    table.modify(Columns::new(3..5), Alignment::right());

    writeln!(out, "\n{table}").map_err(|_err| ReportError::IO)
}

fn write_breakdown_table(
    out: &mut impl io::Write,
    order: &Order,
    best: &DiscountSolution,
) -> Result<(), ReportError> {
    let currency = order.currency();
    let mut builder = Builder::default();

    builder.push_record(["Item", "Category", "Price", "Discount", "Payable"]);

    for (idx, item) in order.iter().enumerate() {
        let discount = best.detail().at(idx).unwrap_or(0);

        builder.push_record([
            item.id().0.to_string(),
            item.category().0.to_string(),
            Money::from_minor(item.price(), currency).to_string(),
            Money::from_minor(discount, currency).to_string(),
            Money::from_minor(item.price().saturating_sub(discount), currency).to_string(),
        ]);
    }

    let mut table = builder.build();

    table.with(Style::modern_rounded());
    table.modify(Rows::first(), Color::BOLD);
    table.modify(Columns::new(2..5), Alignment::right());

    writeln!(out, "{table}").map_err(|_err| ReportError::IO)
}

fn payable(subtotal: i64, discount: i64) -> Result<i64, ReportError> {
    subtotal
        .checked_sub(discount)
        .filter(|payable| *payable >= 0)
        .ok_or(ReportError::DiscountExceedsSubtotal { discount, subtotal })
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
        solvers::{DiscountSolver, SolverConfig},
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
    fn write_to_renders_solutions_and_breakdown() -> TestResult {
        let order = order()?;
        let coupons = [
            Coupon::new(CouponId(1), DiscountRule::NoThreshold { amount: 20 }, false)?,
            Coupon::new(CouponId(2), DiscountRule::NoThreshold { amount: 10 }, false)?,
        ];
        let solver = DiscountSolver::with_config(&SolverConfig {
            workers: 1,
            deadline: Duration::from_secs(5),
            ..SolverConfig::default()
        })?;
        let solutions = solver.solve(&order, &coupons, &StaticScopes::new())?;

        let mut out = Vec::new();
        write_to(&mut out, &order, &solutions)?;

        let output = String::from_utf8(out)?;

        assert!(output.contains("Coupons"));
        assert!(output.contains("1 → 2"));
        assert!(output.contains("£0.20 off, no minimum spend"));
        assert!(output.contains("£0.30"));
        assert!(output.contains("£0.70"));
        assert!(output.contains("Subtotal: £1.00"));

        Ok(())
    }

    #[test]
    fn write_to_without_solutions() -> TestResult {
        let mut out = Vec::new();
        write_to(&mut out, &order()?, &[])?;

        let output = String::from_utf8(out)?;

        assert!(output.contains("No coupons can be applied"));

        Ok(())
    }

    #[test]
    fn payable_rejects_oversized_discount() {
        assert!(matches!(payable(100, 30), Ok(70)));
        assert!(matches!(
            payable(100, 130),
            Err(ReportError::DiscountExceedsSubtotal {
                discount: 130,
                subtotal: 100
            })
        ));
    }
}
