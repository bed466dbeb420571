//! Order Fixtures

use rust_decimal::{Decimal, prelude::ToPrimitive};
use rusty_money::iso::{Currency, EUR, GBP, USD};
use serde::Deserialize;

use crate::{
    fixtures::FixtureError,
    orders::{CategoryId, LineItemId, Order, OrderLineItem},
};

/// Order in YAML
#[derive(Debug, Deserialize)]
pub struct OrderFixture {
    /// Line items in order position
    pub items: Vec<LineItemFixture>,
}

/// Line item in YAML
#[derive(Debug, Deserialize)]
pub struct LineItemFixture {
    /// Line item id
    pub id: LineItemId,

    /// Price (e.g., "0.70 GBP")
    pub price: String,

    /// Category id
    pub category: CategoryId,
}

impl TryFrom<OrderFixture> for Order {
    type Error = FixtureError;

    fn try_from(fixture: OrderFixture) -> Result<Self, Self::Error> {
        let mut currency = None;
        let mut items = Vec::with_capacity(fixture.items.len());

        for item in fixture.items {
            let (minor_units, item_currency) = parse_price(&item.price)?;

            match currency {
                Some(existing) => ensure_currency(existing, item_currency)?,
                None => currency = Some(item_currency),
            }

            items.push(OrderLineItem::new(item.id, minor_units, item.category));
        }

        let currency = currency.ok_or(FixtureError::NoItems)?;

        Ok(Order::with_items(items, currency)?)
    }
}

/// Fail unless both currencies are the same.
pub(crate) fn ensure_currency(
    expected: &'static Currency,
    found: &'static Currency,
) -> Result<(), FixtureError> {
    if expected == found {
        Ok(())
    } else {
        Err(FixtureError::CurrencyMismatch(
            expected.iso_alpha_code.to_string(),
            found.iso_alpha_code.to_string(),
        ))
    }
}

/// Parse price string (e.g., "2.99 GBP") into minor units and currency
///
/// # Errors
///
/// Returns an error if the string is not in the format "AMOUNT CURRENCY", if the
/// amount is not a decimal number, or if the currency code is not recognized.
pub fn parse_price(s: &str) -> Result<(i64, &'static Currency), FixtureError> {
    let mut parts = s.split_whitespace();

    let (Some(amount), Some(code), None) = (parts.next(), parts.next(), parts.next()) else {
        return Err(FixtureError::InvalidPrice(format!(
            "Expected format 'AMOUNT CURRENCY', got: {s}"
        )));
    };

    let minor_units = amount
        .parse::<Decimal>()
        .ok()
        .and_then(|value| value.checked_mul(Decimal::ONE_HUNDRED))
        .and_then(|value| value.round_dp(0).to_i64())
        .ok_or_else(|| FixtureError::InvalidPrice(s.to_string()))?;

    let currency = match code {
        "GBP" => GBP,
        "USD" => USD,
        "EUR" => EUR,
        other => return Err(FixtureError::UnknownCurrency(other.to_string())),
    };

    Ok((minor_units, currency))
}
