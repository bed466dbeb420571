//! Orders

use rusty_money::{Money, iso::Currency};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use thiserror::Error;

/// Line item identifier, as issued by the order service.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LineItemId(pub u64);

/// Category identifier used to scope coupons.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CategoryId(pub u64);

/// Errors related to order construction.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum OrderError {
    /// A line item has a negative price (index, item id, price in minor units).
    #[error("Item {0} ({1:?}) has negative price {2}")]
    NegativePrice(usize, LineItemId, i64),

    /// Two line items share the same identifier.
    #[error("Duplicate line item id {0:?}")]
    DuplicateItem(LineItemId),

    /// The order total cannot be represented in minor units.
    #[error("Order total overflows minor units")]
    TotalOverflow,
}

/// A priced line item in an order.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct OrderLineItem {
    id: LineItemId,
    price: i64,
    category: CategoryId,
}

impl OrderLineItem {
    /// Create a new line item with a price in minor units.
    pub fn new(id: LineItemId, price: i64, category: CategoryId) -> Self {
        Self {
            id,
            price,
            category,
        }
    }

    /// Returns the line item id
    pub fn id(&self) -> LineItemId {
        self.id
    }

    /// Returns the price in minor units
    pub fn price(&self) -> i64 {
        self.price
    }

    /// Returns the category of the line item
    pub fn category(&self) -> CategoryId {
        self.category
    }
}

/// Order
#[derive(Debug, Clone)]
pub struct Order {
    items: SmallVec<[OrderLineItem; 10]>,
    subtotal: i64,
    currency: &'static Currency,
}

impl Order {
    /// Create an order from validated line items.
    ///
    /// # Errors
    ///
    /// Returns an `OrderError` if a price is negative, an item id is repeated, or
    /// the total does not fit in minor units.
    pub fn with_items(
        items: impl IntoIterator<Item = OrderLineItem>,
        currency: &'static Currency,
    ) -> Result<Self, OrderError> {
        let items: SmallVec<[OrderLineItem; 10]> = items.into_iter().collect();

        let mut subtotal = 0i64;

        for (i, item) in items.iter().enumerate() {
            if item.price < 0 {
                return Err(OrderError::NegativePrice(i, item.id, item.price));
            }

            if items.iter().take(i).any(|other| other.id == item.id) {
                return Err(OrderError::DuplicateItem(item.id));
            }

            subtotal = subtotal
                .checked_add(item.price)
                .ok_or(OrderError::TotalOverflow)?;
        }

        Ok(Self {
            items,
            subtotal,
            currency,
        })
    }

    /// Iterate over the line items in order.
    pub fn iter(&self) -> impl Iterator<Item = &OrderLineItem> {
        self.items.iter()
    }

    /// Get a line item by its position in the order.
    pub fn get(&self, index: usize) -> Option<&OrderLineItem> {
        self.items.get(index)
    }

    /// Sum of all line item prices in minor units.
    pub fn subtotal(&self) -> i64 {
        self.subtotal
    }

    /// Subtotal as money in the order currency.
    pub fn subtotal_money(&self) -> Money<'static, Currency> {
        Money::from_minor(self.subtotal, self.currency)
    }

    /// Get the currency of the order.
    pub fn currency(&self) -> &'static Currency {
        self.currency
    }

    /// Get the number of line items in the order.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Check if the order is empty.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use rusty_money::iso::GBP;
    use testresult::TestResult;

    use super::*;

    fn item(id: u64, price: i64, category: u64) -> OrderLineItem {
        OrderLineItem::new(LineItemId(id), price, CategoryId(category))
    }

    #[test]
    fn with_items_calculates_subtotal() -> TestResult {
        let order = Order::with_items([item(1, 70, 1), item(2, 30, 2)], GBP)?;

        assert_eq!(order.subtotal(), 100);
        assert_eq!(order.subtotal_money(), Money::from_minor(100, GBP));
        assert_eq!(order.len(), 2);
        assert_eq!(order.currency(), GBP);

        Ok(())
    }

    #[test]
    fn with_items_rejects_negative_price() {
        let result = Order::with_items([item(1, 70, 1), item(2, -1, 1)], GBP);

        assert_eq!(
            result.err(),
            Some(OrderError::NegativePrice(1, LineItemId(2), -1))
        );
    }

    #[test]
    fn with_items_rejects_duplicate_ids() {
        let result = Order::with_items([item(1, 70, 1), item(1, 30, 1)], GBP);

        assert_eq!(result.err(), Some(OrderError::DuplicateItem(LineItemId(1))));
    }

    #[test]
    fn with_items_rejects_overflowing_total() {
        let result = Order::with_items([item(1, i64::MAX, 1), item(2, 1, 1)], GBP);

        assert_eq!(result.err(), Some(OrderError::TotalOverflow));
    }

    #[test]
    fn empty_order_has_zero_subtotal() -> TestResult {
        let order = Order::with_items([], GBP)?;

        assert!(order.is_empty());
        assert_eq!(order.subtotal(), 0);

        Ok(())
    }

    #[test]
    fn get_returns_item_by_position() -> TestResult {
        let order = Order::with_items([item(5, 10, 3)], GBP)?;

        assert_eq!(order.get(0).map(OrderLineItem::id), Some(LineItemId(5)));
        assert!(order.get(1).is_none());

        Ok(())
    }
}
