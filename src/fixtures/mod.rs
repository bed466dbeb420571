//! Fixtures
//!
//! A fixture set is an order in `orders/<name>.yml` and a coupon pool in
//! `coupons/<name>.yml`, both under a base directory.

use std::{fs, path::PathBuf};

use rusty_money::iso::Currency;
use thiserror::Error;

use crate::{
    coupons::{Coupon, CouponError, CouponId},
    fixtures::{coupons::CouponsFixture, orders::OrderFixture},
    orders::{Order, OrderError},
    scopes::StaticScopes,
    wallets::StaticWallets,
};

pub mod coupons;
pub mod orders;

/// Fixture Parsing Errors
#[derive(Debug, Error)]
pub enum FixtureError {
    /// IO error reading fixture files
    #[error("Failed to read fixture file: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error
    #[error("Failed to parse YAML: {0}")]
    Yaml(#[from] serde_norway::Error),

    /// Invalid price format
    #[error("Invalid price format: {0}")]
    InvalidPrice(String),

    /// Invalid percentage format
    #[error("Invalid percentage format: {0}")]
    InvalidPercentage(String),

    /// Unknown currency code
    #[error("Unknown currency code: {0}")]
    UnknownCurrency(String),

    /// Currency mismatch between prices
    #[error("Currency mismatch: expected {0}, found {1}")]
    CurrencyMismatch(String, String),

    /// Coupon referenced by a wallet or scope is not defined
    #[error("Coupon not found: {0}")]
    CouponNotFound(CouponId),

    /// No order loaded yet
    #[error("No order loaded yet; currency unknown")]
    NoOrder,

    /// Order fixture has no line items
    #[error("No items in order fixture")]
    NoItems,

    /// Order validation error
    #[error(transparent)]
    Order(#[from] OrderError),

    /// Coupon validation error
    #[error(transparent)]
    Coupon(#[from] CouponError),
}

/// Fixture
#[derive(Debug)]
pub struct Fixture {
    /// Base path for fixture files
    base_path: PathBuf,

    order: Option<Order>,
    coupons: Vec<Coupon>,
    scopes: StaticScopes,
    wallets: StaticWallets,
}

impl Default for Fixture {
    fn default() -> Self {
        Self::new()
    }
}

impl Fixture {
    /// Create a new empty fixture with default base path
    pub fn new() -> Self {
        Self::with_base_path("./fixtures")
    }

    /// Create a new empty fixture with custom base path
    pub fn with_base_path(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
            order: None,
            coupons: Vec::new(),
            scopes: StaticScopes::new(),
            wallets: StaticWallets::new(),
        }
    }

    /// Load the order from a YAML fixture file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or the order is invalid.
    pub fn load_order(&mut self, name: &str) -> Result<&mut Self, FixtureError> {
        let file_path = self.base_path.join("orders").join(format!("{name}.yml"));
        let contents = fs::read_to_string(&file_path)?;
        let fixture: OrderFixture = serde_norway::from_str(&contents)?;

        self.order = Some(Order::try_from(fixture)?);

        Ok(self)
    }

    /// Load coupons, scopes and wallets from a YAML fixture file
    ///
    /// Coupon amounts must be in the currency of the order, so the order is loaded
    /// first.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, a coupon is invalid,
    /// or a scope or wallet refers to an unknown coupon.
    pub fn load_coupons(&mut self, name: &str) -> Result<&mut Self, FixtureError> {
        let currency = self.currency()?;
        let file_path = self.base_path.join("coupons").join(format!("{name}.yml"));
        let contents = fs::read_to_string(&file_path)?;
        let fixture: CouponsFixture = serde_norway::from_str(&contents)?;

        for coupon in fixture.coupons {
            self.coupons.push(coupon.try_into_coupon(currency)?);
        }

        for (coupon, categories) in fixture.scopes {
            self.find_coupon(coupon)?;
            self.scopes.insert(coupon, categories);
        }

        for (user, coupon_ids) in fixture.wallets {
            for id in coupon_ids {
                let coupon = self.find_coupon(id)?.clone();
                self.wallets.issue(user, coupon);
            }
        }

        Ok(self)
    }

    /// Load a complete fixture set (order and coupons with the same name)
    ///
    /// # Errors
    ///
    /// Returns an error if any of the fixture files cannot be loaded.
    pub fn from_set(name: &str) -> Result<Self, FixtureError> {
        let mut fixture = Self::new();

        fixture.load_order(name)?.load_coupons(name)?;

        Ok(fixture)
    }

    /// The loaded order
    ///
    /// # Errors
    ///
    /// Returns an error if no order has been loaded.
    pub fn order(&self) -> Result<&Order, FixtureError> {
        self.order.as_ref().ok_or(FixtureError::NoOrder)
    }

    /// Currency of the loaded order
    ///
    /// # Errors
    ///
    /// Returns an error if no order has been loaded.
    pub fn currency(&self) -> Result<&'static Currency, FixtureError> {
        self.order().map(Order::currency)
    }

    /// Every loaded coupon, in file order
    pub fn coupons(&self) -> &[Coupon] {
        &self.coupons
    }

    /// Scope membership for specific coupons
    pub fn scopes(&self) -> &StaticScopes {
        &self.scopes
    }

    /// Coupons issued to each user
    pub fn wallets(&self) -> &StaticWallets {
        &self.wallets
    }

    fn find_coupon(&self, id: CouponId) -> Result<&Coupon, FixtureError> {
        self.coupons
            .iter()
            .find(|coupon| coupon.id() == id)
            .ok_or(FixtureError::CouponNotFound(id))
    }
}
