//! Coupon Stack
//!
//! Coupon Stack finds the best ways to combine a user's coupons on an order, evaluating
//! every ordering of the usable coupons in parallel within a deadline.

pub mod config;
pub mod coupons;
pub mod discounts;
pub mod filter;
pub mod fixtures;
pub mod observability;
pub mod orders;
pub mod prelude;
pub mod report;
pub mod scheduler;
pub mod scopes;
pub mod service;
pub mod solutions;
pub mod solvers;
pub mod wallets;
