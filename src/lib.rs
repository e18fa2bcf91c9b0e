//! storefront-api
//!
//! Self-hosted storefront service: catalog browsing, session carts,
//! checkout and order fulfillment behind a JSON API.
//!
//! The order core is a small state machine: an order is created unpaid and
//! undelivered, payment capture moves it to paid, an administrator moves a
//! paid order to delivered. Orders snapshot product prices at creation;
//! totals are computed server-side and trusted thereafter.

pub mod config;
pub mod domain;
pub mod error;
pub mod http;
pub mod payment;
pub mod pricing;
pub mod session;
pub mod store;
