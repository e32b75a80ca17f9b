//! Data models
//!
//! Shared between order-server and POS clients (via API).
//! Monetary amounts are `rust_decimal::Decimal`, carried as JSON numbers.

pub mod order;
pub mod report;

// Re-exports
pub use order::*;
pub use report::*;
