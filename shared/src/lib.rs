//! Shared types for the order backend
//!
//! Domain records stored in the order table, the derived sales report,
//! and the request/response bodies of the HTTP API.

pub mod models;
pub mod request;
pub mod response;
pub mod util;

// Re-exports
pub use models::{
    CreditStatus, GRAND_TOTAL_KEY, InvalidDate, MenuSale, Order, OrderDate, OrderItem, OrderKey,
    PaymentMethod, SalesReport,
};
pub use serde::{Deserialize, Serialize};
