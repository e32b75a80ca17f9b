//! Request types
//!
//! Bodies and query strings accepted by the order API. POS clients send
//! the cart-shaped field names (`name`/`count`/`total`/`price`,
//! `type`/`amount`); they are translated into the stored attribute names
//! by the server.

use rust_decimal::Decimal;
use serde::Deserialize;

use crate::models::CreditStatus;

/// Cart line as sent by the POS
#[derive(Debug, Clone, Deserialize)]
pub struct OrderItemInput {
    pub name: String,
    pub count: u32,
    #[serde(with = "rust_decimal::serde::float")]
    pub total: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
}

/// Tender as sent by the POS
#[derive(Debug, Clone, Deserialize)]
pub struct PaymentInput {
    #[serde(rename = "type")]
    pub method: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
}

/// POST /api/orders
///
/// Every field except `orderNum` and `customerName` is required; they are
/// optional here so that a missing field yields a validation error rather
/// than a decoding error.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
    /// Omit to let the server allocate the next number for today
    #[serde(default)]
    pub order_num: Option<u32>,
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub total_amount: Option<Decimal>,
    #[serde(default)]
    pub payment_methods: Option<Vec<PaymentInput>>,
    #[serde(default)]
    pub order_items: Option<Vec<OrderItemInput>>,
    #[serde(default)]
    pub credit_status: Option<CreditStatus>,
    #[serde(default)]
    pub customer_name: Option<String>,
}

/// `?orderDate=YYYY-MM-DD&orderNum=N`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderKeyQuery {
    pub order_date: Option<String>,
    pub order_num: Option<String>,
}

/// `?start=YYYY-MM-DD&end=YYYY-MM-DD`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReportQuery {
    pub start: Option<String>,
    pub end: Option<String>,
}

/// `?date=YYYY-MM-DD` (defaults to today)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OrderNumberQuery {
    pub date: Option<String>,
}
