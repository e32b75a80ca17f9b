//! API Response types
//!
//! Success bodies of the order API. Error bodies are rendered by the
//! server's error type.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::{Order, OrderDate};

/// GET /api/orders/current-order-number
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NextOrderNumberResponse {
    pub next_order_num: u32,
}

/// POST /api/orders
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderResponse {
    pub message: String,
    pub order_date: OrderDate,
    pub order_num: u32,
}

/// DELETE /api/orders
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteOrderResponse {
    pub message: String,
    pub deleted_item: Order,
}

/// One row of GET /api/orders/day/{orderDate}
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderSummary {
    pub customer_name: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_amount: Decimal,
    pub order_method: String,
    pub order_num: u32,
}

impl From<&Order> for OrderSummary {
    fn from(order: &Order) -> Self {
        Self {
            customer_name: order.customer_name.clone().unwrap_or_default(),
            total_amount: order.total_amount,
            order_method: order.order_method(),
            order_num: order.order_num,
        }
    }
}

/// One row of GET /api/credits
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreditItem {
    #[serde(with = "rust_decimal::serde::float")]
    pub total_amount: Decimal,
    pub order_num: u32,
    pub order_date: OrderDate,
    pub customer_name: String,
}

impl From<&Order> for CreditItem {
    fn from(order: &Order) -> Self {
        Self {
            total_amount: order.total_amount,
            order_num: order.order_num,
            order_date: order.order_date,
            customer_name: order.customer_name.clone().unwrap_or_default(),
        }
    }
}

/// Attributes changed by a credit settlement
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatedAttributes {
    pub credit_status: u8,
}

/// PUT /api/credits/{orderDate}/{number}
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettleCreditResponse {
    pub message: String,
    pub updated_attributes: UpdatedAttributes,
}

/// GET /api/auth/api-key
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiKeyCheckResponse {
    pub is_authorized: bool,
}
