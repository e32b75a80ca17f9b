//! Order API Handlers

use axum::{
    Json,
    extract::{Path, State},
};
use rust_decimal::Decimal;
use shared::request::{CreateOrderRequest, OrderKeyQuery, OrderNumberQuery};
use shared::response::{
    CreateOrderResponse, DeleteOrderResponse, NextOrderNumberResponse, OrderSummary,
};
use shared::{CreditStatus, GRAND_TOTAL_KEY, Order, OrderDate, OrderItem, PaymentMethod};

use crate::core::ServerState;
use crate::utils::validation::{
    MAX_CUSTOMER_NAME_LEN, MAX_LABEL_LEN, parse_date, parse_order_key, validate_amount,
    validate_optional_text, validate_required_text,
};
use crate::utils::{AppError, AppResult, ValidatedJson, ValidatedQuery};

/// GET /api/orders/current-order-number
pub async fn current_order_number(
    State(state): State<ServerState>,
    ValidatedQuery(query): ValidatedQuery<OrderNumberQuery>,
) -> AppResult<Json<NextOrderNumberResponse>> {
    let date = match query.date.as_deref() {
        Some(raw) => parse_date(raw, "date")?,
        None => state.today(),
    };

    let next_order_num = state.allocator.next_order_number(date).await?;
    Ok(Json(NextOrderNumberResponse { next_order_num }))
}

/// Validated create request, before a number and date are assigned
#[derive(Debug)]
struct NewOrder {
    order_num: Option<u32>,
    total_amount: Decimal,
    customer_name: Option<String>,
    credit_status: CreditStatus,
    order_items: Vec<OrderItem>,
    payment_methods: Vec<PaymentMethod>,
}

impl NewOrder {
    fn into_order(self, order_date: OrderDate, order_num: u32) -> Order {
        Order {
            order_date,
            order_num,
            total_amount: self.total_amount,
            customer_name: self.customer_name,
            credit_status: self.credit_status,
            order_items: self.order_items,
            payment_methods: self.payment_methods,
        }
    }
}

impl TryFrom<CreateOrderRequest> for NewOrder {
    type Error = AppError;

    fn try_from(req: CreateOrderRequest) -> Result<Self, Self::Error> {
        let (Some(total_amount), Some(payments), Some(items), Some(credit_status)) = (
            req.total_amount,
            req.payment_methods,
            req.order_items,
            req.credit_status,
        ) else {
            return Err(AppError::validation(
                "totalAmount, paymentMethods, orderItems and creditStatus are required",
            ));
        };

        if req.order_num == Some(0) {
            return Err(AppError::validation("orderNum must be a positive integer"));
        }

        validate_amount(total_amount, "totalAmount")?;

        let customer_name = req.customer_name.filter(|n| !n.trim().is_empty());
        validate_optional_text(&customer_name, "customerName", MAX_CUSTOMER_NAME_LEN)?;

        let mut order_items = Vec::with_capacity(items.len());
        for item in items {
            validate_required_text(&item.name, "orderItems.name", MAX_LABEL_LEN)?;
            validate_amount(item.total, "orderItems.total")?;
            validate_amount(item.price, "orderItems.price")?;
            order_items.push(OrderItem {
                item_name: item.name,
                quantity: item.count,
                subtotal: item.total,
                unit_price: item.price,
            });
        }

        let mut payment_methods = Vec::with_capacity(payments.len());
        for payment in payments {
            validate_required_text(&payment.method, "paymentMethods.type", MAX_LABEL_LEN)?;
            if payment.method == GRAND_TOTAL_KEY {
                return Err(AppError::validation(format!(
                    "'{GRAND_TOTAL_KEY}' is reserved and cannot be used as a payment method"
                )));
            }
            validate_amount(payment.amount, "paymentMethods.amount")?;
            payment_methods.push(PaymentMethod {
                method: payment.method,
                amount: payment.amount,
            });
        }

        Ok(Self {
            order_num: req.order_num,
            total_amount,
            customer_name,
            credit_status,
            order_items,
            payment_methods,
        })
    }
}

/// POST /api/orders
///
/// The order is dated today. Without `orderNum` the next number is reserved
/// through the allocator; a supplied number that already exists is a 409.
pub async fn create(
    State(state): State<ServerState>,
    ValidatedJson(req): ValidatedJson<CreateOrderRequest>,
) -> AppResult<Json<CreateOrderResponse>> {
    let new_order = NewOrder::try_from(req)?;
    let order_date = state.today();

    let order_num = match new_order.order_num {
        Some(num) => num,
        None => state.allocator.allocate(order_date).await?,
    };

    let order = new_order.into_order(order_date, order_num);
    state.store.insert(&order).await?;

    tracing::info!(
        order = %order.key(),
        total = %order.total_amount,
        credit = order.credit_status.as_flag(),
        "Order created"
    );

    Ok(Json(CreateOrderResponse {
        message: "Order created".to_string(),
        order_date,
        order_num,
    }))
}

/// GET /api/orders/item?orderDate=&orderNum=
pub async fn get_by_key(
    State(state): State<ServerState>,
    ValidatedQuery(query): ValidatedQuery<OrderKeyQuery>,
) -> AppResult<Json<Order>> {
    let key = parse_order_key(query.order_date.as_deref(), query.order_num.as_deref())?;

    let order = state
        .store
        .get(key)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Order {} not found", key)))?;
    Ok(Json(order))
}

/// DELETE /api/orders?orderDate=&orderNum=
pub async fn delete(
    State(state): State<ServerState>,
    ValidatedQuery(query): ValidatedQuery<OrderKeyQuery>,
) -> AppResult<Json<DeleteOrderResponse>> {
    let key = parse_order_key(query.order_date.as_deref(), query.order_num.as_deref())?;

    let deleted_item = state
        .store
        .delete(key)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Order {} not found", key)))?;

    tracing::info!(order = %key, "Order deleted");
    Ok(Json(DeleteOrderResponse {
        message: format!("Order {} deleted", key),
        deleted_item,
    }))
}

/// GET /api/orders/day/{order_date}
pub async fn list_by_day(
    State(state): State<ServerState>,
    Path(order_date): Path<String>,
) -> AppResult<Json<Vec<OrderSummary>>> {
    let date = parse_date(&order_date, "orderDate")?;

    let orders = state.store.query_date(date, false, usize::MAX).await?;
    if orders.is_empty() {
        return Err(AppError::not_found(format!("No orders found for {}", date)));
    }

    Ok(Json(orders.iter().map(OrderSummary::from).collect()))
}
