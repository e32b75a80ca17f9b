//! In-process test harness: the assembled router driven through `oneshot`

#![allow(dead_code)]

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use http::{Method, Request, StatusCode};
use http_body_util::BodyExt;
use order_server::{
    Config, MemoryOrderStore, OrderStore, ServerState, StoreBackend, build_router,
};
use rust_decimal::Decimal;
use serde_json::Value;
use shared::{CreditStatus, Order, OrderDate, OrderItem, PaymentMethod};

pub const TEST_API_KEY: &str = "test-key-123";

pub struct TestApp {
    pub router: Router,
    pub state: ServerState,
    pub store: Arc<MemoryOrderStore>,
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: http::HeaderMap,
    pub text: String,
}

impl TestResponse {
    pub fn json(&self) -> Value {
        serde_json::from_str(&self.text).unwrap_or(Value::Null)
    }
}

pub fn test_config(store_backend: StoreBackend) -> Config {
    let mut config = Config::with_overrides("./target/test_work_dir", 0, store_backend);
    config.valid_api_key = TEST_API_KEY.to_string();
    config.scan_page_size = 100;
    config
}

/// Router over a fresh [`MemoryOrderStore`] capped at `page_size` records per scan page
pub fn memory_app(page_size: usize) -> TestApp {
    let store = Arc::new(MemoryOrderStore::with_page_size(page_size));
    let state = ServerState::with_store(test_config(StoreBackend::Memory), store.clone());
    TestApp {
        router: build_router(state.clone()),
        state,
        store,
    }
}

pub fn app_with_store(store: Arc<dyn OrderStore>) -> (Router, ServerState) {
    let state = ServerState::with_store(test_config(StoreBackend::Redb), store);
    (build_router(state.clone()), state)
}

pub async fn send(
    router: &Router,
    method: Method,
    uri: &str,
    body: Option<Value>,
    headers: &[(&str, &str)],
) -> TestResponse {
    use tower::ServiceExt;

    let mut builder = Request::builder().method(method).uri(uri);
    for (name, value) in headers {
        builder = builder.header(*name, *value);
    }

    let request = match body {
        Some(json) => builder
            .header(http::header::CONTENT_TYPE, "application/json")
            .body(Body::from(serde_json::to_vec(&json).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();

    TestResponse {
        status,
        headers,
        text: String::from_utf8(bytes.to_vec()).unwrap(),
    }
}

pub async fn get(router: &Router, uri: &str) -> TestResponse {
    send(router, Method::GET, uri, None, &[]).await
}

pub fn date(s: &str) -> OrderDate {
    OrderDate::parse(s).unwrap()
}

pub fn item(name: &str, quantity: u32, subtotal: i64) -> OrderItem {
    OrderItem {
        item_name: name.to_string(),
        quantity,
        subtotal: Decimal::from(subtotal),
        unit_price: Decimal::from(subtotal / i64::from(quantity.max(1))),
    }
}

pub fn pay(method: &str, amount: i64) -> PaymentMethod {
    PaymentMethod {
        method: method.to_string(),
        amount: Decimal::from(amount),
    }
}

pub fn order(
    day: &str,
    num: u32,
    credit_status: CreditStatus,
    order_items: Vec<OrderItem>,
    payment_methods: Vec<PaymentMethod>,
) -> Order {
    Order {
        order_date: date(day),
        order_num: num,
        total_amount: payment_methods.iter().map(|p| p.amount).sum(),
        customer_name: None,
        credit_status,
        order_items,
        payment_methods,
    }
}

/// The two settled orders of 2025-06-01 used across the report tests
pub fn latte_tea_orders() -> Vec<Order> {
    vec![
        order(
            "2025-06-01",
            1,
            CreditStatus::Settled,
            vec![item("latte", 2, 8000)],
            vec![pay("card", 8000)],
        ),
        order(
            "2025-06-01",
            2,
            CreditStatus::Settled,
            vec![item("latte", 1, 4000), item("tea", 1, 3000)],
            vec![pay("cash", 7000)],
        ),
    ]
}

pub async fn seed(store: &dyn OrderStore, orders: &[Order]) {
    for order in orders {
        store.put(order).await.unwrap();
    }
}
