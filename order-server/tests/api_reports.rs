mod common;

use std::sync::Arc;

use common::*;
use http::StatusCode;
use order_server::RedbOrderStore;
use serde_json::json;
use shared::{CreditStatus, Order, OrderItem, PaymentMethod};

/// First settled order of `day`
fn settled(day: &str, items: Vec<OrderItem>, payments: Vec<PaymentMethod>) -> Order {
    order(day, 1, CreditStatus::Settled, items, payments)
}

#[tokio::test]
async fn test_report_two_settled_orders() {
    let app = memory_app(100);
    seed(app.store.as_ref(), &latte_tea_orders()).await;

    let resp = get(&app.router, "/api/reports?start=2025-06-01&end=2025-06-01").await;
    assert_eq!(resp.status, StatusCode::OK);

    let body = resp.json();
    assert_eq!(
        body["menuSales"]["latte"],
        json!({"quantitySold": 3, "totalSales": 12000.0})
    );
    assert_eq!(
        body["menuSales"]["tea"],
        json!({"quantitySold": 1, "totalSales": 3000.0})
    );
    assert_eq!(body["paymentMethodSales"]["card"], json!(8000.0));
    assert_eq!(body["paymentMethodSales"]["cash"], json!(7000.0));
    assert_eq!(body["paymentMethodSales"]["총합"], json!(15000.0));
    assert_eq!(body["grandTotal"], json!(15000.0));

    // Key order is part of the contract: latte before tea, total last
    let text = &resp.text;
    assert!(text.find("\"latte\"").unwrap() < text.find("\"tea\"").unwrap());
    assert!(text.find("\"card\"").unwrap() < text.find("\"cash\"").unwrap());
    assert!(text.find("\"cash\"").unwrap() < text.find("\"총합\"").unwrap());
}

#[tokio::test]
async fn test_start_after_end_is_400_without_store_call() {
    let app = memory_app(100);
    seed(app.store.as_ref(), &latte_tea_orders()).await;

    let resp = get(&app.router, "/api/reports?start=2025-06-10&end=2025-06-01").await;
    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
    assert!(resp.json()["error"].is_string());
    assert_eq!(app.store.scan_calls(), 0);
}

#[tokio::test]
async fn test_missing_or_malformed_params_are_400() {
    let app = memory_app(100);

    for uri in [
        "/api/reports",
        "/api/reports?start=2025-06-01",
        "/api/reports?end=2025-06-01",
        "/api/reports?start=2025-06-01&end=June",
        "/api/reports?start=2025/06/01&end=2025-06-02",
    ] {
        let resp = get(&app.router, uri).await;
        assert_eq!(resp.status, StatusCode::BAD_REQUEST, "{uri}");
        assert!(resp.json()["error"].is_string(), "{uri}");
    }
    assert_eq!(app.store.scan_calls(), 0);
}

#[tokio::test]
async fn test_credit_orders_never_counted() {
    let app = memory_app(100);
    let mut orders = latte_tea_orders();
    orders.push(order(
        "2025-06-01",
        3,
        CreditStatus::Outstanding,
        vec![item("latte", 10, 40000), item("muffin", 2, 7000)],
        vec![pay("credit", 47000)],
    ));
    seed(app.store.as_ref(), &orders).await;

    let body = get(&app.router, "/api/reports?start=2025-06-01&end=2025-06-01")
        .await
        .json();

    assert_eq!(body["menuSales"]["latte"]["quantitySold"], json!(3));
    assert!(body["menuSales"].get("muffin").is_none());
    assert!(body["paymentMethodSales"].get("credit").is_none());
    assert_eq!(body["paymentMethodSales"]["총합"], json!(15000.0));
}

#[tokio::test]
async fn test_single_day_range() {
    let app = memory_app(100);
    seed(
        app.store.as_ref(),
        &[
            settled("2025-05-31", vec![item("scone", 1, 3000)], vec![pay("cash", 3000)]),
            settled("2025-06-01", vec![item("latte", 1, 4000)], vec![pay("card", 4000)]),
            settled("2025-06-02", vec![item("tea", 1, 3000)], vec![pay("cash", 3000)]),
        ],
    )
    .await;

    let body = get(&app.router, "/api/reports?start=2025-06-01&end=2025-06-01")
        .await
        .json();

    let items: Vec<&String> = body["menuSales"].as_object().unwrap().keys().collect();
    assert_eq!(items, vec!["latte"]);
    assert_eq!(body["grandTotal"], json!(4000.0));
}

#[tokio::test]
async fn test_report_is_byte_identical_on_repeat() {
    let app = memory_app(3);
    let orders: Vec<_> = (1..=9)
        .map(|n| {
            order(
                "2025-06-01",
                n,
                CreditStatus::Settled,
                vec![item("bagel", 1, 3500), item("juice", 1, 5000)],
                vec![pay(if n % 2 == 0 { "card" } else { "cash" }, 8500)],
            )
        })
        .collect();
    seed(app.store.as_ref(), &orders).await;

    let uri = "/api/reports?start=2025-06-01&end=2025-06-01";
    let first = get(&app.router, uri).await;
    let second = get(&app.router, uri).await;
    assert_eq!(first.status, StatusCode::OK);
    assert_eq!(first.text, second.text);

    // Tie on quantity: first-seen order wins
    let text = &first.text;
    assert!(text.find("\"bagel\"").unwrap() < text.find("\"juice\"").unwrap());
}

#[tokio::test]
async fn test_grand_total_equals_sum_of_methods() {
    let app = memory_app(100);
    seed(
        app.store.as_ref(),
        &[
            settled(
                "2025-06-01",
                vec![item("latte", 1, 4500)],
                vec![pay("card", 2000), pay("cash", 2500)],
            ),
            settled("2025-06-02", vec![item("tea", 2, 6000)], vec![pay("transfer", 6000)]),
            settled("2025-06-03", vec![], vec![pay("card", 1250)]),
        ],
    )
    .await;

    let body = get(&app.router, "/api/reports?start=2025-06-01&end=2025-06-03")
        .await
        .json();
    let sales = body["paymentMethodSales"].as_object().unwrap();

    let others: f64 = sales
        .iter()
        .filter(|(k, _)| k.as_str() != "총합")
        .map(|(_, v)| v.as_f64().unwrap())
        .sum();
    assert_eq!(sales["총합"].as_f64().unwrap(), others);
    assert_eq!(others, 11750.0);
}

#[tokio::test]
async fn test_every_page_is_consumed() {
    let app = memory_app(2);
    let orders: Vec<_> = (1..=11)
        .map(|n| {
            let status = if n % 4 == 0 {
                CreditStatus::Outstanding
            } else {
                CreditStatus::Settled
            };
            order(
                "2025-06-01",
                n,
                status,
                vec![item("americano", 1, 2500)],
                vec![pay("card", 2500)],
            )
        })
        .collect();
    seed(app.store.as_ref(), &orders).await;

    let body = get(&app.router, "/api/reports?start=2025-06-01&end=2025-06-01")
        .await
        .json();

    // 11 orders, numbers 4 and 8 on credit
    assert_eq!(body["menuSales"]["americano"]["quantitySold"], json!(9));
    assert_eq!(body["grandTotal"], json!(22500.0));
    assert_eq!(app.store.scan_calls(), 6);
}

#[tokio::test]
async fn test_store_failure_is_500_with_message() {
    let app = memory_app(100);
    seed(app.store.as_ref(), &latte_tea_orders()).await;
    app.store.fail_next(1);

    let resp = get(&app.router, "/api/reports?start=2025-06-01&end=2025-06-01").await;
    assert_eq!(resp.status, StatusCode::INTERNAL_SERVER_ERROR);

    let body = resp.json();
    assert!(body["error"].is_string());
    assert!(body["message"].as_str().unwrap().contains("injected failure"));
    assert!(body.get("menuSales").is_none());
}

#[tokio::test]
async fn test_report_over_redb_store() {
    let tmp = tempfile::tempdir().unwrap();
    let store = Arc::new(RedbOrderStore::open(tmp.path().join("orders.redb")).unwrap());
    seed(store.as_ref(), &latte_tea_orders()).await;
    let (router, _state) = app_with_store(store);

    let body = get(&router, "/api/reports?start=2025-05-01&end=2025-06-30")
        .await
        .json();
    assert_eq!(body["menuSales"]["latte"]["totalSales"], json!(12000.0));
    assert_eq!(body["paymentMethodSales"]["총합"], json!(15000.0));
}

#[tokio::test]
async fn test_empty_range_has_zero_total() {
    let app = memory_app(100);

    let resp = get(&app.router, "/api/reports?start=2025-01-01&end=2025-01-31").await;
    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(
        resp.json(),
        json!({"menuSales": {}, "paymentMethodSales": {"총합": 0.0}, "grandTotal": 0.0})
    );
}
