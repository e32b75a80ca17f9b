//! Order API Module
//!
//! | 路径 | 方法 | 说明 |
//! |------|------|------|
//! | /api/orders/current-order-number | GET | 今日 (或 `?date=`) 的下一个订单号 |
//! | /api/orders | POST | 创建订单 (未提供 `orderNum` 时自动分配) |
//! | /api/orders | DELETE | 删除订单 `?orderDate=&orderNum=` |
//! | /api/orders/item | GET | 查询单个订单 `?orderDate=&orderNum=` |
//! | /api/orders/day/{order_date} | GET | 当日订单摘要 |

mod handler;

use axum::{
    Router,
    routing::{get, post},
};

use crate::core::ServerState;

/// Order router
pub fn router() -> Router<ServerState> {
    Router::new()
        .route(
            "/api/orders",
            post(handler::create).delete(handler::delete),
        )
        .route(
            "/api/orders/current-order-number",
            get(handler::current_order_number),
        )
        .route("/api/orders/item", get(handler::get_by_key))
        .route("/api/orders/day/{order_date}", get(handler::list_by_day))
}
