//! Sales Report API Module
//!
//! | 路径 | 方法 | 说明 |
//! |------|------|------|
//! | /api/reports | GET | `?start=YYYY-MM-DD&end=YYYY-MM-DD`，闭区间，仅统计已结清订单 |

mod handler;

use axum::{Router, routing::get};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().route("/api/reports", get(handler::sales_report))
}
