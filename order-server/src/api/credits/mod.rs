//! Credit API Module (赊账)
//!
//! | 路径 | 方法 | 说明 |
//! |------|------|------|
//! | /api/credits | GET | 未结清的赊账订单，按日期升序 |
//! | /api/credits/{order_date}/{number} | PUT | 结清: creditStatus 1 → 0 |

mod handler;

use axum::{
    Router,
    routing::{get, put},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/api/credits", get(handler::list_outstanding))
        .route("/api/credits/{order_date}/{number}", put(handler::settle))
}
