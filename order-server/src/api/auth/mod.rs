//! API key check
//!
//! | 路径 | 方法 | 说明 |
//! |------|------|------|
//! | /api/auth/api-key | GET | 比较请求头 `apikey` 与 `VALID_API_KEY` |

mod handler;

use axum::{Router, routing::get};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().route("/api/auth/api-key", get(handler::check_api_key))
}
