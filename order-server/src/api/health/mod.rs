//! 健康检查路由
//!
//! # 路由列表
//!
//! | 路径 | 方法 | 说明 | 认证 |
//! |------|------|------|------|
//! | /health | GET | 简单健康检查 | 无 |
//! | /health/detailed | GET | 详细健康检查 (含存储探测) | 无 |
//!
//! # 响应示例
//!
//! ```json
//! { "status": "ok", "version": "0.1.0" }
//! ```

use axum::{Json, Router, extract::State, routing::get};
use serde::Serialize;

use crate::core::{ServerState, StoreBackend};

/// 健康检查路由 - 公共路由
pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/health", get(health))
        .route("/health/detailed", get(detailed_health))
}

/// 简单健康检查响应
#[derive(Serialize)]
pub struct HealthResponse {
    /// 状态 (ok | error)
    status: &'static str,
    /// 版本号
    version: &'static str,
}

/// 详细健康检查响应
#[derive(Serialize)]
pub struct DetailedHealthResponse {
    status: &'static str,
    version: &'static str,
    /// 运行时间 (秒)
    uptime_seconds: u64,
    /// 当前营业日
    business_date: String,
    store: CheckResult,
}

/// 单项检查结果
#[derive(Serialize)]
pub struct CheckResult {
    /// 状态 (ok | error)
    status: &'static str,
    backend: &'static str,
    /// 延迟 (毫秒)
    #[serde(skip_serializing_if = "Option::is_none")]
    latency_ms: Option<u64>,
    /// 错误信息
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
}

/// 基础健康检查
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// 包含存储状态的详细健康检查
pub async fn detailed_health(State(state): State<ServerState>) -> Json<DetailedHealthResponse> {
    let today = state.today();
    let backend = match state.config.store_backend {
        StoreBackend::Redb => "redb",
        StoreBackend::Memory => "memory",
    };

    // 读取今日计数器验证存储可用
    let started = std::time::Instant::now();
    let store = match state.store.read_counter(today).await {
        Ok(_) => CheckResult {
            status: "ok",
            backend,
            latency_ms: Some(started.elapsed().as_millis() as u64),
            message: None,
        },
        Err(e) => CheckResult {
            status: "error",
            backend,
            latency_ms: None,
            message: Some(e.to_string()),
        },
    };

    Json(DetailedHealthResponse {
        status: if store.status == "ok" { "ok" } else { "degraded" },
        version: env!("CARGO_PKG_VERSION"),
        uptime_seconds: state.uptime_secs(),
        business_date: today.to_string(),
        store,
    })
}
