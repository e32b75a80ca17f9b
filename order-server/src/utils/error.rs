//! 统一错误处理
//!
//! 提供应用级错误类型：
//! - [`AppError`] - 应用错误枚举，实现 `IntoResponse`
//!
//! # 错误响应格式
//!
//! ```json
//! { "error": "start must not be after end", "message": "start must not be after end" }
//! ```
//!
//! 4xx 错误的 `error` 与 `message` 都是可读的原因；5xx 错误的 `error` 是固定摘要，
//! `message` 带上存储层返回的错误文本。
//!
//! # 使用示例
//!
//! ```ignore
//! Err(AppError::not_found("Order 2025-06-01#3 not found"))
//! ```

use axum::{
    Json,
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use shared::InvalidDate;
use tracing::error;

use crate::orders::{AllocatorError, ReportError};
use crate::store::StoreError;

/// 错误响应体
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    pub message: String,
}

/// 应用错误枚举
///
/// | 分类 | 状态码 |
/// |------|--------|
/// | 输入校验失败 | 400 |
/// | 资源不存在 | 404 |
/// | 主键冲突 | 409 |
/// | 存储不可用 / 内部错误 | 500 |
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Validation failed: {0}")]
    /// 验证失败 (400)
    Validation(String),

    #[error("Resource not found: {0}")]
    /// 资源不存在 (404)
    NotFound(String),

    #[error("Resource already exists: {0}")]
    /// 资源冲突 (409)
    Conflict(String),

    #[error("Store unavailable: {0}")]
    /// 存储调用失败 (500)，不重试
    StoreUnavailable(String),

    #[error("Internal server error: {0}")]
    /// 内部错误 (500)
    Internal(String),
}

impl AppError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::StoreUnavailable(_) | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let (summary, message) = match self {
            AppError::Validation(msg) | AppError::NotFound(msg) | AppError::Conflict(msg) => {
                (msg.clone(), msg)
            }
            AppError::StoreUnavailable(msg) => {
                error!(target: "store", error = %msg, "Store call failed");
                ("Store unavailable".to_string(), msg)
            }
            AppError::Internal(msg) => {
                error!(target: "internal", error = %msg, "Internal error occurred");
                ("Internal server error".to_string(), msg)
            }
        };

        let body = Json(ErrorBody {
            error: summary,
            message,
        });

        (status, body).into_response()
    }
}

// ========== Conversions ==========

impl From<StoreError> for AppError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::AlreadyExists(key) => {
                AppError::Conflict(format!("Order {} already exists", key))
            }
            other => AppError::StoreUnavailable(other.to_string()),
        }
    }
}

impl From<AllocatorError> for AppError {
    fn from(e: AllocatorError) -> Self {
        match e {
            AllocatorError::Store(inner) => inner.into(),
            contention @ AllocatorError::Contention { .. } => {
                AppError::StoreUnavailable(contention.to_string())
            }
        }
    }
}

impl From<ReportError> for AppError {
    fn from(e: ReportError) -> Self {
        match e {
            ReportError::InvalidRange(msg) => AppError::Validation(msg),
            ReportError::Store(inner) => AppError::StoreUnavailable(inner.to_string()),
            overflow @ ReportError::Overflow { .. } => AppError::Internal(overflow.to_string()),
        }
    }
}

impl From<InvalidDate> for AppError {
    fn from(e: InvalidDate) -> Self {
        AppError::Validation(e.to_string())
    }
}

impl From<JsonRejection> for AppError {
    fn from(e: JsonRejection) -> Self {
        AppError::Validation(format!("Invalid or missing request body: {}", e.body_text()))
    }
}

impl From<QueryRejection> for AppError {
    fn from(e: QueryRejection) -> Self {
        AppError::Validation(format!("Invalid query string: {}", e.body_text()))
    }
}
