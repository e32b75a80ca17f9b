//! 工具模块 - 通用工具函数和类型
//!
//! # 内容
//!
//! - [`AppError`] - 应用错误类型
//! - [`AppResult`] - 处理器返回类型
//! - [`ValidatedJson`] - 将 JSON 解析失败转换为 400 的提取器
//! - 日志、输入校验

pub mod error;
pub mod extract;
pub mod logger;
pub mod result;
pub mod validation;

pub use error::{AppError, ErrorBody};
pub use extract::{ValidatedJson, ValidatedQuery};
pub use result::AppResult;
