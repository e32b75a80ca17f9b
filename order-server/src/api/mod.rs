//! API 路由模块
//!
//! # 结构
//!
//! - [`health`] - 健康检查
//! - [`auth`] - API key 校验
//! - [`orders`] - 订单创建、查询、删除、订单号
//! - [`credits`] - 赊账列表与结清
//! - [`reports`] - 销售报表

pub mod auth;
pub mod credits;
pub mod health;
pub mod orders;
pub mod reports;

// Re-export common types for handlers
pub use crate::utils::AppResult;
