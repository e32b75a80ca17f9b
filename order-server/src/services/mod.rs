//! 服务层
//!
//! - [`http`] - 路由组装和 tower-http 中间件栈

pub mod http;

pub use http::{build_app, build_router};
