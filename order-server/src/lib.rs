//! Order Server - POS 订单后端
//!
//! # 架构概述
//!
//! - **存储** (`store`): `OrderStore` 契约，redb 与内存两种实现
//! - **订单服务** (`orders`): 按日订单号分配、销售报表汇总
//! - **HTTP API** (`api`): axum 路由和处理器
//!
//! # 模块结构
//!
//! ```text
//! order-server/src/
//! ├── core/          # 配置、状态、服务器
//! ├── store/         # OrderStore 契约与实现
//! ├── orders/        # 订单号分配、报表
//! ├── services/      # 路由组装、中间件
//! ├── api/           # HTTP 路由和处理器
//! └── utils/         # 错误、日志、校验
//! ```

pub mod api;
pub mod core;
pub mod orders;
pub mod services;
pub mod store;
pub mod utils;

// Re-export 公共类型
pub use crate::core::{Config, Server, ServerState, StoreBackend};
pub use orders::{OrderNumberAllocator, ReportAggregator};
pub use services::build_router;
pub use store::{MemoryOrderStore, OrderStore, RedbOrderStore};
pub use utils::{AppError, AppResult};

// Re-export logger functions
pub use utils::logger::{cleanup_old_logs, init_logger, init_logger_with_file};

/// 设置运行环境: 加载 `.env`、读取配置、初始化日志
///
/// 日志写到 `<work_dir>/logs`，并启动每小时一次的旧日志清理。
/// 需要在 tokio 运行时内调用。
pub fn setup_environment() -> anyhow::Result<Config> {
    dotenv::dotenv().ok();
    let config = Config::from_env();

    let logs_dir = config.logs_dir();
    init_logger_with_file(&config.log_level, config.log_json, Some(&logs_dir))?;
    tokio::spawn(utils::logger::periodic_cleanup(logs_dir));

    Ok(config)
}

pub fn print_banner() {
    println!(
        r#"
   ____          __
  / __ \_______/ /__ ____
 / /_/ / __/ _  / -_) __/
 \____/_/  \_,_/\__/_/
   order-server v{}
    "#,
        env!("CARGO_PKG_VERSION")
    );
}
