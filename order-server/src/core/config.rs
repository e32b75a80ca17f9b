use std::path::PathBuf;

use chrono::FixedOffset;

/// 存储后端
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    /// `<work_dir>/orders.redb`
    Redb,
    /// 进程内存，重启即丢失
    Memory,
}

impl StoreBackend {
    fn from_env_value(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "memory" => StoreBackend::Memory,
            "redb" => StoreBackend::Redb,
            other => {
                tracing::warn!(value = other, "Unknown STORE_BACKEND, using redb");
                StoreBackend::Redb
            }
        }
    }
}

/// 服务器配置 - 订单服务的所有配置项
///
/// # 环境变量
///
/// 所有配置项都可以通过环境变量覆盖 (启动时先加载 `.env`)：
///
/// | 环境变量 | 默认值 | 说明 |
/// |----------|--------|------|
/// | WORK_DIR | ./work_dir | 工作目录 (数据库、日志) |
/// | HTTP_PORT | 3000 | HTTP 服务端口 |
/// | ENVIRONMENT | development | 运行环境 |
/// | LOG_LEVEL | info | 日志级别 (`RUST_LOG` 优先) |
/// | LOG_JSON | false | JSON 日志格式 |
/// | STORE_BACKEND | redb | `redb` 或 `memory` |
/// | SCAN_PAGE_SIZE | 100 | 报表扫描每页记录数 |
/// | BUSINESS_UTC_OFFSET_HOURS | 9 | 营业日时区偏移 (小时) |
/// | VALID_API_KEY | (空) | API key，为空时所有请求都未授权 |
/// | SHUTDOWN_TIMEOUT_MS | 10000 | 优雅关闭超时(毫秒) |
///
/// # 示例
///
/// ```ignore
/// WORK_DIR=/data/pos HTTP_PORT=8080 cargo run
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// 工作目录，存储数据库和日志文件
    pub work_dir: String,
    /// HTTP API 服务端口
    pub http_port: u16,
    /// 运行环境: development | staging | production
    pub environment: String,
    pub log_level: String,
    pub log_json: bool,
    pub store_backend: StoreBackend,
    /// 报表扫描分页大小
    pub scan_page_size: usize,
    /// 营业日相对 UTC 的偏移 (小时)
    pub business_utc_offset_hours: i32,
    pub valid_api_key: String,
    /// 关闭超时时间 (毫秒)
    pub shutdown_timeout_ms: u64,
}

fn env_or<T: std::str::FromStr>(name: &str, default: T) -> T {
    std::env::var(name)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

impl Config {
    /// 从环境变量加载配置
    ///
    /// 如果环境变量未设置或无法解析，使用默认值
    pub fn from_env() -> Self {
        Self {
            work_dir: std::env::var("WORK_DIR").unwrap_or_else(|_| "./work_dir".into()),
            http_port: env_or("HTTP_PORT", 3000),
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into()),
            log_level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".into()),
            log_json: env_or("LOG_JSON", false),
            store_backend: std::env::var("STORE_BACKEND")
                .map(|v| StoreBackend::from_env_value(&v))
                .unwrap_or(StoreBackend::Redb),
            scan_page_size: env_or("SCAN_PAGE_SIZE", 100usize).max(1),
            business_utc_offset_hours: env_or("BUSINESS_UTC_OFFSET_HOURS", 9),
            valid_api_key: std::env::var("VALID_API_KEY").unwrap_or_default(),
            shutdown_timeout_ms: env_or("SHUTDOWN_TIMEOUT_MS", 10000),
        }
    }

    /// 使用自定义值覆盖部分配置
    ///
    /// 常用于测试场景
    pub fn with_overrides(
        work_dir: impl Into<String>,
        http_port: u16,
        store_backend: StoreBackend,
    ) -> Self {
        let mut config = Self::from_env();
        config.work_dir = work_dir.into();
        config.http_port = http_port;
        config.store_backend = store_backend;
        config
    }

    pub fn business_offset(&self) -> FixedOffset {
        shared::util::utc_offset_hours(self.business_utc_offset_hours)
    }

    pub fn logs_dir(&self) -> PathBuf {
        PathBuf::from(&self.work_dir).join("logs")
    }

    pub fn database_path(&self) -> PathBuf {
        PathBuf::from(&self.work_dir).join("orders.redb")
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}
