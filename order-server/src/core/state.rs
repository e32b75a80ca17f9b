use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use shared::OrderDate;

use crate::core::{Config, Result, ServerError, StoreBackend};
use crate::orders::{OrderNumberAllocator, ReportAggregator};
use crate::store::{MemoryOrderStore, OrderStore, RedbOrderStore};

/// 服务器状态 - 持有所有服务的共享引用
///
/// 使用 Arc 实现浅拷贝，每个请求拿到的都是同一个存储句柄。
///
/// | 字段 | 类型 | 说明 |
/// |------|------|------|
/// | config | Config | 配置项 (不可变) |
/// | store | Arc<dyn OrderStore> | 订单存储 |
/// | allocator | OrderNumberAllocator | 订单号分配 |
/// | reports | ReportAggregator | 销售报表 |
///
/// # 使用示例
///
/// ```ignore
/// let state = ServerState::initialize(&config)?;
/// let next = state.allocator.next_order_number(state.today()).await?;
/// ```
#[derive(Clone)]
pub struct ServerState {
    /// 服务器配置
    pub config: Config,
    /// 订单存储 (redb 或内存)
    pub store: Arc<dyn OrderStore>,
    pub allocator: OrderNumberAllocator,
    pub reports: ReportAggregator,
    /// 启动时间 (用于 uptime)
    pub started_at: Instant,
}

impl ServerState {
    /// 用已构造的存储创建状态
    ///
    /// 测试中直接传入 [`MemoryOrderStore`]
    pub fn with_store(config: Config, store: Arc<dyn OrderStore>) -> Self {
        let allocator = OrderNumberAllocator::new(store.clone());
        let reports = ReportAggregator::new(store.clone(), config.scan_page_size);
        Self {
            config,
            store,
            allocator,
            reports,
            started_at: Instant::now(),
        }
    }

    /// 初始化服务器状态
    ///
    /// 按顺序初始化：
    /// 1. 工作目录 (确保目录存在)
    /// 2. 存储 (work_dir/orders.redb 或内存)
    pub fn initialize(config: &Config) -> Result<Self> {
        std::fs::create_dir_all(PathBuf::from(&config.work_dir)).map_err(ServerError::WorkDir)?;

        let store: Arc<dyn OrderStore> = match config.store_backend {
            StoreBackend::Redb => {
                let path = config.database_path();
                tracing::info!(path = %path.display(), "Opening redb order store");
                Arc::new(RedbOrderStore::open(&path)?)
            }
            StoreBackend::Memory => {
                tracing::warn!("Using in-memory order store, data is lost on restart");
                Arc::new(MemoryOrderStore::with_page_size(config.scan_page_size))
            }
        };

        Ok(Self::with_store(config.clone(), store))
    }

    /// 当前营业日 (按配置的 UTC 偏移)
    pub fn today(&self) -> OrderDate {
        OrderDate::today(self.config.business_offset())
    }

    pub fn uptime_secs(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initialize_memory_backend() {
        let tmp = tempfile::tempdir().unwrap();
        let work_dir = tmp.path().join("work");
        let config = Config::with_overrides(
            work_dir.to_string_lossy(),
            0,
            StoreBackend::Memory,
        );

        let state = ServerState::initialize(&config).unwrap();
        assert!(work_dir.exists());
        assert_eq!(state.config.store_backend, StoreBackend::Memory);
    }

    #[test]
    fn test_initialize_redb_backend_creates_file() {
        let tmp = tempfile::tempdir().unwrap();
        let config = Config::with_overrides(
            tmp.path().to_string_lossy(),
            0,
            StoreBackend::Redb,
        );

        ServerState::initialize(&config).unwrap();
        assert!(config.database_path().exists());
    }
}
