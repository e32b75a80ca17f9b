use thiserror::Error;

use crate::store::StoreError;

/// 服务器启动/运行错误 (非 HTTP 请求错误，请求错误见 [`crate::AppError`])
#[derive(Error, Debug)]
pub enum ServerError {
    #[error("工作目录不可用: {0}")]
    WorkDir(#[source] std::io::Error),

    #[error("存储初始化失败: {0}")]
    Store(#[from] StoreError),

    #[error("端口绑定失败 {addr}: {source}")]
    Bind {
        addr: std::net::SocketAddr,
        #[source]
        source: std::io::Error,
    },

    #[error("HTTP 服务异常退出: {0}")]
    Serve(#[source] std::io::Error),
}

/// 服务器级 Result 类型别名
pub type Result<T> = std::result::Result<T, ServerError>;
