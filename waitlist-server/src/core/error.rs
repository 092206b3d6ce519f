use thiserror::Error;

/// 服务器级错误 - 启动和运行期间的进程级失败
#[derive(Error, Debug)]
pub enum ServerError {
    #[error("数据库初始化失败: {0}")]
    Database(String),

    #[error("端口绑定失败: {0}")]
    Bind(String),

    #[error("内部服务器错误")]
    Internal(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, ServerError>;
