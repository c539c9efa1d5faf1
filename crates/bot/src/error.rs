use thiserror::Error;

/// 统一的应用错误类型
///
/// 客户端层的错误在各自的 seam 里就地吸收；这里只保留需要报告给
/// 调用方的两类：推送未送达、内部处理失败。
#[derive(Debug, Error)]
pub enum AppError {
    /// 推送未能送达任何平台
    #[error("推送失败: {0}")]
    Delivery(String),

    /// 内部错误
    #[error("内部错误: {0}")]
    Internal(String),
}

impl AppError {
    pub fn delivery(msg: impl Into<String>) -> Self {
        Self::Delivery(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }
}

/// 便捷类型别名
pub type AppResult<T> = Result<T, AppError>;
