// ==========================================
// 负荷日程系统 - API层错误类型
// ==========================================
// 职责: 定义API层错误类型，转换引擎/仓储错误为调用方可读的错误消息
// 红线: 容量拒绝不经过此类型 (属于正常业务结果)
// ==========================================

use crate::engine::error::ScheduleError;
use crate::repository::error::RepositoryError;
use thiserror::Error;

/// API层错误类型
#[derive(Error, Debug)]
pub enum ApiError {
    // ==========================================
    // 调用方错误
    // ==========================================
    #[error("无效输入: {0}")]
    InvalidInput(String),

    #[error("无效日期: {0} (期望格式 YYYY-MM-DD)")]
    InvalidDate(String),

    #[error("未知负荷等级: {0}")]
    UnknownLevel(String),

    // ==========================================
    // 数据访问错误
    // ==========================================
    #[error("持久化失败: {0}")]
    PersistenceError(String),

    // ==========================================
    // 通用错误
    // ==========================================
    #[error("内部错误: {0}")]
    InternalError(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

// ==========================================
// 从 RepositoryError 转换
// ==========================================
impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::Other(err) => ApiError::Other(err),
            other => ApiError::PersistenceError(other.to_string()),
        }
    }
}

// ==========================================
// 从 ScheduleError 转换
// ==========================================
impl From<ScheduleError> for ApiError {
    fn from(err: ScheduleError) -> Self {
        match err {
            ScheduleError::InvalidRequest(msg) => ApiError::InvalidInput(msg),
            ScheduleError::UnknownLevel(level) => ApiError::UnknownLevel(level.0),
            ScheduleError::Persistence(err) => ApiError::from(err),
            ScheduleError::LockError(msg) => ApiError::InternalError(msg),
        }
    }
}

/// Result 类型别名
pub type ApiResult<T> = Result<T, ApiError>;
