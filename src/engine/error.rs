// ==========================================
// 负荷日程系统 - 引擎层错误类型
// ==========================================
// 红线: 容量拒绝不是错误 (见 AdmissionOutcome.rejected)
// ==========================================

use crate::domain::types::UnknownLevel;
use crate::repository::error::RepositoryError;
use thiserror::Error;

/// 排程引擎错误类型
#[derive(Error, Debug)]
pub enum ScheduleError {
    /// 调用方错误: 空标题 / 空日期集合，无任何副作用
    #[error("无效请求: {0}")]
    InvalidRequest(String),

    /// 等级标签不在等级集合中
    #[error(transparent)]
    UnknownLevel(#[from] UnknownLevel),

    /// 存储读写失败
    #[error("持久化失败: {0}")]
    Persistence(#[from] RepositoryError),

    #[error("排程状态锁获取失败: {0}")]
    LockError(String),
}

/// Result 类型别名
pub type ScheduleResult<T> = Result<T, ScheduleError>;
