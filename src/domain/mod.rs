// ==========================================
// 负荷日程系统 - 领域模型层
// ==========================================
// 职责: 定义领域实体、类型、容量约束值对象
// 红线: 不含数据访问逻辑,不含引擎逻辑
// ==========================================

pub mod capacity;
pub mod event;
pub mod types;

// 重导出核心类型
pub use capacity::{
    AdmissionDecision, CapacityLimits, DayLoad, Rejection, ViolatedConstraint, WeekLoad,
    DEFAULT_DAILY_CEILING, DEFAULT_WEEKLY_CEILING,
};
pub use event::{Event, EventCollection, SelectionSet};
pub use types::{weight_of, SeverityLevel, UnknownLevel};
