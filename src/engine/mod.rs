// ==========================================
// 负荷日程系统 - 引擎层
// ==========================================
// 职责: 负荷汇总、容量判定、准入编排
// 红线: Engine 不拼 SQL, 所有拒绝必须输出 reason
// ==========================================

pub mod capacity_gate;
pub mod error;
pub mod load_aggregator;
pub mod scheduler;

// 重导出核心引擎
pub use capacity_gate::CapacityGate;
pub use error::{ScheduleError, ScheduleResult};
pub use load_aggregator::LoadAggregator;
pub use scheduler::{AdmissionOutcome, RemovalOutcome, SchedulingController};
