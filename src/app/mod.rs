// ==========================================
// 负荷日程系统 - 应用层
// ==========================================
// 职责: 装配核心组件,供展示层持有
// ==========================================

pub mod state;

// 重导出
pub use state::{get_default_db_path, AppState};
