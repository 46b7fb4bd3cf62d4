// ==========================================
// 负荷日程系统 - 数据仓储层
// ==========================================
// 红线: Repository 不含业务逻辑
// ==========================================
// 职责: 提供数据访问接口,屏蔽持久化介质细节
// 约束: 所有查询使用参数化,防止 SQL 注入
// ==========================================

pub mod error;
pub mod event_repo;
pub mod kv_store;

// 重导出核心仓储
pub use error::{RepositoryError, RepositoryResult};
pub use event_repo::{EventStore, DEFAULT_EVENTS_KEY};
pub use kv_store::{KeyValueStore, MemoryKeyValueStore, SqliteKeyValueStore};
