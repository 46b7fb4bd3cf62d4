// ==========================================
// 负荷日程系统 - 核心库
// ==========================================
// 系统定位: 日/周负荷容量约束排程核心 (进程内库)
// 技术栈: Rust + SQLite
// 展示层 (日历绘制、表单、配色、文案) 不在本库范围内
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 数据仓储层 - 数据访问
pub mod repository;

// 引擎层 - 业务规则
pub mod engine;

// 配置层 - 系统配置
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA 统一）
pub mod db;

// 日志系统
pub mod logging;

// API 层 - 业务接口
pub mod api;

// 应用层 - 组件装配
pub mod app;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::{
    AdmissionDecision, CapacityLimits, DayLoad, Event, EventCollection, Rejection, SelectionSet,
    SeverityLevel, UnknownLevel, ViolatedConstraint, WeekLoad,
};

// 仓储
pub use repository::{EventStore, KeyValueStore, MemoryKeyValueStore, SqliteKeyValueStore};

// 引擎
pub use engine::{
    AdmissionOutcome, CapacityGate, LoadAggregator, RemovalOutcome, ScheduleError,
    SchedulingController,
};

// API
pub use api::{ApiError, ApiResult, ScheduleApi};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "负荷日程系统";
