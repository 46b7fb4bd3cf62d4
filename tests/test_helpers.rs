// ==========================================
// 测试辅助函数
// ==========================================
// 职责: 提供测试所需的数据库初始化、控制器装配、故障存储等功能
// ==========================================

#![allow(dead_code)]

use chrono::NaiveDate;
use rusqlite::Connection;
use std::error::Error;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use tempfile::NamedTempFile;
use workload_calendar::db::{ensure_schema, open_sqlite_connection};
use workload_calendar::repository::{
    EventStore, KeyValueStore, MemoryKeyValueStore, RepositoryError, RepositoryResult,
};
use workload_calendar::{CapacityLimits, SchedulingController};

/// 创建临时测试数据库并初始化 schema
///
/// # 返回
/// - NamedTempFile: 临时数据库文件（需要保持存活）
/// - String: 数据库文件路径
pub fn create_test_db() -> Result<(NamedTempFile, String), Box<dyn Error>> {
    let temp_file = NamedTempFile::new()?;
    let db_path = temp_file
        .path()
        .to_str()
        .ok_or("临时文件路径不是 UTF-8")?
        .to_string();

    let conn = open_sqlite_connection(&db_path)?;
    ensure_schema(&conn)?;

    Ok((temp_file, db_path))
}

/// 打开测试数据库连接
pub fn open_test_connection(db_path: &str) -> Result<Connection, Box<dyn Error>> {
    Ok(open_sqlite_connection(db_path)?)
}

/// 便捷日期构造
pub fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

/// 基于内存存储的控制器（默认上限 8 / 42）
pub fn memory_controller() -> SchedulingController {
    let store = EventStore::new(Arc::new(MemoryKeyValueStore::new()));
    SchedulingController::new(store, CapacityLimits::default())
}

// ==========================================
// FlakyKeyValueStore - 可切换故障的存储
// ==========================================
// 用途: 模拟存储不可用 → 恢复
#[derive(Default)]
pub struct FlakyKeyValueStore {
    inner: MemoryKeyValueStore,
    offline: AtomicBool,
    put_calls: AtomicUsize,
}

impl FlakyKeyValueStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    pub fn put_calls(&self) -> usize {
        self.put_calls.load(Ordering::SeqCst)
    }

    fn check(&self) -> RepositoryResult<()> {
        if self.offline.load(Ordering::SeqCst) {
            Err(RepositoryError::StoreUnavailable("模拟存储离线".to_string()))
        } else {
            Ok(())
        }
    }
}

impl KeyValueStore for FlakyKeyValueStore {
    fn get(&self, key: &str) -> RepositoryResult<Option<String>> {
        self.check()?;
        self.inner.get(key)
    }

    fn put(&self, key: &str, value: &str) -> RepositoryResult<()> {
        self.put_calls.fetch_add(1, Ordering::SeqCst);
        self.check()?;
        self.inner.put(key, value)
    }

    fn delete(&self, key: &str) -> RepositoryResult<()> {
        self.check()?;
        self.inner.delete(key)
    }
}
