// ==========================================
// 负荷日程系统 - 键值存储
// ==========================================
// 职责: 持久化介质抽象 (durable key-value store)
// 红线: Repository 不含业务逻辑
// ==========================================
// 实现:
// - SqliteKeyValueStore: kv_store 表
// - MemoryKeyValueStore: 进程内存 (测试/嵌入场景)
// ==========================================

use crate::db::{ensure_schema, open_sqlite_connection};
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection, OptionalExtension};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

// ==========================================
// Trait: KeyValueStore
// ==========================================
pub trait KeyValueStore: Send + Sync {
    /// 读取键值
    ///
    /// # 返回
    /// - Ok(Some(String)): 键存在
    /// - Ok(None): 键不存在
    /// - Err: 存储不可用
    fn get(&self, key: &str) -> RepositoryResult<Option<String>>;

    /// 写入键值（整体覆盖）
    fn put(&self, key: &str, value: &str) -> RepositoryResult<()>;

    /// 删除键（不存在时为 no-op）
    fn delete(&self, key: &str) -> RepositoryResult<()>;
}

// ==========================================
// SqliteKeyValueStore - SQLite 键值存储
// ==========================================
pub struct SqliteKeyValueStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteKeyValueStore {
    /// 打开数据库文件并确保 kv_store 表存在
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = open_sqlite_connection(db_path)
            .map_err(|e| RepositoryError::DatabaseConnectionError(e.to_string()))?;
        ensure_schema(&conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建（调用方负责 schema 初始化）
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }
}

impl KeyValueStore for SqliteKeyValueStore {
    fn get(&self, key: &str) -> RepositoryResult<Option<String>> {
        let conn = self.get_conn()?;
        let value = conn
            .query_row(
                "SELECT value FROM kv_store WHERE key = ?1",
                params![key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(value)
    }

    fn put(&self, key: &str, value: &str) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO kv_store (key, value, updated_at)
            VALUES (?1, ?2, datetime('now', 'localtime'))
            ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at
            "#,
            params![key, value],
        )?;
        Ok(())
    }

    fn delete(&self, key: &str) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute("DELETE FROM kv_store WHERE key = ?1", params![key])?;
        Ok(())
    }
}

// ==========================================
// MemoryKeyValueStore - 内存键值存储
// ==========================================
#[derive(Debug, Default)]
pub struct MemoryKeyValueStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryKeyValueStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 预置一个键值（测试用种子数据）
    pub fn with_entry(key: &str, value: &str) -> Self {
        let mut entries = HashMap::new();
        entries.insert(key.to_string(), value.to_string());
        Self {
            entries: Mutex::new(entries),
        }
    }

    fn entries(&self) -> RepositoryResult<MutexGuard<'_, HashMap<String, String>>> {
        self.entries
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }
}

impl KeyValueStore for MemoryKeyValueStore {
    fn get(&self, key: &str) -> RepositoryResult<Option<String>> {
        Ok(self.entries()?.get(key).cloned())
    }

    fn put(&self, key: &str, value: &str) -> RepositoryResult<()> {
        self.entries()?.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn delete(&self, key: &str) -> RepositoryResult<()> {
        self.entries()?.remove(key);
        Ok(())
    }
}
