// ==========================================
// 负荷日程系统 - 配置管理器
// ==========================================
// 职责: 配置加载、查询、覆写管理
// 存储: config_kv 表 (key-value + scope)
// ==========================================

use crate::db::{configure_sqlite_connection, ensure_schema, open_sqlite_connection};
use crate::domain::capacity::{CapacityLimits, DEFAULT_DAILY_CEILING, DEFAULT_WEEKLY_CEILING};
use crate::repository::event_repo::DEFAULT_EVENTS_KEY;
use rusqlite::{params, Connection};
use serde_json::json;
use std::collections::BTreeMap;
use std::error::Error;
use std::sync::{Arc, Mutex};

/// 全局作用域ID
const GLOBAL_SCOPE: &str = "global";

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
pub struct ConfigManager {
    conn: Arc<Mutex<Connection>>,
}

impl ConfigManager {
    /// 创建新的 ConfigManager 实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    pub fn new(db_path: &str) -> Result<Self, Box<dyn Error>> {
        let conn = open_sqlite_connection(db_path)?;
        ensure_schema(&conn)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建 ConfigManager
    ///
    /// 说明：会对传入连接再次应用统一 PRAGMA 与建表（幂等）。
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Result<Self, Box<dyn Error>> {
        {
            let conn_guard = conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;
            configure_sqlite_connection(&conn_guard)?;
            ensure_schema(&conn_guard)?;
        }

        Ok(Self { conn })
    }

    /// 读取 global scope 的配置值（scope_id='global'）
    pub fn get_global_config_value(&self, key: &str) -> Result<Option<String>, Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;

        let result = conn.query_row(
            "SELECT value FROM config_kv WHERE scope_id = ?1 AND key = ?2",
            params![GLOBAL_SCOPE, key],
            |row| row.get::<_, String>(0),
        );

        match result {
            Ok(value) => Ok(Some(value)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(Box::new(e)),
        }
    }

    /// 写入 global scope 的配置值（UPSERT）
    pub fn set_global_config_value(&self, key: &str, value: &str) -> Result<(), Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;
        conn.execute(
            "INSERT INTO config_kv (scope_id, key, value) VALUES (?1, ?2, ?3)
             ON CONFLICT(scope_id, key) DO UPDATE SET value = ?3, updated_at = datetime('now')",
            params![GLOBAL_SCOPE, key, value],
        )?;
        tracing::info!(key, value, "配置已更新");
        Ok(())
    }

    /// 读取正整数配置，缺失或非法时使用默认值
    fn get_positive_u32(&self, key: &str, default: u32) -> Result<u32, Box<dyn Error>> {
        let raw = match self.get_global_config_value(key)? {
            Some(v) => v,
            None => return Ok(default),
        };

        match raw.trim().parse::<u32>() {
            Ok(v) if v > 0 => Ok(v),
            _ => {
                tracing::warn!(key, value = %raw, default, "配置值非法，使用默认值");
                Ok(default)
            }
        }
    }

    // ===== 容量配置 =====

    /// 获取日/周负荷上限
    pub fn get_capacity_limits(&self) -> Result<CapacityLimits, Box<dyn Error>> {
        Ok(CapacityLimits {
            daily_ceiling: self.get_positive_u32(config_keys::DAILY_CEILING, DEFAULT_DAILY_CEILING)?,
            weekly_ceiling: self
                .get_positive_u32(config_keys::WEEKLY_CEILING, DEFAULT_WEEKLY_CEILING)?,
        })
    }

    // ===== 存储配置 =====

    /// 获取事件集合的存储键
    pub fn get_events_store_key(&self) -> Result<String, Box<dyn Error>> {
        Ok(self
            .get_global_config_value(config_keys::EVENTS_STORE_KEY)?
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| DEFAULT_EVENTS_KEY.to_string()))
    }

    /// 获取所有 global 配置的快照（JSON格式）
    pub fn get_config_snapshot(&self) -> Result<String, Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;

        let mut stmt =
            conn.prepare("SELECT key, value FROM config_kv WHERE scope_id = ?1 ORDER BY key")?;

        let mut config_map: BTreeMap<String, String> = BTreeMap::new();
        let rows = stmt.query_map(params![GLOBAL_SCOPE], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;

        for row in rows {
            let (key, value) = row?;
            config_map.insert(key, value);
        }

        Ok(serde_json::to_string(&json!(config_map))?)
    }
}

// ==========================================
// 配置键常量
// ==========================================
pub mod config_keys {
    // 容量
    pub const DAILY_CEILING: &str = "daily_ceiling";
    pub const WEEKLY_CEILING: &str = "weekly_ceiling";

    // 存储
    pub const EVENTS_STORE_KEY: &str = "events_store_key";
}

#[cfg(test)]
mod tests {
    use super::*;

    fn in_memory_manager() -> ConfigManager {
        let conn = Connection::open_in_memory().unwrap();
        ConfigManager::from_connection(Arc::new(Mutex::new(conn))).unwrap()
    }

    #[test]
    fn test_defaults_when_unset() {
        let manager = in_memory_manager();
        assert_eq!(manager.get_capacity_limits().unwrap(), CapacityLimits::default());
        assert_eq!(manager.get_events_store_key().unwrap(), DEFAULT_EVENTS_KEY);
    }

    #[test]
    fn test_overrides_and_invalid_fallback() {
        let manager = in_memory_manager();
        manager.set_global_config_value(config_keys::DAILY_CEILING, "10").unwrap();
        manager.set_global_config_value(config_keys::WEEKLY_CEILING, "0").unwrap();
        manager.set_global_config_value(config_keys::EVENTS_STORE_KEY, " team_a ").unwrap();

        let limits = manager.get_capacity_limits().unwrap();
        assert_eq!(limits.daily_ceiling, 10);
        assert_eq!(limits.weekly_ceiling, DEFAULT_WEEKLY_CEILING);
        assert_eq!(manager.get_events_store_key().unwrap(), "team_a");
    }

    #[test]
    fn test_file_backed_manager_persists_values() {
        let temp_file = tempfile::NamedTempFile::new().unwrap();
        let db_path = temp_file.path().to_str().unwrap().to_string();

        {
            let manager = ConfigManager::new(&db_path).unwrap();
            assert_eq!(manager.get_global_config_value("missing").unwrap(), None);
            manager.set_global_config_value(config_keys::WEEKLY_CEILING, "30").unwrap();
        }

        let reopened = ConfigManager::new(&db_path).unwrap();
        assert_eq!(
            reopened.get_global_config_value(config_keys::WEEKLY_CEILING).unwrap().as_deref(),
            Some("30")
        );
        assert_eq!(reopened.get_capacity_limits().unwrap().weekly_ceiling, 30);
    }

    #[test]
    fn test_config_snapshot() {
        let manager = in_memory_manager();
        manager.set_global_config_value(config_keys::DAILY_CEILING, "6").unwrap();
        manager.set_global_config_value(config_keys::DAILY_CEILING, "7").unwrap();

        let snapshot: BTreeMap<String, String> =
            serde_json::from_str(&manager.get_config_snapshot().unwrap()).unwrap();
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot.get("daily_ceiling").map(String::as_str), Some("7"));
    }
}
