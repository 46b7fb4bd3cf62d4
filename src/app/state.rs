// ==========================================
// 负荷日程系统 - 应用状态
// ==========================================
// 职责: 按数据库路径装配 连接 → 配置 → 存储 → 控制器 → API
// ==========================================

use std::sync::{Arc, Mutex};

use crate::api::ScheduleApi;
use crate::config::ConfigManager;
use crate::db::{ensure_schema, open_sqlite_connection, read_schema_version, CURRENT_SCHEMA_VERSION};
use crate::engine::SchedulingController;
use crate::repository::{EventStore, KeyValueStore, SqliteKeyValueStore};

/// 应用状态
///
/// 持有共享连接与 API 实例，由宿主（展示层）创建并长期持有
pub struct AppState {
    /// 数据库路径
    pub db_path: String,

    /// 配置管理器
    pub config_manager: Arc<ConfigManager>,

    /// 排程API
    pub schedule_api: Arc<ScheduleApi>,
}

impl AppState {
    /// 创建新的AppState实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    ///
    /// # 返回
    /// - Ok(AppState): 应用状态实例
    /// - Err(String): 初始化错误
    pub fn new(db_path: String) -> Result<Self, String> {
        tracing::info!("初始化AppState，数据库路径: {}", db_path);

        let conn = open_sqlite_connection(&db_path)
            .map_err(|e| format!("无法打开数据库: {}", e))?;
        ensure_schema(&conn).map_err(|e| format!("数据库初始化失败: {}", e))?;
        match read_schema_version(&conn) {
            Ok(Some(v)) if v != CURRENT_SCHEMA_VERSION => {
                tracing::warn!(
                    found = v,
                    expected = CURRENT_SCHEMA_VERSION,
                    "schema_version 与当前代码不一致"
                );
            }
            Ok(_) => {}
            Err(e) => tracing::warn!("读取 schema_version 失败(将继续启动): {}", e),
        }
        let conn = Arc::new(Mutex::new(conn));

        // ==========================================
        // 配置
        // ==========================================
        let config_manager = Arc::new(
            ConfigManager::from_connection(conn.clone())
                .map_err(|e| format!("无法初始化配置管理器: {}", e))?,
        );
        let limits = config_manager
            .get_capacity_limits()
            .map_err(|e| format!("读取容量配置失败: {}", e))?;
        let events_key = config_manager
            .get_events_store_key()
            .map_err(|e| format!("读取存储键配置失败: {}", e))?;

        // ==========================================
        // 存储 / 引擎 / API
        // ==========================================
        let kv: Arc<dyn KeyValueStore> = Arc::new(SqliteKeyValueStore::from_connection(conn));
        let store = EventStore::with_key(kv, events_key);
        let controller = Arc::new(SchedulingController::new(store, limits));
        let schedule_api = Arc::new(ScheduleApi::new(controller));

        tracing::info!("AppState初始化成功");

        Ok(Self {
            db_path,
            config_manager,
            schedule_api,
        })
    }
}

/// 获取默认数据库路径
///
/// 优先级: 环境变量 WORKLOAD_CALENDAR_DB_PATH > 用户数据目录 > 当前目录
pub fn get_default_db_path() -> String {
    use std::path::PathBuf;

    if let Ok(path) = std::env::var("WORKLOAD_CALENDAR_DB_PATH") {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }

    let mut path = PathBuf::from("./workload_calendar.db");

    if let Some(data_dir) = dirs::data_dir() {
        let app_dir = data_dir.join("workload-calendar");
        match std::fs::create_dir_all(&app_dir) {
            Ok(()) => path = app_dir.join("workload_calendar.db"),
            Err(e) => tracing::warn!("无法创建数据目录 {:?}，使用当前目录: {}", app_dir, e),
        }
    }

    path.to_string_lossy().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_default_db_path() {
        let path = get_default_db_path();
        assert!(!path.is_empty());
        assert!(path.ends_with(".db"));
    }
}
