// ==========================================
// 负荷日程系统 - 事件集合仓储
// ==========================================
// 红线: Repository 不含业务逻辑 (容量校验在 CapacityGate)
// 存储: 单一固定键下的完整事件集合 (JSON 数组)
// 写入: 整体替换,不是追加
// ==========================================

use crate::domain::event::{Event, EventCollection};
use crate::repository::error::RepositoryResult;
use crate::repository::kv_store::KeyValueStore;
use std::sync::Arc;

/// 默认存储键
pub const DEFAULT_EVENTS_KEY: &str = "events_W";

// ==========================================
// EventStore - 事件集合仓储
// ==========================================
#[derive(Clone)]
pub struct EventStore {
    kv: Arc<dyn KeyValueStore>,
    key: String,
}

impl EventStore {
    /// 使用默认键创建
    pub fn new(kv: Arc<dyn KeyValueStore>) -> Self {
        Self::with_key(kv, DEFAULT_EVENTS_KEY)
    }

    pub fn with_key(kv: Arc<dyn KeyValueStore>, key: impl Into<String>) -> Self {
        Self { kv, key: key.into() }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// 读取事件集合，存储不可用时返回错误
    ///
    /// # 返回
    /// - Ok(EventCollection): 键不存在或内容无法解析时为空集合
    /// - Err: 存储不可用
    pub fn try_load(&self) -> RepositoryResult<EventCollection> {
        let raw = match self.kv.get(&self.key)? {
            Some(raw) => raw,
            None => return Ok(EventCollection::new()),
        };

        match serde_json::from_str::<EventCollection>(&raw) {
            Ok(collection) => Ok(collection),
            Err(e) => {
                tracing::warn!(key = %self.key, error = %e, "事件数据无法解析，按空集合处理");
                Ok(EventCollection::new())
            }
        }
    }

    /// 读取事件集合（永不失败）
    ///
    /// 存储不可用时降级为空集合
    pub fn load(&self) -> EventCollection {
        self.try_load().unwrap_or_else(|e| {
            tracing::warn!(key = %self.key, error = %e, "事件存储读取失败，按空集合处理");
            EventCollection::new()
        })
    }

    /// 整体写回事件集合
    pub fn save(&self, collection: &EventCollection) -> RepositoryResult<()> {
        let raw = serde_json::to_string(collection)?;
        self.kv.put(&self.key, &raw)?;
        tracing::debug!(key = %self.key, count = collection.len(), "事件集合已写回");
        Ok(())
    }

    /// 读-改-写: 追加单个事件
    ///
    /// 使用 try_load，避免读取失败时以空集合覆盖已有数据
    pub fn insert(&self, event: Event) -> RepositoryResult<()> {
        let mut collection = self.try_load()?;
        collection.push(event);
        self.save(&collection)
    }

    /// 读-改-写: 按ID删除
    ///
    /// # 返回
    /// - Ok(true): 已删除
    /// - Ok(false): ID不存在（no-op，不写存储）
    pub fn remove(&self, id: &str) -> RepositoryResult<bool> {
        let mut collection = self.try_load()?;
        if collection.remove(id).is_none() {
            return Ok(false);
        }
        self.save(&collection)?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::SeverityLevel;
    use crate::repository::error::RepositoryError;
    use crate::repository::kv_store::MemoryKeyValueStore;
    use chrono::NaiveDate;

    struct UnavailableStore;

    impl KeyValueStore for UnavailableStore {
        fn get(&self, _key: &str) -> RepositoryResult<Option<String>> {
            Err(RepositoryError::StoreUnavailable("offline".to_string()))
        }
        fn put(&self, _key: &str, _value: &str) -> RepositoryResult<()> {
            Err(RepositoryError::StoreUnavailable("offline".to_string()))
        }
        fn delete(&self, _key: &str) -> RepositoryResult<()> {
            Err(RepositoryError::StoreUnavailable("offline".to_string()))
        }
    }

    fn sample_event(title: &str) -> Event {
        Event::new(
            title,
            NaiveDate::from_ymd_opt(2024, 6, 10).unwrap(),
            SeverityLevel::Medium,
        )
    }

    #[test]
    fn test_missing_key_loads_empty() {
        let store = EventStore::new(Arc::new(MemoryKeyValueStore::new()));
        assert!(store.load().is_empty());
    }

    #[test]
    fn test_corrupt_value_loads_empty() {
        let kv = MemoryKeyValueStore::with_entry(DEFAULT_EVENTS_KEY, "{not json");
        let store = EventStore::new(Arc::new(kv));
        assert!(store.try_load().unwrap().is_empty());

        let kv = MemoryKeyValueStore::with_entry(
            DEFAULT_EVENTS_KEY,
            r#"[{"id":"a","title":"t","date":"2024-06-10","level":"extreme"}]"#,
        );
        let store = EventStore::new(Arc::new(kv));
        assert!(store.load().is_empty());
    }

    #[test]
    fn test_unavailable_store() {
        let store = EventStore::new(Arc::new(UnavailableStore));
        assert!(store.load().is_empty());
        assert!(matches!(
            store.try_load(),
            Err(RepositoryError::StoreUnavailable(_))
        ));
        assert!(store.save(&EventCollection::new()).is_err());
        assert!(store.insert(sample_event("A")).is_err());
    }

    #[test]
    fn test_save_is_full_replace() {
        let store = EventStore::new(Arc::new(MemoryKeyValueStore::new()));
        store.insert(sample_event("A")).unwrap();
        store.insert(sample_event("B")).unwrap();
        assert_eq!(store.load().len(), 2);

        let only_c = EventCollection::from_events(vec![sample_event("C")]);
        store.save(&only_c).unwrap();
        assert_eq!(store.load(), only_c);
    }

    #[test]
    fn test_remove_twice_is_idempotent() {
        let store = EventStore::new(Arc::new(MemoryKeyValueStore::new()));
        let keep = sample_event("keep");
        let drop = sample_event("drop");
        let drop_id = drop.id.clone();
        store.insert(keep.clone()).unwrap();
        store.insert(drop).unwrap();

        assert!(store.remove(&drop_id).unwrap());
        let after_first = store.load();
        assert!(!store.remove(&drop_id).unwrap());
        assert_eq!(store.load(), after_first);
        assert_eq!(after_first.as_slice(), &[keep]);
    }

    #[test]
    fn test_custom_key_is_isolated() {
        let kv: Arc<dyn KeyValueStore> = Arc::new(MemoryKeyValueStore::new());
        let a = EventStore::with_key(kv.clone(), "a");
        let b = EventStore::with_key(kv, "b");
        a.insert(sample_event("A")).unwrap();
        assert_eq!(a.load().len(), 1);
        assert!(b.load().is_empty());
    }
}
