// ==========================================
// 负荷日程系统 - 负荷事件领域模型
// ==========================================
// 红线: 事件ID生成后不可变、不可复用
// 红线: 事件不做原地修改 (编辑 = 删除 + 新建)
// ==========================================

use crate::domain::types::SeverityLevel;
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeSet;
use uuid::Uuid;

// ==========================================
// Event - 负荷事件
// ==========================================
// 持久化格式: {id, title, date: "YYYY-MM-DD", level: "<tag>"}
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    #[serde(deserialize_with = "deserialize_event_id")]
    pub id: String,            // 事件ID (UUID v4)
    pub title: String,         // 标题 (非空)
    pub date: NaiveDate,       // 日期 (无时间部分)
    pub level: SeverityLevel,  // 负荷等级
}

impl Event {
    /// 创建新事件并分配新ID
    pub fn new(title: impl Into<String>, date: NaiveDate, level: SeverityLevel) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            title: title.into(),
            date,
            level,
        }
    }

    /// 事件负荷权重
    pub fn weight(&self) -> u32 {
        self.level.weight()
    }
}

/// 旧数据中的ID可能是数字，统一转换为字符串
#[derive(Deserialize)]
#[serde(untagged)]
enum RawEventId {
    Text(String),
    Number(serde_json::Number),
}

fn deserialize_event_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match RawEventId::deserialize(deserializer)? {
        RawEventId::Text(s) => Ok(s),
        RawEventId::Number(n) => Ok(n.to_string()),
    }
}

// ==========================================
// EventCollection - 事件集合
// ==========================================
// 保留插入顺序 (用于展示稳定性)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventCollection {
    events: Vec<Event>,
}

impl EventCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_events(events: Vec<Event>) -> Self {
        Self { events }
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Event> {
        self.events.iter()
    }

    pub fn as_slice(&self) -> &[Event] {
        &self.events
    }

    pub fn into_vec(self) -> Vec<Event> {
        self.events
    }

    /// 追加事件（不做容量校验，校验由 CapacityGate 负责）
    pub fn push(&mut self, event: Event) {
        self.events.push(event);
    }

    pub fn get(&self, id: &str) -> Option<&Event> {
        self.events.iter().find(|e| e.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    /// 按ID删除事件
    ///
    /// # 返回
    /// - Some(Event): 被删除的事件
    /// - None: ID不存在（no-op）
    pub fn remove(&mut self, id: &str) -> Option<Event> {
        let pos = self.events.iter().position(|e| e.id == id)?;
        Some(self.events.remove(pos))
    }

    /// 指定日期的事件（日历单元格内容）
    pub fn events_on(&self, date: NaiveDate) -> impl Iterator<Item = &Event> {
        self.events.iter().filter(move |e| e.date == date)
    }

    /// 指定年月的事件（登记一览）
    pub fn events_in_month(&self, year: i32, month: u32) -> Vec<&Event> {
        self.events
            .iter()
            .filter(|e| e.date.year() == year && e.date.month() == month)
            .collect()
    }
}

impl<'a> IntoIterator for &'a EventCollection {
    type Item = &'a Event;
    type IntoIter = std::slice::Iter<'a, Event>;

    fn into_iter(self) -> Self::IntoIter {
        self.events.iter()
    }
}

impl FromIterator<Event> for EventCollection {
    fn from_iter<T: IntoIterator<Item = Event>>(iter: T) -> Self {
        Self {
            events: iter.into_iter().collect(),
        }
    }
}

// ==========================================
// SelectionSet - 批量添加的日期选择集
// ==========================================
// 不持久化; 每次处理完准入请求后清空
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionSet {
    dates: BTreeSet<NaiveDate>,
}

impl SelectionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// 切换选择状态
    ///
    /// # 返回
    /// - true: 切换后处于选中状态
    /// - false: 切换后未选中
    pub fn toggle(&mut self, date: NaiveDate) -> bool {
        if self.dates.remove(&date) {
            false
        } else {
            self.dates.insert(date);
            true
        }
    }

    pub fn insert(&mut self, date: NaiveDate) -> bool {
        self.dates.insert(date)
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.dates.contains(&date)
    }

    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    pub fn clear(&mut self) {
        self.dates.clear();
    }

    /// 按日期升序返回所选日期
    pub fn dates(&self) -> Vec<NaiveDate> {
        self.dates.iter().copied().collect()
    }
}

impl FromIterator<NaiveDate> for SelectionSet {
    fn from_iter<T: IntoIterator<Item = NaiveDate>>(iter: T) -> Self {
        Self {
            dates: iter.into_iter().collect(),
        }
    }
}
