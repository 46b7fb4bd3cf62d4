// ==========================================
// 负荷日程系统 - 排程控制器
// ==========================================
// 职责: 单日/批量准入编排 → CapacityGate → EventStore
// 规则:
// 1) 标题或日期集合为空 → InvalidRequest（不访问存储）
// 2) 按输入顺序逐日判定，判定基于“当前快照 + 本批已准入事件”
// 3) 单日拒绝不阻塞其他日期（部分准入）
// 4) 整批处理完后写存储一次
// 红线: 持久化失败不致命，保留内存状态，下次变更时重试
// 红线: 启动时存储不可达 → 先合并存储中的历史事件再写回，不得覆盖
// ==========================================

use crate::domain::capacity::{
    AdmissionDecision, CapacityLimits, DayLoad, Rejection, WeekLoad,
};
use crate::domain::event::{Event, EventCollection, SelectionSet};
use crate::domain::types::SeverityLevel;
use crate::engine::capacity_gate::CapacityGate;
use crate::engine::error::{ScheduleError, ScheduleResult};
use crate::repository::event_repo::EventStore;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::sync::{Mutex, MutexGuard};
use tracing::instrument;

/// 批量准入结果
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdmissionOutcome {
    pub admitted: Vec<Event>,      // 已准入事件（按处理顺序）
    pub rejected: Vec<Rejection>,  // 被拒绝日期及原因
    pub persisted: bool,           // 本次变更是否已写入存储
}

impl AdmissionOutcome {
    pub fn admitted_count(&self) -> usize {
        self.admitted.len()
    }

    pub fn rejected_count(&self) -> usize {
        self.rejected.len()
    }

    pub fn is_fully_admitted(&self) -> bool {
        self.rejected.is_empty()
    }
}

/// 删除结果
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemovalOutcome {
    pub removed: bool,   // 是否删除了事件（ID不存在时为 false）
    pub persisted: bool, // 本次变更是否已写入存储
}

/// 控制器内部状态（受锁保护）
struct ControllerState {
    events: EventCollection,
    pending_flush: bool, // 上次写入失败，待重试
    needs_reload: bool,  // 启动时未能读取存储，写回前需先合并存储内容
}

// ==========================================
// SchedulingController - 排程控制器
// ==========================================
pub struct SchedulingController {
    store: EventStore,
    gate: CapacityGate,
    state: Mutex<ControllerState>,
}

impl SchedulingController {
    /// 创建控制器并从存储加载一次事件集合
    ///
    /// 存储不可达时以空集合启动，并标记为待重新加载
    pub fn new(store: EventStore, limits: CapacityLimits) -> Self {
        let (events, needs_reload) = match store.try_load() {
            Ok(events) => (events, false),
            Err(e) => {
                tracing::warn!(
                    key = store.key(),
                    error = %e,
                    "存储不可达，以空集合启动，写回前将重新加载"
                );
                (EventCollection::new(), true)
            }
        };
        tracing::info!(
            key = store.key(),
            count = events.len(),
            needs_reload,
            daily_ceiling = limits.daily_ceiling,
            weekly_ceiling = limits.weekly_ceiling,
            "排程控制器初始化完成"
        );
        Self {
            store,
            gate: CapacityGate::new(limits),
            state: Mutex::new(ControllerState {
                events,
                pending_flush: false,
                needs_reload,
            }),
        }
    }

    pub fn limits(&self) -> CapacityLimits {
        *self.gate.limits()
    }

    fn lock_state(&self) -> ScheduleResult<MutexGuard<'_, ControllerState>> {
        self.state
            .lock()
            .map_err(|e| ScheduleError::LockError(e.to_string()))
    }

    // ==========================================
    // 写操作
    // ==========================================

    /// 批量准入
    ///
    /// # 参数
    /// - `title`: 事件标题（非空）
    /// - `dates`: 候选日期（非空，按给定顺序处理，允许重复）
    /// - `level`: 负荷等级
    ///
    /// # 返回
    /// - Ok(AdmissionOutcome): 已准入/被拒绝列表
    /// - Err(InvalidRequest): 标题或日期为空
    #[instrument(skip(self, dates), fields(date_count = dates.len(), level = %level))]
    pub fn request_admission(
        &self,
        title: &str,
        dates: &[NaiveDate],
        level: SeverityLevel,
    ) -> ScheduleResult<AdmissionOutcome> {
        if title.trim().is_empty() {
            return Err(ScheduleError::InvalidRequest("标题不能为空".to_string()));
        }
        if dates.is_empty() {
            return Err(ScheduleError::InvalidRequest("日期集合不能为空".to_string()));
        }

        let mut state = self.lock_state()?;
        self.reconcile(&mut state);
        let mut outcome = AdmissionOutcome::default();

        for &date in dates {
            match self.gate.can_admit(&state.events, date, level) {
                AdmissionDecision::Accepted => {
                    let event = Event::new(title, date, level);
                    tracing::debug!(%date, id = %event.id, "准入");
                    state.events.push(event.clone());
                    outcome.admitted.push(event);
                }
                AdmissionDecision::Rejected {
                    constraint,
                    current_load,
                    requested_weight,
                    ceiling,
                } => {
                    let rejection = Rejection {
                        date,
                        constraint,
                        current_load,
                        requested_weight,
                        ceiling,
                    };
                    tracing::debug!(%date, %constraint, "拒绝: {}", rejection.reason());
                    outcome.rejected.push(rejection);
                }
            }
        }

        outcome.persisted = if outcome.admitted.is_empty() && !state.pending_flush {
            true
        } else {
            self.persist(&mut state)
        };

        tracing::info!(
            admitted = outcome.admitted.len(),
            rejected = outcome.rejected.len(),
            persisted = outcome.persisted,
            "批量准入完成"
        );
        Ok(outcome)
    }

    /// 按选择集准入，处理后清空选择集
    ///
    /// 请求无效时选择集保持不变
    pub fn request_admission_for_selection(
        &self,
        title: &str,
        selection: &mut SelectionSet,
        level: SeverityLevel,
    ) -> ScheduleResult<AdmissionOutcome> {
        let outcome = self.request_admission(title, &selection.dates(), level)?;
        selection.clear();
        Ok(outcome)
    }

    /// 按ID删除事件
    ///
    /// # 返回
    /// - Ok(true): 已删除
    /// - Ok(false): ID不存在（no-op）
    pub fn remove(&self, id: &str) -> ScheduleResult<bool> {
        Ok(self.delete(id)?.removed)
    }

    /// 按ID删除事件，并报告写入状态
    #[instrument(skip(self))]
    pub fn delete(&self, id: &str) -> ScheduleResult<RemovalOutcome> {
        let mut state = self.lock_state()?;
        self.reconcile(&mut state);
        let removed = state.events.remove(id).is_some();

        let persisted = if !removed && !state.pending_flush {
            true
        } else {
            self.persist(&mut state)
        };

        if removed {
            tracing::info!(id, persisted, "事件已删除");
        } else {
            tracing::debug!(id, persisted, "事件不存在，跳过删除");
        }
        Ok(RemovalOutcome { removed, persisted })
    }

    /// 显式重试待写入的变更
    ///
    /// # 返回
    /// - Ok(()): 无待写入或写入成功
    /// - Err(Persistence): 写入仍失败
    pub fn flush(&self) -> ScheduleResult<()> {
        let mut state = self.lock_state()?;
        if state.needs_reload {
            let stored = self.store.try_load()?;
            self.merge_stored(&mut state, stored);
        }
        if !state.pending_flush {
            return Ok(());
        }
        self.store.save(&state.events)?;
        state.pending_flush = false;
        Ok(())
    }

    /// 是否存在未写入存储的变更（含尚未合并的存储内容）
    pub fn has_pending_writes(&self) -> ScheduleResult<bool> {
        let state = self.lock_state()?;
        Ok(state.pending_flush || state.needs_reload)
    }

    /// 存储恢复后合并历史事件；存储仍不可达时保持待重新加载
    ///
    /// # 返回
    /// - true: 内存集合已包含存储内容
    /// - false: 存储仍不可达
    fn reconcile(&self, state: &mut ControllerState) -> bool {
        if !state.needs_reload {
            return true;
        }
        match self.store.try_load() {
            Ok(stored) => {
                self.merge_stored(state, stored);
                true
            }
            Err(e) => {
                tracing::debug!(error = %e, "存储仍不可达，暂不合并");
                false
            }
        }
    }

    /// 存储中的事件在前，离线期间准入的事件在后
    ///
    /// 离线准入的事件按合并后的负荷重新判定，超限的事件丢弃
    fn merge_stored(&self, state: &mut ControllerState, stored: EventCollection) {
        let local = std::mem::take(&mut state.events).into_vec();
        let stored_count = stored.len();
        let mut merged = stored;
        let mut dropped = 0usize;

        for event in local {
            if merged.contains(&event.id) {
                continue;
            }
            match self.gate.can_admit(&merged, event.date, event.level) {
                AdmissionDecision::Accepted => merged.push(event),
                AdmissionDecision::Rejected { constraint, .. } => {
                    tracing::warn!(
                        id = %event.id,
                        date = %event.date,
                        %constraint,
                        "离线期间准入的事件与存储内容合并后超限，已丢弃"
                    );
                    dropped += 1;
                }
            }
        }

        let appended = merged.len() - stored_count;
        tracing::info!(stored = stored_count, appended, dropped, "已合并存储中的事件");
        state.events = merged;
        state.needs_reload = false;
        if appended > 0 || dropped > 0 {
            state.pending_flush = true;
        }
    }

    /// 写回整个集合；失败时标记待重试
    ///
    /// 存储内容尚未合并时不写，避免覆盖历史事件
    fn persist(&self, state: &mut ControllerState) -> bool {
        if !self.reconcile(state) {
            state.pending_flush = true;
            return false;
        }
        match self.store.save(&state.events) {
            Ok(()) => {
                state.pending_flush = false;
                true
            }
            Err(e) => {
                tracing::warn!(error = %e, "事件集合写入失败，保留内存状态，下次变更时重试");
                state.pending_flush = true;
                false
            }
        }
    }

    // ==========================================
    // 读操作
    // ==========================================

    /// 当前事件集合快照
    pub fn snapshot(&self) -> ScheduleResult<EventCollection> {
        Ok(self.lock_state()?.events.clone())
    }

    /// 指定日期的事件
    pub fn events_on(&self, date: NaiveDate) -> ScheduleResult<Vec<Event>> {
        Ok(self.lock_state()?.events.events_on(date).cloned().collect())
    }

    /// 指定年月的事件
    pub fn events_in_month(&self, year: i32, month: u32) -> ScheduleResult<Vec<Event>> {
        let state = self.lock_state()?;
        Ok(state
            .events
            .events_in_month(year, month)
            .into_iter()
            .cloned()
            .collect())
    }

    pub fn daily_total(&self, date: NaiveDate) -> ScheduleResult<u32> {
        let state = self.lock_state()?;
        Ok(self.gate.aggregator().daily_total(&state.events, date))
    }

    pub fn week_total(&self, date: NaiveDate) -> ScheduleResult<u32> {
        let state = self.lock_state()?;
        Ok(self.gate.aggregator().week_total(&state.events, date))
    }

    pub fn day_load(&self, date: NaiveDate) -> ScheduleResult<DayLoad> {
        let state = self.lock_state()?;
        Ok(self
            .gate
            .aggregator()
            .day_load(&state.events, date, self.gate.limits()))
    }

    pub fn week_load(&self, date: NaiveDate) -> ScheduleResult<WeekLoad> {
        let state = self.lock_state()?;
        Ok(self
            .gate
            .aggregator()
            .week_load(&state.events, date, self.gate.limits()))
    }

    pub fn month_loads(&self, year: i32, month: u32) -> ScheduleResult<Vec<DayLoad>> {
        let state = self.lock_state()?;
        Ok(self
            .gate
            .aggregator()
            .month_loads(&state.events, year, month, self.gate.limits()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::capacity::ViolatedConstraint;
    use crate::repository::kv_store::MemoryKeyValueStore;
    use std::sync::Arc;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn controller() -> SchedulingController {
        let store = EventStore::new(Arc::new(MemoryKeyValueStore::new()));
        SchedulingController::new(store, CapacityLimits::default())
    }

    #[test]
    fn test_invalid_requests_have_no_effect() {
        let c = controller();
        assert!(matches!(
            c.request_admission("", &[d(2024, 6, 10)], SeverityLevel::Low),
            Err(ScheduleError::InvalidRequest(_))
        ));
        assert!(matches!(
            c.request_admission("   ", &[d(2024, 6, 10)], SeverityLevel::Low),
            Err(ScheduleError::InvalidRequest(_))
        ));
        assert!(matches!(
            c.request_admission("x", &[], SeverityLevel::Low),
            Err(ScheduleError::InvalidRequest(_))
        ));
        assert!(c.snapshot().unwrap().is_empty());
    }

    #[test]
    fn test_batch_is_cumulative_on_same_date() {
        let c = controller();
        let dates = vec![d(2024, 6, 10); 9];
        let outcome = c
            .request_admission("drip", &dates, SeverityLevel::VeryLow)
            .unwrap();

        assert_eq!(outcome.admitted_count(), 8);
        assert_eq!(outcome.rejected_count(), 1);
        assert_eq!(outcome.rejected[0].constraint, ViolatedConstraint::Daily);
        assert_eq!(outcome.rejected[0].current_load, 8);
        assert!(outcome.persisted);
        assert_eq!(c.daily_total(d(2024, 6, 10)).unwrap(), 8);
    }

    #[test]
    fn test_selection_cleared_after_processing() {
        let c = controller();
        let mut selection: SelectionSet = [d(2024, 6, 10), d(2024, 6, 11)].into_iter().collect();

        let err = c.request_admission_for_selection("", &mut selection, SeverityLevel::Low);
        assert!(err.is_err());
        assert_eq!(selection.len(), 2);

        let outcome = c
            .request_admission_for_selection("x", &mut selection, SeverityLevel::Low)
            .unwrap();
        assert_eq!(outcome.admitted_count(), 2);
        assert!(selection.is_empty());
    }

    #[test]
    fn test_remove_twice() {
        let c = controller();
        let outcome = c
            .request_admission("x", &[d(2024, 6, 10)], SeverityLevel::High)
            .unwrap();
        let id = outcome.admitted[0].id.clone();

        assert!(c.remove(&id).unwrap());
        assert!(!c.remove(&id).unwrap());
        assert_eq!(c.daily_total(d(2024, 6, 10)).unwrap(), 0);
    }
}
