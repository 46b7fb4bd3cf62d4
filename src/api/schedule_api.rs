// ==========================================
// 负荷日程系统 - 排程API
// ==========================================
// 职责: 展示层入口，解析日期字符串/等级标签后调用 SchedulingController
// 输入格式: 日期 "YYYY-MM-DD"，等级 "very-low" .. "very-high"
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::domain::capacity::{CapacityLimits, DayLoad, WeekLoad};
use crate::domain::event::{Event, SelectionSet};
use crate::domain::types::SeverityLevel;
use crate::engine::scheduler::{AdmissionOutcome, RemovalOutcome, SchedulingController};
use chrono::NaiveDate;
use std::sync::Arc;

/// 日期格式
pub const DATE_FORMAT: &str = "%Y-%m-%d";

// ==========================================
// ScheduleApi - 排程API
// ==========================================
pub struct ScheduleApi {
    controller: Arc<SchedulingController>,
}

impl ScheduleApi {
    pub fn new(controller: Arc<SchedulingController>) -> Self {
        Self { controller }
    }

    pub fn controller(&self) -> &Arc<SchedulingController> {
        &self.controller
    }

    pub fn limits(&self) -> CapacityLimits {
        self.controller.limits()
    }

    // ==========================================
    // 输入解析
    // ==========================================

    /// 解析 ISO 日期字符串
    pub fn parse_date(raw: &str) -> ApiResult<NaiveDate> {
        NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT)
            .map_err(|_| ApiError::InvalidDate(raw.to_string()))
    }

    /// 解析等级标签（表单输入允许首尾空白）
    pub fn parse_level(tag: &str) -> ApiResult<SeverityLevel> {
        SeverityLevel::from_tag(tag.trim()).map_err(|e| ApiError::UnknownLevel(e.0))
    }

    fn validate_month(month: u32) -> ApiResult<()> {
        if (1..=12).contains(&month) {
            Ok(())
        } else {
            Err(ApiError::InvalidInput(format!("月份超出范围: {}", month)))
        }
    }

    // ==========================================
    // 写操作
    // ==========================================

    /// 添加事件（表单提交）
    ///
    /// 规则：
    /// 1) 指定了单一日期时优先使用该日期
    /// 2) 否则使用选择集中的日期
    /// 3) 两者都没有 → InvalidInput
    ///
    /// 请求被处理后（无论准入/拒绝）选择集清空
    pub fn add_event(
        &self,
        title: &str,
        date: Option<&str>,
        selection: &mut SelectionSet,
        level: &str,
    ) -> ApiResult<AdmissionOutcome> {
        let level = Self::parse_level(level)?;
        if title.trim().is_empty() {
            return Err(ApiError::InvalidInput("标题不能为空".to_string()));
        }

        match date.map(str::trim).filter(|d| !d.is_empty()) {
            Some(raw) => {
                let date = Self::parse_date(raw)?;
                let outcome = self.controller.request_admission(title, &[date], level)?;
                selection.clear();
                Ok(outcome)
            }
            None if !selection.is_empty() => {
                Ok(self
                    .controller
                    .request_admission_for_selection(title, selection, level)?)
            }
            None => Err(ApiError::InvalidInput("请选择日期".to_string())),
        }
    }

    /// 批量准入（日期按给定顺序处理）
    pub fn request_admission(
        &self,
        title: &str,
        dates: &[&str],
        level: &str,
    ) -> ApiResult<AdmissionOutcome> {
        let level = Self::parse_level(level)?;
        let dates = dates
            .iter()
            .map(|raw| Self::parse_date(raw))
            .collect::<ApiResult<Vec<NaiveDate>>>()?;

        Ok(self.controller.request_admission(title, &dates, level)?)
    }

    /// 删除事件（ID不存在时 removed = false）
    pub fn delete_event(&self, id: &str) -> ApiResult<RemovalOutcome> {
        Ok(self.controller.delete(id)?)
    }

    /// 重试未写入的变更
    pub fn flush(&self) -> ApiResult<()> {
        Ok(self.controller.flush()?)
    }

    // ==========================================
    // 查询
    // ==========================================

    pub fn list_events(&self) -> ApiResult<Vec<Event>> {
        Ok(self.controller.snapshot()?.into_vec())
    }

    pub fn list_events_by_month(&self, year: i32, month: u32) -> ApiResult<Vec<Event>> {
        Self::validate_month(month)?;
        Ok(self.controller.events_in_month(year, month)?)
    }

    pub fn list_events_on(&self, date: &str) -> ApiResult<Vec<Event>> {
        Ok(self.controller.events_on(Self::parse_date(date)?)?)
    }

    pub fn get_daily_total(&self, date: &str) -> ApiResult<u32> {
        Ok(self.controller.daily_total(Self::parse_date(date)?)?)
    }

    pub fn get_week_total(&self, date: &str) -> ApiResult<u32> {
        Ok(self.controller.week_total(Self::parse_date(date)?)?)
    }

    pub fn get_day_load(&self, date: &str) -> ApiResult<DayLoad> {
        Ok(self.controller.day_load(Self::parse_date(date)?)?)
    }

    pub fn get_week_load(&self, date: &str) -> ApiResult<WeekLoad> {
        Ok(self.controller.week_load(Self::parse_date(date)?)?)
    }

    /// 月度日历汇总（每日一条）
    pub fn get_month_summary(&self, year: i32, month: u32) -> ApiResult<Vec<DayLoad>> {
        Self::validate_month(month)?;
        Ok(self.controller.month_loads(year, month)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::event_repo::EventStore;
    use crate::repository::kv_store::MemoryKeyValueStore;

    fn api() -> ScheduleApi {
        let store = EventStore::new(Arc::new(MemoryKeyValueStore::new()));
        let controller = SchedulingController::new(store, CapacityLimits::default());
        ScheduleApi::new(Arc::new(controller))
    }

    fn d(raw: &str) -> NaiveDate {
        ScheduleApi::parse_date(raw).unwrap()
    }

    #[test]
    fn test_parse_inputs() {
        assert_eq!(d(" 2024-06-10 "), NaiveDate::from_ymd_opt(2024, 6, 10).unwrap());
        assert!(matches!(
            ScheduleApi::parse_date("2024/06/10"),
            Err(ApiError::InvalidDate(_))
        ));
        assert!(matches!(
            ScheduleApi::parse_date("2024-02-30"),
            Err(ApiError::InvalidDate(_))
        ));
        assert!(matches!(
            ScheduleApi::parse_level("urgent"),
            Err(ApiError::UnknownLevel(ref tag)) if tag == "urgent"
        ));
        assert_eq!(
            ScheduleApi::parse_level(" medium ").unwrap(),
            SeverityLevel::Medium
        );
    }

    #[test]
    fn test_unknown_level_fails_before_any_effect() {
        let api = api();
        let mut selection: SelectionSet = [d("2024-06-10")].into_iter().collect();
        let err = api.add_event("x", None, &mut selection, "huge");
        assert!(matches!(err, Err(ApiError::UnknownLevel(_))));
        assert_eq!(selection.len(), 1);
        assert!(api.list_events().unwrap().is_empty());
    }

    #[test]
    fn test_explicit_date_wins_over_selection() {
        let api = api();
        let mut selection: SelectionSet = [d("2024-06-11"), d("2024-06-12")].into_iter().collect();

        let outcome = api
            .add_event("x", Some("2024-06-10"), &mut selection, "low")
            .unwrap();
        assert_eq!(outcome.admitted.len(), 1);
        assert_eq!(outcome.admitted[0].date, d("2024-06-10"));
        assert!(selection.is_empty());
        assert_eq!(api.get_daily_total("2024-06-11").unwrap(), 0);
    }

    #[test]
    fn test_no_date_and_no_selection() {
        let api = api();
        let mut selection = SelectionSet::new();
        assert!(matches!(
            api.add_event("x", Some("  "), &mut selection, "low"),
            Err(ApiError::InvalidInput(_))
        ));
        assert!(matches!(
            api.add_event("", Some("2024-06-10"), &mut selection, "low"),
            Err(ApiError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_delete_event_reports_outcome() {
        let api = api();
        let mut selection = SelectionSet::new();
        let outcome = api
            .add_event("x", Some("2024-06-10"), &mut selection, "high")
            .unwrap();
        let id = outcome.admitted[0].id.clone();

        let first = api.delete_event(&id).unwrap();
        assert!(first.removed);
        assert!(first.persisted);

        let second = api.delete_event(&id).unwrap();
        assert!(!second.removed);
        assert_eq!(api.get_daily_total("2024-06-10").unwrap(), 0);
    }

    #[test]
    fn test_month_validation() {
        let api = api();
        assert!(matches!(
            api.get_month_summary(2024, 0),
            Err(ApiError::InvalidInput(_))
        ));
        assert_eq!(api.get_month_summary(2024, 6).unwrap().len(), 30);
    }
}
