// ==========================================
// 负荷日程系统 - 负荷汇总引擎
// ==========================================
// 职责: 日负荷合计 / 周负荷合计 (周日起算的日历周)
// 红线: 周窗口与日历对齐 (周日-周六)，不是滚动 7 天
// 红线: 纯函数，不缓存
// ==========================================

use crate::domain::capacity::{CapacityLimits, DayLoad, WeekLoad};
use crate::domain::event::EventCollection;
use chrono::{Datelike, Duration, NaiveDate};

/// 一周天数
pub const DAYS_PER_WEEK: usize = 7;

// ==========================================
// LoadAggregator - 负荷汇总引擎
// ==========================================
#[derive(Debug, Clone, Copy, Default)]
pub struct LoadAggregator {
    // 无状态引擎
}

impl LoadAggregator {
    pub fn new() -> Self {
        Self {}
    }

    /// 日负荷合计
    ///
    /// 无事件时为 0
    pub fn daily_total(&self, collection: &EventCollection, date: NaiveDate) -> u32 {
        collection.events_on(date).map(|e| e.weight()).sum()
    }

    /// 包含 date 的周的起始日（周日）
    pub fn week_start(date: NaiveDate) -> NaiveDate {
        date - Duration::days(i64::from(date.weekday().num_days_from_sunday()))
    }

    /// 包含 date 的周的 7 个日期（周日 .. 周六）
    pub fn week_dates(date: NaiveDate) -> Vec<NaiveDate> {
        Self::week_start(date).iter_days().take(DAYS_PER_WEEK).collect()
    }

    /// 周负荷合计
    ///
    /// 等于所在周 7 天的日负荷之和，与 date 是周内哪一天无关
    pub fn week_total(&self, collection: &EventCollection, date: NaiveDate) -> u32 {
        Self::week_dates(date)
            .into_iter()
            .map(|d| self.daily_total(collection, d))
            .sum()
    }

    /// 单日负荷汇总
    pub fn day_load(
        &self,
        collection: &EventCollection,
        date: NaiveDate,
        limits: &CapacityLimits,
    ) -> DayLoad {
        let total = self.daily_total(collection, date);
        DayLoad {
            date,
            total,
            remaining: limits.daily_ceiling.saturating_sub(total),
            event_count: collection.events_on(date).count(),
            at_limit: total >= limits.daily_ceiling,
        }
    }

    /// 单周负荷汇总
    pub fn week_load(
        &self,
        collection: &EventCollection,
        date: NaiveDate,
        limits: &CapacityLimits,
    ) -> WeekLoad {
        let week_start = Self::week_start(date);
        let total = self.week_total(collection, date);
        WeekLoad {
            week_start,
            week_end: week_start + Duration::days(DAYS_PER_WEEK as i64 - 1),
            total,
            remaining: limits.weekly_ceiling.saturating_sub(total),
        }
    }

    /// 月内每日负荷汇总
    ///
    /// 月份非法时返回空列表
    pub fn month_loads(
        &self,
        collection: &EventCollection,
        year: i32,
        month: u32,
        limits: &CapacityLimits,
    ) -> Vec<DayLoad> {
        let first_day = match NaiveDate::from_ymd_opt(year, month, 1) {
            Some(d) => d,
            None => return Vec::new(),
        };

        first_day
            .iter_days()
            .take_while(|d| d.month() == month)
            .map(|d| self.day_load(collection, d, limits))
            .collect()
    }
}
