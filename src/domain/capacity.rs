// ==========================================
// 负荷日程系统 - 容量约束领域模型
// ==========================================
// 红线: 任意日期负荷合计 <= 日上限
// 红线: 任意周(周日起算)负荷合计 <= 周上限
// ==========================================

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// 默认日上限
pub const DEFAULT_DAILY_CEILING: u32 = 8;

/// 默认周上限（平均每日 6）
pub const DEFAULT_WEEKLY_CEILING: u32 = 42;

// ==========================================
// CapacityLimits - 容量上限
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapacityLimits {
    pub daily_ceiling: u32,  // 日上限
    pub weekly_ceiling: u32, // 周上限
}

impl Default for CapacityLimits {
    fn default() -> Self {
        Self {
            daily_ceiling: DEFAULT_DAILY_CEILING,
            weekly_ceiling: DEFAULT_WEEKLY_CEILING,
        }
    }
}

// ==========================================
// ViolatedConstraint - 被违反的约束
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViolatedConstraint {
    Daily,  // 日上限
    Weekly, // 周上限
}

impl ViolatedConstraint {
    pub fn as_str(&self) -> &'static str {
        match self {
            ViolatedConstraint::Daily => "daily",
            ViolatedConstraint::Weekly => "weekly",
        }
    }
}

impl fmt::Display for ViolatedConstraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ==========================================
// AdmissionDecision - 准入判定
// ==========================================
// 拒绝是正常业务结果，不是错误
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "lowercase")]
pub enum AdmissionDecision {
    Accepted,
    Rejected {
        constraint: ViolatedConstraint,
        current_load: u32,     // 判定时的已有负荷（日或周）
        requested_weight: u32, // 候选事件权重
        ceiling: u32,          // 被违反的上限
    },
}

impl AdmissionDecision {
    pub fn is_accepted(&self) -> bool {
        matches!(self, AdmissionDecision::Accepted)
    }

    /// 被违反的约束（接受时为 None）
    pub fn violated_constraint(&self) -> Option<ViolatedConstraint> {
        match self {
            AdmissionDecision::Accepted => None,
            AdmissionDecision::Rejected { constraint, .. } => Some(*constraint),
        }
    }
}

// ==========================================
// Rejection - 批量准入中的单日拒绝记录
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rejection {
    pub date: NaiveDate,
    pub constraint: ViolatedConstraint,
    pub current_load: u32,
    pub requested_weight: u32,
    pub ceiling: u32,
}

impl Rejection {
    /// 拒绝原因说明
    pub fn reason(&self) -> String {
        format!(
            "{} 超出{}上限: 已有负荷={}, 申请权重={}, 上限={}",
            self.date,
            match self.constraint {
                ViolatedConstraint::Daily => "日",
                ViolatedConstraint::Weekly => "周",
            },
            self.current_load,
            self.requested_weight,
            self.ceiling
        )
    }
}

// ==========================================
// DayLoad / WeekLoad - 负荷汇总视图
// ==========================================
// 用途: 供展示层绘制日历标记（颜色映射在展示层）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayLoad {
    pub date: NaiveDate,
    pub total: u32,       // 当日负荷合计
    pub remaining: u32,   // 距日上限剩余
    pub event_count: usize,
    pub at_limit: bool,   // total >= 日上限
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeekLoad {
    pub week_start: NaiveDate, // 周日
    pub week_end: NaiveDate,   // 周六
    pub total: u32,
    pub remaining: u32,        // 距周上限剩余
}
