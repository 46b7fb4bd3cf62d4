// ==========================================
// 负荷日程系统 - 容量闸门
// ==========================================
// 职责: 判定候选事件是否可准入
// 规则:
// 1) 日负荷 + 权重 > 日上限 → 拒绝 (daily)
// 2) 否则 周负荷 + 权重 > 周上限 → 拒绝 (weekly)
// 3) 否则 接受
// 红线: 基于传入快照判定，本身不跨批次累计
// ==========================================

use crate::domain::capacity::{AdmissionDecision, CapacityLimits, ViolatedConstraint};
use crate::domain::event::EventCollection;
use crate::domain::types::SeverityLevel;
use crate::engine::load_aggregator::LoadAggregator;
use chrono::NaiveDate;

// ==========================================
// CapacityGate - 容量闸门
// ==========================================
#[derive(Debug, Clone, Copy, Default)]
pub struct CapacityGate {
    limits: CapacityLimits,
    aggregator: LoadAggregator,
}

impl CapacityGate {
    pub fn new(limits: CapacityLimits) -> Self {
        Self {
            limits,
            aggregator: LoadAggregator::new(),
        }
    }

    pub fn limits(&self) -> &CapacityLimits {
        &self.limits
    }

    pub fn aggregator(&self) -> &LoadAggregator {
        &self.aggregator
    }

    /// 准入判定
    ///
    /// 日约束先于周约束判定（更紧、原因更具体）
    pub fn can_admit(
        &self,
        collection: &EventCollection,
        date: NaiveDate,
        level: SeverityLevel,
    ) -> AdmissionDecision {
        let weight = level.weight();

        let day_total = self.aggregator.daily_total(collection, date);
        if day_total.saturating_add(weight) > self.limits.daily_ceiling {
            return AdmissionDecision::Rejected {
                constraint: ViolatedConstraint::Daily,
                current_load: day_total,
                requested_weight: weight,
                ceiling: self.limits.daily_ceiling,
            };
        }

        let week_total = self.aggregator.week_total(collection, date);
        if week_total.saturating_add(weight) > self.limits.weekly_ceiling {
            return AdmissionDecision::Rejected {
                constraint: ViolatedConstraint::Weekly,
                current_load: week_total,
                requested_weight: weight,
                ceiling: self.limits.weekly_ceiling,
            };
        }

        AdmissionDecision::Accepted
    }
}
