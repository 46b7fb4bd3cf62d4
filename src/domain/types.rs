// ==========================================
// 负荷日程系统 - 领域类型定义
// ==========================================
// 职责: 负荷等级 (Severity Level) 与负荷权重映射
// 红线: 等级集合封闭,权重随等级单调递增
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

// ==========================================
// 负荷等级 (Severity Level)
// ==========================================
// 序列化格式: kebab-case (与持久化格式一致)
// 顺序: VeryLow < Low < Medium < High < VeryHigh
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SeverityLevel {
    VeryLow,  // 很低 (1)
    Low,      // 低 (2)
    Medium,   // 中 (3)
    High,     // 高 (4)
    VeryHigh, // 很高 (5)
}

/// 未知的负荷等级标签
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("未知负荷等级: {0}")]
pub struct UnknownLevel(pub String);

impl SeverityLevel {
    /// 全部等级（按严重程度升序）
    pub const ALL: [SeverityLevel; 5] = [
        SeverityLevel::VeryLow,
        SeverityLevel::Low,
        SeverityLevel::Medium,
        SeverityLevel::High,
        SeverityLevel::VeryHigh,
    ];

    /// 负荷权重
    pub fn weight(&self) -> u32 {
        match self {
            SeverityLevel::VeryLow => 1,
            SeverityLevel::Low => 2,
            SeverityLevel::Medium => 3,
            SeverityLevel::High => 4,
            SeverityLevel::VeryHigh => 5,
        }
    }

    /// 持久化/接口使用的标签
    pub fn as_tag(&self) -> &'static str {
        match self {
            SeverityLevel::VeryLow => "very-low",
            SeverityLevel::Low => "low",
            SeverityLevel::Medium => "medium",
            SeverityLevel::High => "high",
            SeverityLevel::VeryHigh => "very-high",
        }
    }

    /// 从标签解析等级
    ///
    /// # 返回
    /// - Ok(SeverityLevel): 五个已定义标签之一
    /// - Err(UnknownLevel): 标签不在等级集合中
    pub fn from_tag(tag: &str) -> Result<Self, UnknownLevel> {
        match tag {
            "very-low" => Ok(SeverityLevel::VeryLow),
            "low" => Ok(SeverityLevel::Low),
            "medium" => Ok(SeverityLevel::Medium),
            "high" => Ok(SeverityLevel::High),
            "very-high" => Ok(SeverityLevel::VeryHigh),
            other => Err(UnknownLevel(other.to_string())),
        }
    }
}

impl fmt::Display for SeverityLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_tag())
    }
}

impl FromStr for SeverityLevel {
    type Err = UnknownLevel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SeverityLevel::from_tag(s)
    }
}

/// 按标签查询负荷权重
pub fn weight_of(tag: &str) -> Result<u32, UnknownLevel> {
    SeverityLevel::from_tag(tag).map(|level| level.weight())
}
