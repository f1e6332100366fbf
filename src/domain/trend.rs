// ==========================================
// 月度销售趋势分析 - 趋势计算中间实体
// ==========================================
// 数据流: OrderLineFact → MonthlyAggregate → SequencedMonth → TrendRecord
// 红线: 各阶段只产出新值，不回写上游
// ==========================================

use crate::domain::types::TrendLabel;
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// MonthKey - 自然月键 (year, month_num)
// ==========================================
// 派生 Ord 的字段顺序即时间顺序: 先年后月
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct MonthKey {
    pub year: i32,
    pub month_num: u32, // 1..=12
}

impl MonthKey {
    pub fn new(year: i32, month_num: u32) -> Option<Self> {
        if (1..=12).contains(&month_num) {
            Some(Self { year, month_num })
        } else {
            None
        }
    }

    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month_num: date.month(),
        }
    }

    /// 解析 YYYY-MM 月份标签
    pub fn parse(label: &str) -> Option<Self> {
        let (year, month) = label.trim().split_once('-')?;
        if year.len() != 4 || month.len() != 2 {
            return None;
        }
        let year = year.parse::<i32>().ok()?;
        let month_num = month.parse::<u32>().ok()?;
        Self::new(year, month_num)
    }

    /// YYYY-MM 标签（月份两位补零）
    pub fn label(&self) -> String {
        format!("{:04}-{:02}", self.year, self.month_num)
    }

    /// 向后推 n 个自然月
    pub fn plus_months(&self, n: u32) -> Self {
        let zero_based = self.year as i64 * 12 + (self.month_num as i64 - 1) + n as i64;
        Self {
            year: zero_based.div_euclid(12) as i32,
            month_num: (zero_based.rem_euclid(12) + 1) as u32,
        }
    }
}

impl fmt::Display for MonthKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

// ==========================================
// MonthlyAggregate - 月度汇总
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyAggregate {
    pub month: String,      // YYYY-MM
    pub total_revenue: f64, // Σ(quantity × price)
    pub order_count: usize, // 去重订单数
}

// ==========================================
// SequencedMonth - 带时间序号的月度汇总
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SequencedMonth {
    pub sequence: usize, // 1-based，连续无空洞
    pub key: MonthKey,
    pub aggregate: MonthlyAggregate,
}

impl SequencedMonth {
    pub fn total_revenue(&self) -> f64 {
        self.aggregate.total_revenue
    }
}

// ==========================================
// TrendRecord - 月度趋势记录（未取整）
// ==========================================
// None 表示该指标在当月无定义，呈现层再决定输出 0 还是空值
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendRecord {
    pub month: SequencedMonth,
    pub previous_revenue: Option<f64>,
    pub revenue_change: Option<f64>,
    pub percent_change: Option<f64>,
    pub moving_avg_3: f64,
    pub avg_change_to_date: Option<f64>,
    pub trend_label: TrendLabel,
    pub forecast_next: f64,
    pub slope_estimate: Option<f64>,
}

impl TrendRecord {
    pub fn sequence(&self) -> usize {
        self.month.sequence
    }

    pub fn total_revenue(&self) -> f64 {
        self.month.total_revenue()
    }
}

// ==========================================
// SkippedRow - 被聚合器拒绝的输入行
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkippedRow {
    pub order_id: i64,
    pub reason: SkipReason,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SkipReason {
    MissingDate,
    InvalidDate(String),
    MissingQuantity,
    MissingPrice,
    NonFiniteAmount,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::MissingDate => write!(f, "order_date 缺失"),
            SkipReason::InvalidDate(raw) => write!(f, "order_date 无法解析: {}", raw),
            SkipReason::MissingQuantity => write!(f, "quantity 缺失"),
            SkipReason::MissingPrice => write!(f, "price 缺失"),
            SkipReason::NonFiniteAmount => write!(f, "金额不是有限数值"),
        }
    }
}

/// 保留两位小数（仅在结果呈现时调用）
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
