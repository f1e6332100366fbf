// ==========================================
// 月度销售趋势分析 - 报表输出对象
// ==========================================
// 职责: 对外呈现的行/汇总结构（金额与比率统一保留两位小数）
// 红线: 取整只发生在这里，计算链路内部保持全精度
// ==========================================

use crate::domain::trend::{round2, SkippedRow, TrendRecord};
use crate::domain::types::{
    ForecastEstimator, LabelStyle, PaymentCheckStatus, PercentSurfacing,
};
use serde::{Deserialize, Serialize};

// ==========================================
// ReportRow - 月度趋势报表行
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportRow {
    pub month: String,
    pub year: i32,
    pub month_num: u32,
    pub monthly_revenue: f64,
    pub order_count: usize,
    pub previous_month_revenue: f64,
    pub revenue_change: f64,
    pub percent_change: Option<f64>, // PercentSurfacing::Null 时无定义输出空值
    pub moving_avg_3: f64,
    pub avg_change_to_date: f64,
    pub trend: String,
    pub forecast_next_month: f64,
    pub estimated_slope: Option<f64>,
}

impl ReportRow {
    /// 将趋势记录取整并按口径呈现
    pub fn from_record(
        record: &TrendRecord,
        surfacing: PercentSurfacing,
        style: LabelStyle,
    ) -> Self {
        let percent_change = match (record.percent_change, surfacing) {
            (Some(p), _) => Some(round2(p)),
            (None, PercentSurfacing::Zero) => Some(0.0),
            (None, PercentSurfacing::Null) => None,
        };

        Self {
            month: record.month.key.label(),
            year: record.month.key.year,
            month_num: record.month.key.month_num,
            monthly_revenue: round2(record.total_revenue()),
            order_count: record.month.aggregate.order_count,
            previous_month_revenue: round2(record.previous_revenue.unwrap_or(0.0)),
            revenue_change: round2(record.revenue_change.unwrap_or(0.0)),
            percent_change,
            moving_avg_3: round2(record.moving_avg_3),
            avg_change_to_date: round2(record.avg_change_to_date.unwrap_or(0.0)),
            trend: record.trend_label.render(style).to_string(),
            forecast_next_month: round2(record.forecast_next),
            estimated_slope: record.slope_estimate.map(round2),
        }
    }
}

// ==========================================
// SummaryStatistics - 序列汇总统计
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct SummaryStatistics {
    pub total_months: usize,
    pub total_revenue: f64,
    pub avg_monthly_revenue: f64,
    pub min_monthly_revenue: f64,
    pub max_monthly_revenue: f64,
    pub avg_monthly_change: f64,  // 环比变化均值（第 2..N 月）
    pub avg_percent_change: f64,  // 有定义的环比百分比均值
}

// ==========================================
// OverallTrend - 整体趋势
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TrendDirection {
    Positive,
    Negative,
    Stable,
}

impl TrendDirection {
    pub fn from_slope(slope: f64) -> Self {
        if slope > 0.0 {
            TrendDirection::Positive
        } else if slope < 0.0 {
            TrendDirection::Negative
        } else {
            TrendDirection::Stable
        }
    }

    pub fn describe(&self) -> &'static str {
        match self {
            TrendDirection::Positive => "Positive Trend (Growing)",
            TrendDirection::Negative => "Negative Trend (Declining)",
            TrendDirection::Stable => "Stable",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverallTrend {
    pub overall_slope: f64,
    pub avg_monthly_revenue: f64,
    pub direction: TrendDirection,
}

// ==========================================
// ForecastPoint - 未来月份预测
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastPoint {
    pub period: usize,   // 1..=horizon
    pub month: String,   // 预测对应的自然月 YYYY-MM
    pub forecasted_revenue: f64,
}

// ==========================================
// SalesTrendReport - 完整趋势报表
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalesTrendReport {
    pub estimator: ForecastEstimator,
    pub rows: Vec<ReportRow>,
    pub summary: SummaryStatistics,
    pub overall_trend: OverallTrend,
    pub forecast: Vec<ForecastPoint>,
    pub skipped_rows: Vec<SkippedRow>,
}

// ==========================================
// 支付对账
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentCheck {
    pub order_id: i64,
    pub order_total: f64,
    pub payment_amount: Option<f64>,
    pub status: PaymentCheckStatus,
    pub difference: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrphanPayment {
    pub payment_id: i64,
    pub order_id: i64,
    pub amount: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReconciliationReport {
    pub total_orders: usize,
    pub matching: usize,
    pub mismatching: usize,
    pub checks: Vec<PaymentCheck>,
    pub orders_without_payment: Vec<PaymentCheck>,
    pub orphan_payments: Vec<OrphanPayment>,
}

impl ReconciliationReport {
    /// 匹配率（百分比），无订单时为 0
    pub fn match_rate(&self) -> f64 {
        if self.total_orders == 0 {
            return 0.0;
        }
        self.matching as f64 / self.total_orders as f64 * 100.0
    }
}
