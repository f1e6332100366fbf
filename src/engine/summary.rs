// ==========================================
// 月度销售趋势分析 - 序列汇总
// ==========================================
// 职责: 汇总统计（总额/均值/极值/平均变化）+ 整体趋势方向
// 口径:
// - 统计覆盖全部月份（含首月）
// - avg_monthly_change 只取真实环比（第 2..N 月）
// - avg_percent_change 只取有定义的百分比
// - 整体斜率取首月到末月的两点斜率
// ==========================================

use crate::domain::report::{OverallTrend, SummaryStatistics, TrendDirection};
use crate::domain::trend::TrendRecord;
use crate::engine::forecaster::Forecaster;

pub struct SummaryCalculator;

impl SummaryCalculator {
    pub fn new() -> Self {
        Self
    }

    /// 汇总统计
    pub fn summarize(&self, records: &[TrendRecord]) -> SummaryStatistics {
        if records.is_empty() {
            return SummaryStatistics::default();
        }

        let revenues: Vec<f64> = records.iter().map(|r| r.total_revenue()).collect();
        let total_revenue: f64 = revenues.iter().sum();
        let min = revenues.iter().copied().fold(f64::INFINITY, f64::min);
        let max = revenues.iter().copied().fold(f64::NEG_INFINITY, f64::max);

        let months: Vec<_> = records.iter().map(|r| r.month.clone()).collect();
        let avg_monthly_change = Forecaster::global_average_change(&months);

        let percents: Vec<f64> = records.iter().filter_map(|r| r.percent_change).collect();
        let avg_percent_change = if percents.is_empty() {
            0.0
        } else {
            percents.iter().sum::<f64>() / percents.len() as f64
        };

        SummaryStatistics {
            total_months: records.len(),
            total_revenue,
            avg_monthly_revenue: total_revenue / records.len() as f64,
            min_monthly_revenue: min,
            max_monthly_revenue: max,
            avg_monthly_change,
            avg_percent_change,
        }
    }

    /// 整体趋势（首月 → 末月两点斜率）
    pub fn overall_trend(&self, records: &[TrendRecord]) -> OverallTrend {
        let overall_slope = match (records.first(), records.last()) {
            (Some(first), Some(last)) if records.len() > 1 => {
                (last.total_revenue() - first.total_revenue()) / (records.len() - 1) as f64
            }
            _ => 0.0,
        };

        let avg_monthly_revenue = if records.is_empty() {
            0.0
        } else {
            records.iter().map(|r| r.total_revenue()).sum::<f64>() / records.len() as f64
        };

        OverallTrend {
            overall_slope,
            avg_monthly_revenue,
            direction: TrendDirection::from_slope(overall_slope),
        }
    }
}

impl Default for SummaryCalculator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::trend::{MonthKey, MonthlyAggregate, SequencedMonth};
    use crate::domain::types::{BaselinePolicy, ForecastEstimator};
    use crate::engine::trend::TrendCalculator;

    fn records(revenues: &[f64]) -> Vec<TrendRecord> {
        let months: Vec<SequencedMonth> = revenues
            .iter()
            .enumerate()
            .map(|(idx, &revenue)| {
                let key = MonthKey::new(2006, 11).unwrap().plus_months(idx as u32);
                SequencedMonth {
                    sequence: idx + 1,
                    key,
                    aggregate: MonthlyAggregate {
                        month: key.label(),
                        total_revenue: revenue,
                        order_count: 2,
                    },
                }
            })
            .collect();
        let forecaster = Forecaster::new(ForecastEstimator::Global, &months);
        TrendCalculator::new(BaselinePolicy::Zero).calculate(&months, &forecaster)
    }

    #[test]
    fn test_summarize() {
        let summary = SummaryCalculator::new().summarize(&records(&[100.0, 150.0, 120.0, 180.0]));

        assert_eq!(summary.total_months, 4);
        assert_eq!(summary.total_revenue, 550.0);
        assert_eq!(summary.avg_monthly_revenue, 137.5);
        assert_eq!(summary.min_monthly_revenue, 100.0);
        assert_eq!(summary.max_monthly_revenue, 180.0);
        assert!((summary.avg_monthly_change - 80.0 / 3.0).abs() < 1e-9);
        // (50% + -20% + 50%) / 3
        assert!((summary.avg_percent_change - 80.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_summarize_empty() {
        assert_eq!(SummaryCalculator::new().summarize(&[]), SummaryStatistics::default());
    }

    #[test]
    fn test_overall_trend_detects_decline() {
        let trend = SummaryCalculator::new().overall_trend(&records(&[300.0, 350.0, 150.0]));
        assert_eq!(trend.overall_slope, -75.0);
        assert_eq!(trend.direction, TrendDirection::Negative);
        assert_eq!(trend.direction.describe(), "Negative Trend (Declining)");
    }

    #[test]
    fn test_overall_trend_single_month_is_stable() {
        let trend = SummaryCalculator::new().overall_trend(&records(&[300.0]));
        assert_eq!(trend.overall_slope, 0.0);
        assert_eq!(trend.direction, TrendDirection::Stable);
        assert_eq!(trend.avg_monthly_revenue, 300.0);
    }
}
