// ==========================================
// 月度销售趋势分析 - 预测器
// ==========================================
// 职责: 下月收入预测 = 当月收入 + 平均变化估计
// ==========================================
// 估计器（二选一，不可混用）:
// - Cumulative: 截至当月的累计平均变化 avg_change_to_date[i]
// - Global:     全序列环比变化均值 mean(revenue_change[2..N])，
//               构造时一次性算出，对每一行（含首月）统一使用
// ==========================================

use crate::domain::report::ForecastPoint;
use crate::domain::trend::SequencedMonth;
use crate::domain::types::ForecastEstimator;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Forecaster {
    estimator: ForecastEstimator,
    global_rate: f64,
}

impl Forecaster {
    /// 创建预测器（预先计算全序列平均变化）
    pub fn new(estimator: ForecastEstimator, months: &[SequencedMonth]) -> Self {
        let global_rate = Self::global_average_change(months);
        debug!(%estimator, global_rate, "预测器初始化");
        Self {
            estimator,
            global_rate,
        }
    }

    pub fn estimator(&self) -> ForecastEstimator {
        self.estimator
    }

    /// 全序列环比变化均值（不足两个月时为 0）
    pub fn global_rate(&self) -> f64 {
        self.global_rate
    }

    /// mean(revenue[i] - revenue[i-1]), i = 2..N
    pub fn global_average_change(months: &[SequencedMonth]) -> f64 {
        if months.len() < 2 {
            return 0.0;
        }
        let sum: f64 = months
            .windows(2)
            .map(|pair| pair[1].total_revenue() - pair[0].total_revenue())
            .sum();
        sum / (months.len() - 1) as f64
    }

    /// 当前估计器在某一行采用的平均变化
    ///
    /// 累计均值无定义（首月且基期口径为 None）时按 0 处理
    pub fn rate_for(&self, avg_change_to_date: Option<f64>) -> f64 {
        match self.estimator {
            ForecastEstimator::Cumulative => avg_change_to_date.unwrap_or(0.0),
            ForecastEstimator::Global => self.global_rate,
        }
    }

    /// 下月预测
    pub fn forecast_next(&self, revenue: f64, avg_change_to_date: Option<f64>) -> f64 {
        revenue + self.rate_for(avg_change_to_date)
    }

    /// 末月之后 horizon 个月的预测: last + rate × k
    pub fn project(
        &self,
        months: &[SequencedMonth],
        last_avg_change_to_date: Option<f64>,
        horizon: u32,
    ) -> Vec<ForecastPoint> {
        let Some(last) = months.last() else {
            return Vec::new();
        };

        let rate = self.rate_for(last_avg_change_to_date);

        (1..=horizon)
            .map(|k| ForecastPoint {
                period: k as usize,
                month: last.key.plus_months(k).label(),
                forecasted_revenue: last.total_revenue() + rate * k as f64,
            })
            .collect()
    }
}
